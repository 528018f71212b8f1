/// Console model hosting the sound unit.
///
/// Both models run the same four-channel PSG at 4.194304 MHz. The selector
/// is carried so model-specific mixing can be added without changing the
/// `Apu` constructor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Gb,
    /// Game Boy Advance running the legacy PSG.
    Gba,
}

impl Model {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Model::Gb => "gb",
            Model::Gba => "gba",
        }
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "gb" | "dmg" => Ok(Model::Gb),
            "gba" | "agb" => Ok(Model::Gba),
            other => Err(format!("unknown model: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases() {
        assert_eq!("DMG".parse::<Model>(), Ok(Model::Gb));
        assert_eq!("agb".parse::<Model>(), Ok(Model::Gba));
        assert!("cgb".parse::<Model>().is_err());
        assert_eq!(Model::Gba.name(), "gba");
    }
}
