//! Sound register window: addresses, read masks and the post-boot table.

pub const NR10: u16 = 0xFF10;
pub const NR11: u16 = 0xFF11;
pub const NR12: u16 = 0xFF12;
pub const NR13: u16 = 0xFF13;
pub const NR14: u16 = 0xFF14;
pub const NR21: u16 = 0xFF16;
pub const NR22: u16 = 0xFF17;
pub const NR23: u16 = 0xFF18;
pub const NR24: u16 = 0xFF19;
pub const NR30: u16 = 0xFF1A;
pub const NR31: u16 = 0xFF1B;
pub const NR32: u16 = 0xFF1C;
pub const NR33: u16 = 0xFF1D;
pub const NR34: u16 = 0xFF1E;
pub const NR41: u16 = 0xFF20;
pub const NR42: u16 = 0xFF21;
pub const NR43: u16 = 0xFF22;
pub const NR44: u16 = 0xFF23;
pub const NR50: u16 = 0xFF24;
pub const NR51: u16 = 0xFF25;
pub const NR52: u16 = 0xFF26;

pub const WAVE_RAM_START: u16 = 0xFF30;
pub const WAVE_RAM_END: u16 = 0xFF3F;

/// Number of bytes backing NR10..=NR52.
pub(crate) const REG_COUNT: usize = (NR52 - NR10 + 1) as usize;
pub(crate) const NR52_INDEX: usize = REG_COUNT - 1;

/// Writes issued by `Apu::reset` when no boot ROM runs, in boot ROM order.
/// NR52 comes first so the power gate lets the rest through.
pub(crate) const POST_BOOT_WRITES: [(u16, u8); 22] = [
    (NR52, 0x80),
    (NR10, 0x80),
    (NR11, 0xBF),
    (NR12, 0xF3),
    (NR13, 0xFF),
    (NR14, 0xBF),
    (NR21, 0x3F),
    (NR22, 0x00),
    (NR23, 0xFF),
    (NR24, 0xBF),
    (NR30, 0x7F),
    (NR31, 0xFF),
    (NR32, 0x9F),
    (NR33, 0xFF),
    (NR34, 0xBF),
    (NR41, 0xFF),
    (NR42, 0x00),
    (NR43, 0x00),
    (NR44, 0xBF),
    (NR50, 0x77),
    (NR51, 0xF3),
    (NR52, 0xF1),
];

/// Index into the register byte array, or `None` outside NR10..=NR52.
#[inline]
pub(crate) const fn reg_index(addr: u16) -> Option<usize> {
    if addr >= NR10 && addr <= NR52 {
        Some((addr - NR10) as usize)
    } else {
        None
    }
}

/// Unused holes inside NR10..=NR52 (NR20 and NR40 in some docs).
#[inline]
pub(crate) const fn is_unused(addr: u16) -> bool {
    matches!(addr, 0xFF15 | 0xFF1F)
}

#[inline]
pub(crate) const fn is_wave_ram(addr: u16) -> bool {
    addr >= WAVE_RAM_START && addr <= WAVE_RAM_END
}

/// Bits that always read back as 1: write-only fields, unused bits and the
/// unmapped holes inside the window.
pub(crate) const fn read_mask(addr: u16) -> u8 {
    match addr {
        NR10 => 0x80,
        NR11 | NR21 => 0x3F,
        NR12 | NR22 | NR42 | NR43 | NR50 | NR51 => 0x00,
        NR13 | NR23 | NR33 | NR31 | NR41 => 0xFF,
        NR14 | NR24 | NR34 | NR44 => 0xBF,
        NR30 => 0x7F,
        NR32 => 0x9F,
        NR52 => 0x70,
        WAVE_RAM_START..=WAVE_RAM_END => 0x00,
        _ => 0xFF,
    }
}
