use super::channel::{Channel, LengthCounter};

pub(crate) const WAVE_RAM_LEN: usize = 0x10;

#[derive(Clone, Copy, Debug)]
pub(crate) struct WaveChannel {
    pub(crate) enabled: bool,
    pub(crate) dac_enabled: bool,
    pub(crate) length: LengthCounter,
    /// NR32 output level code: 0 mute, 1 full, 2 half, 3 quarter.
    pub(crate) volume: u8,
    pub(crate) position: u8,
    pub(crate) frequency: u16,
    pub(crate) timer: u32,
    pub(crate) wave_ram: [u8; WAVE_RAM_LEN],
}

impl WaveChannel {
    pub(crate) fn new() -> Self {
        Self {
            enabled: false,
            dac_enabled: false,
            length: LengthCounter::new(256),
            volume: 0,
            position: 0,
            frequency: 0,
            timer: 0,
            wave_ram: [0; WAVE_RAM_LEN],
        }
    }

    /// Clear everything except wave RAM, which survives power-off.
    pub(crate) fn power_off(&mut self) {
        *self = Self {
            wave_ram: self.wave_ram,
            ..Self::new()
        };
    }

    pub(crate) fn period(&self) -> u32 {
        (2048 - u32::from(self.frequency)) * 2
    }

    pub(crate) fn write_dac(&mut self, val: u8) {
        self.dac_enabled = val & 0x80 != 0;
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    pub(crate) fn write_length(&mut self, val: u8) {
        self.length.load(u16::from(val));
    }

    pub(crate) fn write_volume(&mut self, val: u8) {
        self.volume = (val >> 5) & 0x03;
    }

    pub(crate) fn write_frequency_low(&mut self, val: u8) {
        self.frequency = (self.frequency & 0x700) | u16::from(val);
    }

    pub(crate) fn write_frequency_high(&mut self, val: u8) {
        self.frequency = (self.frequency & 0xFF) | (u16::from(val & 0x07) << 8);
    }

    pub(crate) fn trigger(&mut self, frozen_step: bool) {
        self.length.trigger(frozen_step);
        self.timer = self.period();
        self.position = 0;
        self.enabled = self.dac_enabled;
    }

    /// 4-bit sample at the current position, high nibble first.
    pub(crate) fn current_sample(&self) -> u8 {
        let byte = self.wave_ram[(self.position / 2) as usize];
        if self.position & 1 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }
}

impl Channel for WaveChannel {
    fn clock_timer(&mut self) {
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period();
            self.position = (self.position + 1) & 0x1F;
        }
    }

    fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    fn output(&self) -> u8 {
        if !self.active() {
            return 0;
        }
        let sample = self.current_sample();
        match self.volume {
            1 => sample,
            2 => sample >> 1,
            3 => sample >> 2,
            _ => 0,
        }
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn dac_enabled(&self) -> bool {
        self.dac_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> WaveChannel {
        let mut ch = WaveChannel::new();
        for (i, byte) in ch.wave_ram.iter_mut().enumerate() {
            let hi = (2 * i) as u8 & 0x0F;
            let lo = (2 * i + 1) as u8 & 0x0F;
            *byte = (hi << 4) | lo;
        }
        ch.write_dac(0x80);
        ch.write_volume(0x20);
        ch.write_frequency_low(0xFF);
        ch.write_frequency_high(0x07);
        ch.trigger(false);
        ch
    }

    #[test]
    fn plays_nibbles_in_order() {
        let mut ch = ramp();
        assert_eq!(ch.period(), 2);
        let mut seen = vec![ch.output()];
        for _ in 0..31 {
            ch.clock_timer();
            ch.clock_timer();
            seen.push(ch.output());
        }
        let expected: Vec<u8> = (0..32).map(|i| (i & 0x0F) as u8).collect();
        assert_eq!(seen, expected);
        ch.clock_timer();
        ch.clock_timer();
        assert_eq!(ch.position, 0);
    }

    #[test]
    fn volume_code_shifts_sample() {
        let mut ch = ramp();
        ch.position = 15;
        assert_eq!(ch.output(), 15);
        ch.write_volume(0x40);
        assert_eq!(ch.output(), 7);
        ch.write_volume(0x60);
        assert_eq!(ch.output(), 3);
        ch.write_volume(0x00);
        assert_eq!(ch.output(), 0);
    }

    #[test]
    fn dac_off_silences_and_disables() {
        let mut ch = ramp();
        ch.position = 15;
        ch.write_dac(0x00);
        assert!(!ch.enabled);
        assert_eq!(ch.output(), 0);
    }

    #[test]
    fn power_off_keeps_wave_ram() {
        let mut ch = ramp();
        let ram = ch.wave_ram;
        ch.power_off();
        assert_eq!(ch.wave_ram, ram);
        assert!(!ch.enabled);
        assert!(!ch.dac_enabled);
    }

    #[test]
    fn length_counts_256() {
        let mut ch = ramp();
        ch.length.enabled = true;
        assert_eq!(ch.length.counter, 256);
        for _ in 0..255 {
            ch.clock_length();
        }
        assert!(ch.enabled);
        ch.clock_length();
        assert!(!ch.enabled);
    }
}
