use super::channel::{Channel, Envelope, LengthCounter, envelope_dac_on};

const LFSR_RESET: u16 = 0x7FFF;

#[derive(Clone, Copy, Debug)]
pub(crate) struct NoiseChannel {
    pub(crate) enabled: bool,
    pub(crate) dac_enabled: bool,
    pub(crate) length: LengthCounter,
    pub(crate) envelope: Envelope,
    pub(crate) clock_shift: u8,
    pub(crate) divisor: u8,
    pub(crate) width7: bool,
    pub(crate) lfsr: u16,
    pub(crate) timer: u32,
}

impl NoiseChannel {
    pub(crate) fn new() -> Self {
        Self {
            enabled: false,
            dac_enabled: false,
            length: LengthCounter::new(64),
            envelope: Envelope::default(),
            clock_shift: 0,
            divisor: 0,
            width7: false,
            lfsr: 0,
            timer: 0,
        }
    }

    pub(crate) fn period(&self) -> u32 {
        let base = match self.divisor {
            0 => 8,
            d => u32::from(d) * 16,
        };
        base << self.clock_shift
    }

    pub(crate) fn write_length(&mut self, val: u8) {
        self.length.load(u16::from(val & 0x3F));
    }

    pub(crate) fn write_envelope(&mut self, val: u8) {
        self.envelope.write(val);
        self.dac_enabled = envelope_dac_on(val);
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    /// NR43: clock shift in bits 7-4, width in bit 3, divisor code in bits 2-0.
    pub(crate) fn write_polynomial(&mut self, val: u8) {
        self.clock_shift = val >> 4;
        self.width7 = val & 0x08 != 0;
        self.divisor = val & 0x07;
    }

    pub(crate) fn trigger(&mut self, frozen_step: bool) {
        self.length.trigger(frozen_step);
        self.timer = self.period();
        self.envelope.trigger();
        self.lfsr = LFSR_RESET;
        self.enabled = self.dac_enabled;
    }

    fn shift_lfsr(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 14);
        if self.width7 {
            self.lfsr = (self.lfsr & !0x40) | (bit << 6);
        }
    }
}

impl Channel for NoiseChannel {
    fn clock_timer(&mut self) {
        // Shifts 14 and 15 never clock the LFSR.
        if self.clock_shift >= 14 {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period();
            self.shift_lfsr();
        }
    }

    fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    fn output(&self) -> u8 {
        if !self.active() || self.lfsr & 1 != 0 {
            return 0;
        }
        self.envelope.volume
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn dac_enabled(&self) -> bool {
        self.dac_enabled
    }
}
