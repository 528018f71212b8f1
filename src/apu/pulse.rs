use super::channel::{Channel, Envelope, LengthCounter, envelope_dac_on};

// Duty table for pulse channels (CH1, CH2). Each entry is an 8-step
// waveform. Index (0..3) corresponds to duty selector in NRx1:
// 0 -> 00000001 (12.5%)
// 1 -> 10000001 (25%)
// 2 -> 10000111 (50%)
// 3 -> 01111110 (75%)
pub(crate) const DUTY_TABLE: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 0],
];

const MAX_FREQUENCY: u16 = 2047;

/// Channel 1 frequency sweep unit.
#[derive(Default, Clone, Copy, Debug)]
pub(crate) struct Sweep {
    pub(crate) period: u8,
    pub(crate) negate: bool,
    pub(crate) shift: u8,
    pub(crate) timer: u8,
    pub(crate) shadow: u16,
    pub(crate) enabled: bool,
    /// A subtraction has been computed since the last trigger.
    neg_used: bool,
}

impl Sweep {
    fn calculate(&mut self) -> u16 {
        let delta = self.shadow >> self.shift;
        if self.negate {
            self.neg_used = true;
            self.shadow.wrapping_sub(delta)
        } else {
            self.shadow + delta
        }
    }

    fn reload_timer(&mut self) {
        self.timer = if self.period == 0 { 8 } else { self.period };
    }

    /// Latch NR10. Returns true when the write disables the channel: leaving
    /// subtraction mode after a subtraction was used kills channel 1.
    fn write(&mut self, val: u8) -> bool {
        let was_negate = self.negate;
        self.period = (val >> 4) & 0x07;
        self.negate = val & 0x08 != 0;
        self.shift = val & 0x07;
        was_negate && !self.negate && self.neg_used
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct PulseChannel {
    pub(crate) enabled: bool,
    pub(crate) dac_enabled: bool,
    pub(crate) length: LengthCounter,
    pub(crate) duty: u8,
    pub(crate) duty_pos: u8,
    pub(crate) frequency: u16,
    pub(crate) timer: u32,
    pub(crate) envelope: Envelope,
    pub(crate) sweep: Option<Sweep>,
}

impl PulseChannel {
    pub(crate) fn new(with_sweep: bool) -> Self {
        Self {
            enabled: false,
            dac_enabled: false,
            length: LengthCounter::new(64),
            duty: 0,
            duty_pos: 0,
            frequency: 0,
            timer: 0,
            envelope: Envelope::default(),
            sweep: with_sweep.then(Sweep::default),
        }
    }

    pub(crate) fn period(&self) -> u32 {
        (2048 - u32::from(self.frequency)) * 4
    }

    /// NR10. Returns true if the write disabled the channel.
    pub(crate) fn write_sweep(&mut self, val: u8) -> bool {
        let killed = self.sweep.as_mut().is_some_and(|s| s.write(val));
        if killed {
            self.enabled = false;
        }
        killed
    }

    /// NRx1: duty in bits 7-6, length load in bits 5-0.
    pub(crate) fn write_duty_length(&mut self, val: u8) {
        self.duty = val >> 6;
        self.length.load(u16::from(val & 0x3F));
    }

    /// NRx2: envelope parameters and DAC power.
    pub(crate) fn write_envelope(&mut self, val: u8) {
        self.envelope.write(val);
        self.dac_enabled = envelope_dac_on(val);
        if !self.dac_enabled {
            self.enabled = false;
        }
    }

    pub(crate) fn write_frequency_low(&mut self, val: u8) {
        self.frequency = (self.frequency & 0x700) | u16::from(val);
    }

    pub(crate) fn write_frequency_high(&mut self, val: u8) {
        self.frequency = (self.frequency & 0xFF) | (u16::from(val & 0x07) << 8);
    }

    /// Restart the channel. `frozen_step` reports whether the sequencer's
    /// next step skips the length clock.
    pub(crate) fn trigger(&mut self, frozen_step: bool) {
        self.length.trigger(frozen_step);
        self.timer = self.period();
        self.envelope.trigger();
        self.enabled = self.dac_enabled;

        if let Some(sweep) = self.sweep.as_mut() {
            sweep.shadow = self.frequency;
            sweep.neg_used = false;
            sweep.reload_timer();
            sweep.enabled = sweep.period != 0 || sweep.shift != 0;
            if sweep.shift != 0 && sweep.calculate() > MAX_FREQUENCY {
                self.enabled = false;
            }
        }
    }

    pub(crate) fn sweep_shadow(&self) -> u16 {
        self.sweep.as_ref().map_or(0, |s| s.shadow)
    }

    pub(crate) fn sweep_timer(&self) -> u8 {
        self.sweep.as_ref().map_or(0, |s| s.timer)
    }

    pub(crate) fn sweep_enabled(&self) -> bool {
        self.sweep.as_ref().is_some_and(|s| s.enabled)
    }
}

impl Channel for PulseChannel {
    fn clock_timer(&mut self) {
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period();
            self.duty_pos = (self.duty_pos + 1) & 7;
        }
    }

    fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    fn clock_sweep(&mut self) {
        let Some(sweep) = self.sweep.as_mut() else {
            return;
        };
        if sweep.timer > 0 {
            sweep.timer -= 1;
        }
        if sweep.timer != 0 {
            return;
        }
        sweep.reload_timer();
        if sweep.period == 0 || !sweep.enabled {
            return;
        }
        let new_freq = sweep.calculate();
        if new_freq > MAX_FREQUENCY {
            apu_trace!("ch1 sweep overflow shadow={} new={}", sweep.shadow, new_freq);
            self.enabled = false;
        } else if sweep.shift != 0 {
            sweep.shadow = new_freq;
            self.frequency = new_freq;
            if sweep.calculate() > MAX_FREQUENCY {
                apu_trace!("ch1 sweep overflow after commit freq={}", new_freq);
                self.enabled = false;
            }
        }
    }

    fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    fn output(&self) -> u8 {
        if !self.active() {
            return 0;
        }
        DUTY_TABLE[self.duty as usize][self.duty_pos as usize] * self.envelope.volume
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn dac_enabled(&self) -> bool {
        self.dac_enabled
    }
}
