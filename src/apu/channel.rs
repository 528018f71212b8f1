/// Clocking interface shared by the four sound channels.
///
/// Every channel is driven by its own frequency timer once per master cycle
/// and by the frame sequencer's length clock. Sweep and envelope clocks only
/// reach the channels that own those units, so the default bodies do nothing.
pub(crate) trait Channel {
    /// Advance the frequency timer by one master cycle.
    fn clock_timer(&mut self);

    /// 256 Hz length clock.
    fn clock_length(&mut self);

    /// 128 Hz sweep clock.
    fn clock_sweep(&mut self) {}

    /// 64 Hz envelope clock.
    fn clock_envelope(&mut self) {}

    /// Current DAC input in the range 0..=15.
    fn output(&self) -> u8;

    fn enabled(&self) -> bool;

    fn dac_enabled(&self) -> bool;

    fn active(&self) -> bool {
        self.enabled() && self.dac_enabled()
    }
}

/// Length counter shared by all channels. `full` is 64 for the pulse and
/// noise channels and 256 for the wave channel.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LengthCounter {
    pub(crate) counter: u16,
    pub(crate) enabled: bool,
    full: u16,
}

impl LengthCounter {
    pub(crate) const fn new(full: u16) -> Self {
        Self {
            counter: 0,
            enabled: false,
            full,
        }
    }

    /// Load from the NRx1 length field (`full - value`).
    pub(crate) fn load(&mut self, value: u16) {
        self.counter = self.full - (value & (self.full - 1));
    }

    /// Returns true when this clock expired the counter.
    pub(crate) fn clock(&mut self) -> bool {
        if self.enabled && self.counter > 0 {
            self.counter -= 1;
            return self.counter == 0;
        }
        false
    }

    /// Trigger reload. `frozen_step` is true when the sequencer's next step
    /// does not clock length; a counter reloaded from zero then starts one
    /// short.
    pub(crate) fn trigger(&mut self, frozen_step: bool) {
        if self.counter == 0 {
            self.counter = self.full;
            if self.enabled && frozen_step {
                self.counter -= 1;
            }
        }
    }

    /// Apply an NRx4 length-enable write. Returns true if the extra clock
    /// produced by enabling length on a non-length step expired the counter.
    pub(crate) fn set_enabled(&mut self, enable: bool, frozen_step: bool) -> bool {
        let was_enabled = self.enabled;
        self.enabled = enable;
        if !was_enabled && enable && frozen_step && self.counter > 0 {
            self.counter -= 1;
            return self.counter == 0;
        }
        false
    }
}

/// Volume envelope used by the pulse and noise channels.
#[derive(Default, Clone, Copy, Debug)]
pub(crate) struct Envelope {
    pub(crate) initial: u8,
    pub(crate) add: bool,
    pub(crate) pace: u8,
    pub(crate) volume: u8,
    pub(crate) timer: u8,
}

impl Envelope {
    /// Latch NRx2 parameters. The running volume only changes on trigger.
    pub(crate) fn write(&mut self, val: u8) {
        self.initial = val >> 4;
        self.add = val & 0x08 != 0;
        self.pace = val & 0x07;
    }

    pub(crate) fn trigger(&mut self) {
        self.volume = self.initial;
        self.timer = if self.pace == 0 { 8 } else { self.pace };
    }

    pub(crate) fn clock(&mut self) {
        if self.pace == 0 {
            return;
        }
        if self.timer > 0 {
            self.timer -= 1;
        }
        if self.timer == 0 {
            self.timer = self.pace;
            if self.add && self.volume < 15 {
                self.volume += 1;
            } else if !self.add && self.volume > 0 {
                self.volume -= 1;
            }
        }
    }
}

/// NRx2 bits 7-3 all clear turn the DAC off.
#[inline]
pub(crate) const fn envelope_dac_on(val: u8) -> bool {
    val & 0xF8 != 0
}
