// 512 Hz frame sequencer tick: 4_194_304 / 8192
pub const FRAME_SEQUENCER_PERIOD: u32 = 8192;

/// Clocks produced by one frame sequencer step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameClocks {
    /// 256 Hz
    pub(crate) length: bool,
    /// 128 Hz
    pub(crate) sweep: bool,
    /// 64 Hz
    pub(crate) envelope: bool,
}

impl FrameClocks {
    const fn for_step(step: u8) -> Self {
        Self {
            length: step & 1 == 0,
            sweep: step == 2 || step == 6,
            envelope: step == 7,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct FrameSequencer {
    counter: u32,
    /// Step that fires on the next counter expiry.
    pub(crate) step: u8,
}

impl FrameSequencer {
    pub(crate) const fn new() -> Self {
        Self {
            counter: FRAME_SEQUENCER_PERIOD,
            step: 0,
        }
    }

    /// Advance one master cycle. Returns the clocks to deliver when the
    /// counter expires.
    pub(crate) fn tick(&mut self) -> Option<FrameClocks> {
        self.counter -= 1;
        if self.counter != 0 {
            return None;
        }
        self.counter = FRAME_SEQUENCER_PERIOD;
        let clocks = FrameClocks::for_step(self.step);
        self.step = (self.step + 1) & 7;
        Some(clocks)
    }

    /// True when the next step does not clock length counters. NRx4 writes
    /// made in this half of the length period see the extra-clock quirks.
    pub(crate) const fn next_step_skips_length(&self) -> bool {
        self.step & 1 == 1
    }
}

impl Default for FrameSequencer {
    fn default() -> Self {
        Self::new()
    }
}
