use std::collections::VecDeque;

pub const CPU_CLOCK_HZ: u32 = 4_194_304;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const AUDIO_LATENCY_MS: u32 = 40;

/// Rational down-sampler from the master clock to the output rate.
///
/// Each master cycle adds `rate` to the accumulator; a sample boundary is
/// crossed whenever it reaches `CPU_CLOCK_HZ`, and the remainder carries, so
/// boundaries never drift over long runs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SampleClock {
    rate: u32,
    acc: u32,
}

impl SampleClock {
    pub(crate) const fn new(rate: u32) -> Self {
        Self { rate, acc: 0 }
    }

    pub(crate) const fn rate(&self) -> u32 {
        self.rate
    }

    /// Advance one master cycle. Returns true on a sample boundary.
    pub(crate) fn tick(&mut self) -> bool {
        self.acc += self.rate;
        if self.acc >= CPU_CLOCK_HZ {
            self.acc -= CPU_CLOCK_HZ;
            true
        } else {
            false
        }
    }
}

/// NR50/NR51 mixing and the latched output pair.
#[derive(Clone, Debug)]
pub(crate) struct Mixer {
    /// NR50 bits 6-4
    pub(crate) left_volume: u8,
    /// NR50 bits 2-0
    pub(crate) right_volume: u8,
    /// NR51: bits 7-4 route CH4..CH1 left, bits 3-0 route CH4..CH1 right.
    pub(crate) routing: u8,
    clock: SampleClock,
    latched: (u8, u8),
    samples: VecDeque<(u8, u8)>,
}

impl Mixer {
    pub(crate) fn new(rate: u32) -> Self {
        Self {
            left_volume: 0,
            right_volume: 0,
            routing: 0,
            clock: SampleClock::new(rate),
            latched: (0, 0),
            samples: VecDeque::with_capacity(Self::queue_capacity(rate)),
        }
    }

    // Keep <= AUDIO_LATENCY_MS of stereo frames in the queue
    fn queue_capacity(rate: u32) -> usize {
        ((rate as usize * AUDIO_LATENCY_MS as usize) / 1000).max(1)
    }

    pub(crate) fn write_nr50(&mut self, val: u8) {
        self.left_volume = (val >> 4) & 0x07;
        self.right_volume = val & 0x07;
    }

    pub(crate) fn write_nr51(&mut self, val: u8) {
        self.routing = val;
    }

    /// Power-off clears volume and routing; the sample clock keeps running.
    pub(crate) fn power_off(&mut self) {
        self.left_volume = 0;
        self.right_volume = 0;
        self.routing = 0;
    }

    pub(crate) fn sample_rate(&self) -> u32 {
        self.clock.rate()
    }

    pub(crate) fn set_sample_rate(&mut self, rate: u32) {
        self.clock = SampleClock::new(rate.clamp(1, CPU_CLOCK_HZ));
        let cap = Self::queue_capacity(self.clock.rate());
        while self.samples.len() > cap {
            self.samples.pop_front();
        }
    }

    /// Sum routed channel outputs per terminal and scale by master volume.
    pub(crate) fn mix(&self, outputs: [u8; 4]) -> (u8, u8) {
        let mut left = 0u32;
        let mut right = 0u32;
        for (ch, &out) in outputs.iter().enumerate() {
            if self.routing & (0x10 << ch) != 0 {
                left += u32::from(out);
            }
            if self.routing & (0x01 << ch) != 0 {
                right += u32::from(out);
            }
        }
        let scale = |sum: u32, volume: u8| (sum * u32::from(volume) / 7).min(0xFF) as u8;
        (scale(left, self.left_volume), scale(right, self.right_volume))
    }

    /// Advance the sample clock; on a boundary latch `outputs` and queue the
    /// pair.
    pub(crate) fn tick(&mut self, outputs: impl FnOnce() -> [u8; 4]) {
        if !self.clock.tick() {
            return;
        }
        self.latched = self.mix(outputs());
        if self.samples.len() >= Self::queue_capacity(self.clock.rate()) {
            self.samples.pop_front();
        }
        self.samples.push_back(self.latched);
    }

    pub(crate) fn latched(&self) -> (u8, u8) {
        self.latched
    }

    pub(crate) fn pop_sample(&mut self) -> Option<(u8, u8)> {
        self.samples.pop_front()
    }

    pub(crate) fn queued(&self) -> usize {
        self.samples.len()
    }
}
