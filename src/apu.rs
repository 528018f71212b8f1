//! Top-level sound unit: register dispatch, power gating, frame sequencer
//! fan-out and output sampling.

mod channel;
mod mixer;
mod noise;
mod pulse;
pub mod registers;
mod sequencer;
mod wave;

use crate::hardware::Model;
use channel::Channel;
use mixer::Mixer;
use noise::NoiseChannel;
use pulse::PulseChannel;
use registers::*;
use sequencer::{FrameClocks, FrameSequencer};
use wave::WaveChannel;

pub use mixer::{AUDIO_LATENCY_MS, CPU_CLOCK_HZ, DEFAULT_SAMPLE_RATE};
pub use sequencer::FRAME_SEQUENCER_PERIOD;

/// Game Boy programmable sound generator.
///
/// The bus drives [`Apu::read`] and [`Apu::write`], the clock driver calls
/// [`Apu::step`] once per 4.194304 MHz cycle and the audio sink polls
/// [`Apu::sample`] (or drains [`Apu::pop_sample`]) at its own pace.
///
/// A freshly constructed unit is powered off and silent; call
/// [`Apu::reset`] to bring it up.
pub struct Apu {
    model: Model,
    powered: bool,
    regs: [u8; REG_COUNT],
    ch1: PulseChannel,
    ch2: PulseChannel,
    ch3: WaveChannel,
    ch4: NoiseChannel,
    sequencer: FrameSequencer,
    mixer: Mixer,
}

impl Apu {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            powered: false,
            regs: [0; REG_COUNT],
            ch1: PulseChannel::new(true),
            ch2: PulseChannel::new(false),
            ch3: WaveChannel::new(),
            ch4: NoiseChannel::new(),
            sequencer: FrameSequencer::new(),
            mixer: Mixer::new(DEFAULT_SAMPLE_RATE),
        }
    }

    /// Reinitialize every part of the unit. Without a boot ROM the
    /// post-boot register values are written through [`Apu::write`].
    pub fn reset(&mut self, has_bios: bool) {
        let rate = self.mixer.sample_rate();
        *self = Self::new(self.model);
        self.mixer.set_sample_rate(rate);
        log::debug!("APU reset (model={}, bios={has_bios})", self.model.name());
        if !has_bios {
            for (addr, val) in POST_BOOT_WRITES {
                self.write(addr, val);
            }
        }
    }

    /// Advance one master clock cycle.
    pub fn step(&mut self) {
        if self.powered {
            if let Some(clocks) = self.sequencer.tick() {
                self.clock_frame_sequencer(clocks);
            }
            self.ch1.clock_timer();
            self.ch2.clock_timer();
            self.ch3.clock_timer();
            self.ch4.clock_timer();
        }
        self.mixer.tick(|| {
            [
                self.ch1.output(),
                self.ch2.output(),
                self.ch3.output(),
                self.ch4.output(),
            ]
        });
    }

    /// Most recently latched stereo pair.
    pub fn sample(&self) -> (u8, u8) {
        self.mixer.latched()
    }

    /// Oldest queued stereo pair. One pair is queued per output boundary;
    /// the queue holds at most [`AUDIO_LATENCY_MS`] of audio.
    pub fn pop_sample(&mut self) -> Option<(u8, u8)> {
        self.mixer.pop_sample()
    }

    pub fn queued_samples(&self) -> usize {
        self.mixer.queued()
    }

    pub fn sample_rate(&self) -> u32 {
        self.mixer.sample_rate()
    }

    pub fn set_sample_rate(&mut self, rate: u32) {
        self.mixer.set_sample_rate(rate);
    }

    pub fn model(&self) -> Model {
        self.model
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    fn clock_frame_sequencer(&mut self, clocks: FrameClocks) {
        if clocks.length {
            self.ch1.clock_length();
            self.ch2.clock_length();
            self.ch3.clock_length();
            self.ch4.clock_length();
        }
        if clocks.sweep {
            self.ch1.clock_sweep();
            self.update_ch1_freq_regs();
        }
        if clocks.envelope {
            self.ch1.clock_envelope();
            self.ch2.clock_envelope();
            self.ch4.clock_envelope();
        }
    }

    /// Mirror the current channel 1 frequency into NR13/NR14.
    fn update_ch1_freq_regs(&mut self) {
        let freq = self.ch1.frequency;
        self.regs[0x03] = (freq & 0xFF) as u8;
        self.regs[0x04] = (self.regs[0x04] & !0x07) | ((freq >> 8) as u8 & 0x07);
    }

    pub fn read(&self, addr: u16) -> u8 {
        if is_wave_ram(addr) {
            return self.ch3.wave_ram[(addr - WAVE_RAM_START) as usize];
        }
        let Some(idx) = reg_index(addr) else {
            return 0xFF;
        };
        if addr == NR52 {
            return self.read_status();
        }
        if is_unused(addr) {
            return 0xFF;
        }
        if !self.powered {
            return 0x00;
        }
        self.regs[idx] | read_mask(addr)
    }

    fn read_status(&self) -> u8 {
        let mut val = read_mask(NR52);
        if self.powered {
            val |= 0x80;
        }
        if self.ch1.enabled {
            val |= 0x01;
        }
        if self.ch2.enabled {
            val |= 0x02;
        }
        if self.ch3.enabled {
            val |= 0x04;
        }
        if self.ch4.enabled {
            val |= 0x08;
        }
        val
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        if is_wave_ram(addr) {
            self.ch3.wave_ram[(addr - WAVE_RAM_START) as usize] = val;
            return;
        }
        let Some(idx) = reg_index(addr) else {
            return;
        };
        if addr == NR52 {
            self.write_power(val);
            return;
        }
        if !self.powered || is_unused(addr) {
            return;
        }
        self.regs[idx] = val;

        let frozen = self.sequencer.next_step_skips_length();
        let trigger = val & 0x80 != 0;
        let length_enable = val & 0x40 != 0;

        match addr {
            NR10 => {
                if self.ch1.write_sweep(val) {
                    apu_trace!("ch1 disabled by sweep negate clear");
                }
            }
            NR11 => self.ch1.write_duty_length(val),
            NR12 => self.ch1.write_envelope(val),
            NR13 => self.ch1.write_frequency_low(val),
            NR14 => {
                self.ch1.write_frequency_high(val);
                if self.ch1.length.set_enabled(length_enable, frozen) && !trigger {
                    self.ch1.enabled = false;
                }
                if trigger {
                    self.ch1.trigger(frozen);
                    apu_trace!(
                        "ch1 trigger freq={} duty={} length={} enabled={}",
                        self.ch1.frequency,
                        self.ch1.duty,
                        self.ch1.length.counter,
                        self.ch1.enabled
                    );
                }
            }
            NR21 => self.ch2.write_duty_length(val),
            NR22 => self.ch2.write_envelope(val),
            NR23 => self.ch2.write_frequency_low(val),
            NR24 => {
                self.ch2.write_frequency_high(val);
                if self.ch2.length.set_enabled(length_enable, frozen) && !trigger {
                    self.ch2.enabled = false;
                }
                if trigger {
                    self.ch2.trigger(frozen);
                    apu_trace!(
                        "ch2 trigger freq={} duty={} length={} enabled={}",
                        self.ch2.frequency,
                        self.ch2.duty,
                        self.ch2.length.counter,
                        self.ch2.enabled
                    );
                }
            }
            NR30 => self.ch3.write_dac(val),
            NR31 => self.ch3.write_length(val),
            NR32 => self.ch3.write_volume(val),
            NR33 => self.ch3.write_frequency_low(val),
            NR34 => {
                self.ch3.write_frequency_high(val);
                if self.ch3.length.set_enabled(length_enable, frozen) && !trigger {
                    self.ch3.enabled = false;
                }
                if trigger {
                    self.ch3.trigger(frozen);
                    apu_trace!(
                        "ch3 trigger freq={} length={} enabled={}",
                        self.ch3.frequency,
                        self.ch3.length.counter,
                        self.ch3.enabled
                    );
                }
            }
            NR41 => self.ch4.write_length(val),
            NR42 => self.ch4.write_envelope(val),
            NR43 => self.ch4.write_polynomial(val),
            NR44 => {
                if self.ch4.length.set_enabled(length_enable, frozen) && !trigger {
                    self.ch4.enabled = false;
                }
                if trigger {
                    self.ch4.trigger(frozen);
                    apu_trace!(
                        "ch4 trigger period={} length={} enabled={}",
                        self.ch4.period(),
                        self.ch4.length.counter,
                        self.ch4.enabled
                    );
                }
            }
            NR50 => self.mixer.write_nr50(val),
            NR51 => self.mixer.write_nr51(val),
            _ => {}
        }
    }

    fn write_power(&mut self, val: u8) {
        let on = val & 0x80 != 0;
        if on && !self.powered {
            // The sequencer restarts at step 0; channels stay as they are.
            self.powered = true;
            self.sequencer = FrameSequencer::new();
            log::debug!("APU power on");
        } else if !on && self.powered {
            self.power_off();
            log::debug!("APU power off");
        }
        self.regs[NR52_INDEX] = val & 0x80;
    }

    fn power_off(&mut self) {
        self.powered = false;
        self.regs.fill(0);
        self.ch1 = PulseChannel::new(true);
        self.ch2 = PulseChannel::new(false);
        self.ch3.power_off();
        self.ch4 = NoiseChannel::new();
        self.mixer.power_off();
    }

    /// Current DAC input (0..=15) of channel `n` (1-4); 0 for other values.
    pub fn channel_output(&self, n: u8) -> u8 {
        match n {
            1 => self.ch1.output(),
            2 => self.ch2.output(),
            3 => self.ch3.output(),
            4 => self.ch4.output(),
            _ => 0,
        }
    }

    pub fn sequencer_step(&self) -> u8 {
        self.sequencer.step
    }

    pub fn ch1_frequency(&self) -> u16 {
        self.ch1.frequency
    }

    /// Current duty step position for channel 1.
    pub fn ch1_duty_pos(&self) -> u8 {
        self.ch1.duty_pos
    }

    /// Current length counter value for channel 1.
    pub fn ch1_length(&self) -> u16 {
        self.ch1.length.counter
    }

    /// Current envelope volume for channel 1.
    pub fn ch1_volume(&self) -> u8 {
        self.ch1.envelope.volume
    }

    /// Current envelope timer value for channel 1.
    pub fn ch1_envelope_timer(&self) -> u8 {
        self.ch1.envelope.timer
    }

    pub fn ch1_timer(&self) -> u32 {
        self.ch1.timer
    }

    /// Current sweep shadow register value for channel 1.
    pub fn ch1_sweep_shadow(&self) -> u16 {
        self.ch1.sweep_shadow()
    }

    /// Current sweep timer value for channel 1.
    pub fn ch1_sweep_timer(&self) -> u8 {
        self.ch1.sweep_timer()
    }

    /// Whether channel 1 sweep is currently enabled.
    pub fn ch1_sweep_enabled(&self) -> bool {
        self.ch1.sweep_enabled()
    }

    pub fn ch2_frequency(&self) -> u16 {
        self.ch2.frequency
    }

    /// Current duty step position for channel 2.
    pub fn ch2_duty_pos(&self) -> u8 {
        self.ch2.duty_pos
    }

    /// Current length counter value for channel 2.
    pub fn ch2_length(&self) -> u16 {
        self.ch2.length.counter
    }

    /// Current envelope volume for channel 2.
    pub fn ch2_volume(&self) -> u8 {
        self.ch2.envelope.volume
    }

    /// Current length counter value for channel 3.
    pub fn ch3_length(&self) -> u16 {
        self.ch3.length.counter
    }

    /// Current playback position within wave RAM for channel 3.
    pub fn ch3_position(&self) -> u8 {
        self.ch3.position
    }

    /// Current length counter value for channel 4.
    pub fn ch4_length(&self) -> u16 {
        self.ch4.length.counter
    }

    /// Current envelope volume for channel 4.
    pub fn ch4_volume(&self) -> u8 {
        self.ch4.envelope.volume
    }

    /// Current LFSR state for channel 4.
    pub fn ch4_lfsr(&self) -> u16 {
        self.ch4.lfsr
    }
}

impl Default for Apu {
    fn default() -> Self {
        Self::new(Model::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn powered() -> Apu {
        let mut apu = Apu::default();
        apu.write(NR52, 0x80);
        apu
    }

    #[test]
    fn sweep_clock_mirrors_frequency_into_registers() {
        let mut apu = powered();
        apu.write(NR10, 0x11);
        apu.write(NR12, 0xF0);
        apu.write(NR13, 0x00);
        apu.write(NR14, 0x82);
        apu.ch1.clock_sweep();
        apu.update_ch1_freq_regs();
        assert_eq!(apu.ch1.frequency, 0x300);
        assert_eq!(apu.regs[0x03], 0x00);
        assert_eq!(apu.regs[0x04] & 0x07, 0x03);
    }

    #[test]
    fn power_off_resets_channels_but_keeps_wave_ram() {
        let mut apu = powered();
        apu.write(0xFF30, 0xAB);
        apu.write(NR30, 0x80);
        apu.write(NR34, 0x80);
        apu.write(NR21, 0x80);
        apu.write(NR22, 0xF0);
        apu.write(NR24, 0x80);
        assert!(apu.ch2.enabled && apu.ch3.enabled);
        apu.write(NR52, 0x00);
        assert!(!apu.ch2.enabled && !apu.ch3.enabled);
        assert!(!apu.ch2.dac_enabled && !apu.ch3.dac_enabled);
        assert_eq!(apu.ch2.duty, 0);
        assert_eq!(apu.ch3.wave_ram[0], 0xAB);
        assert!(apu.regs.iter().all(|&r| r == 0));
    }

    #[test]
    fn mixer_sees_channel_outputs() {
        let mut apu = powered();
        apu.write(NR50, 0x77);
        apu.write(NR51, 0x80); // CH4 left only
        apu.write(NR42, 0xF0);
        apu.write(NR44, 0x80);
        apu.ch4.lfsr = 0x7FFE;
        assert_eq!(apu.channel_output(4), 15);
        let outputs = [0, 0, 0, apu.channel_output(4)];
        assert_eq!(apu.mixer.mix(outputs), (15, 0));
    }
}
