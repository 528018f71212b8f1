//! Offline tone rendering: program one channel through the register
//! interface, run the master clock and collect the output stream.

use std::path::Path;

use crate::apu::{Apu, CPU_CLOCK_HZ};
use crate::apu::registers::*;

/// Longest duration [`frame_count`] accepts, in seconds.
pub const MAX_RENDER_SECONDS: f64 = 3600.0;

/// Triangle waveform loaded into wave RAM for channel 3 tones.
pub const TRIANGLE_WAVE: [u8; 16] = [
    0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54, 0x32, 0x10,
];

/// Single-channel tone description.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tone {
    /// Channel number, 1-4.
    pub channel: u8,
    /// 11-bit frequency register value (ignored for channel 4).
    pub frequency: u16,
    /// Duty selector 0-3 for the pulse channels.
    pub duty: u8,
    /// Initial envelope volume 0-15. For channel 3 this picks the closest
    /// output level code.
    pub volume: u8,
    /// NRx2 envelope pace (0 holds the volume).
    pub envelope_pace: u8,
    /// Envelope direction: true raises the volume.
    pub envelope_up: bool,
    /// NR43 value for channel 4.
    pub noise: u8,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            channel: 1,
            frequency: hz_to_frequency(440.0, 1),
            duty: 2,
            volume: 15,
            envelope_pace: 0,
            envelope_up: false,
            noise: 0x00,
        }
    }
}

/// Convert a pitch in Hz to the channel's 11-bit frequency register value.
/// Pulse channels run at 131072 / (2048 - f) Hz, the wave channel at half
/// that.
pub fn hz_to_frequency(hz: f64, channel: u8) -> u16 {
    let base = if channel == 3 { 65_536.0 } else { 131_072.0 };
    if hz <= 0.0 {
        return 0;
    }
    (2048.0 - base / hz).round().clamp(0.0, 2047.0) as u16
}

impl Tone {
    fn nrx2(&self) -> u8 {
        ((self.volume & 0x0F) << 4) | (u8::from(self.envelope_up) << 3) | (self.envelope_pace & 0x07)
    }

    fn wave_level(&self) -> u8 {
        match self.volume {
            0 => 0x00,
            1..=5 => 0x60,
            6..=11 => 0x40,
            _ => 0x20,
        }
    }

    /// Write the tone's registers and trigger its channel. Assumes the unit
    /// is powered.
    pub fn program(&self, apu: &mut Apu) {
        let lo = (self.frequency & 0xFF) as u8;
        let hi = ((self.frequency >> 8) & 0x07) as u8;
        let route = match self.channel {
            1..=4 => 0x11 << (self.channel - 1),
            _ => 0,
        };
        apu.write(NR50, 0x77);
        apu.write(NR51, route);
        match self.channel {
            1 => {
                apu.write(NR10, 0x00);
                apu.write(NR11, (self.duty & 0x03) << 6);
                apu.write(NR12, self.nrx2());
                apu.write(NR13, lo);
                apu.write(NR14, 0x80 | hi);
            }
            2 => {
                apu.write(NR21, (self.duty & 0x03) << 6);
                apu.write(NR22, self.nrx2());
                apu.write(NR23, lo);
                apu.write(NR24, 0x80 | hi);
            }
            3 => {
                for (i, byte) in TRIANGLE_WAVE.iter().enumerate() {
                    apu.write(WAVE_RAM_START + i as u16, *byte);
                }
                apu.write(NR30, 0x80);
                apu.write(NR32, self.wave_level());
                apu.write(NR33, lo);
                apu.write(NR34, 0x80 | hi);
            }
            4 => {
                apu.write(NR42, self.nrx2());
                apu.write(NR43, self.noise);
                apu.write(NR44, 0x80);
            }
            other => log::warn!("ignoring tone for unknown channel {other}"),
        }
    }
}

/// Number of stereo frames covering `seconds` at `sample_rate`, rounded up.
/// Rejects non-finite, non-positive and over-long durations, and rates
/// outside `1..=CPU_CLOCK_HZ`.
pub fn frame_count(seconds: f64, sample_rate: u32) -> Result<usize, String> {
    if sample_rate == 0 || sample_rate > CPU_CLOCK_HZ {
        return Err(format!(
            "sample rate must be between 1 and {CPU_CLOCK_HZ} Hz, got {sample_rate}"
        ));
    }
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("duration must be a positive number of seconds, got {seconds}"));
    }
    if seconds > MAX_RENDER_SECONDS {
        return Err(format!(
            "duration {seconds}s exceeds the {MAX_RENDER_SECONDS}s limit"
        ));
    }
    Ok((seconds * f64::from(sample_rate)).ceil() as usize)
}

/// Reset `apu` to the post-boot state, play `tone` and collect `frames`
/// stereo pairs at the unit's sample rate.
pub fn render(apu: &mut Apu, tone: &Tone, frames: usize) -> Vec<(u8, u8)> {
    apu.reset(false);
    // Silence the channel the post-boot state leaves running.
    apu.write(NR12, 0x00);
    tone.program(apu);

    let mut out = Vec::with_capacity(frames.min(apu.sample_rate() as usize));
    while out.len() < frames {
        apu.step();
        while out.len() < frames {
            let Some(pair) = apu.pop_sample() else {
                break;
            };
            out.push(pair);
        }
    }
    log::debug!("rendered {} frames for channel {}", out.len(), tone.channel);
    out
}

/// Write unsigned 8-bit stereo frames as a 16-bit stereo WAV file.
pub fn write_wav(path: &Path, frames: &[(u8, u8)], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &(left, right) in frames {
        writer.write_sample(to_pcm16(left))?;
        writer.write_sample(to_pcm16(right))?;
    }
    writer.finalize()
}

/// Unsigned 8-bit PCM to signed 16-bit.
#[inline]
pub fn to_pcm16(sample: u8) -> i16 {
    (i16::from(sample) - 128) << 8
}
