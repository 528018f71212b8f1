use std::path::PathBuf;

use clap::Parser;
use gb_psg::render::{self, Tone};
use gb_psg::{Apu, Model};
use log::info;

#[derive(Parser)]
#[command(about = "Render a Game Boy sound channel tone to a WAV file")]
struct Args {
    /// Path of the WAV file to write
    output: PathBuf,

    /// Channel to play (1-4)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    channel: u8,

    /// 11-bit frequency register value
    #[arg(long, conflicts_with = "hz", value_parser = clap::value_parser!(u16).range(0..=2047))]
    frequency: Option<u16>,

    /// Pitch in Hz, converted to the nearest frequency register value
    #[arg(long)]
    hz: Option<f64>,

    /// Pulse duty selector (0=12.5%, 1=25%, 2=50%, 3=75%)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=3))]
    duty: u8,

    /// Initial volume (0-15)
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u8).range(0..=15))]
    volume: u8,

    /// Envelope pace (0 keeps the volume constant)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=7))]
    envelope: u8,

    /// Raise the volume instead of lowering it on each envelope step
    #[arg(long)]
    envelope_up: bool,

    /// NR43 value for the noise channel
    #[arg(long, default_value_t = 0x00)]
    noise: u8,

    /// Duration in seconds
    #[arg(long, default_value_t = 1.0)]
    seconds: f64,

    /// Output sample rate in Hz
    #[arg(long, default_value_t = gb_psg::apu::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Console model (gb or gba)
    #[arg(long, default_value = "gb")]
    model: Model,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let frames = render::frame_count(args.seconds, args.sample_rate)?;

    let frequency = match (args.frequency, args.hz) {
        (Some(f), _) => f,
        (None, Some(hz)) => render::hz_to_frequency(hz, args.channel),
        (None, None) => render::hz_to_frequency(440.0, args.channel),
    };
    let tone = Tone {
        channel: args.channel,
        frequency,
        duty: args.duty,
        volume: args.volume,
        envelope_pace: args.envelope,
        envelope_up: args.envelope_up,
        noise: args.noise,
    };

    let mut apu = Apu::new(args.model);
    apu.set_sample_rate(args.sample_rate);

    info!(
        "rendering channel {} (freq={}, model={}) for {:.2}s",
        tone.channel,
        tone.frequency,
        args.model.name(),
        args.seconds
    );
    let samples = render::render(&mut apu, &tone, frames);
    render::write_wav(&args.output, &samples, args.sample_rate)?;

    info!(
        "wrote {} stereo frames ({:.2}s) to {}",
        samples.len(),
        args.seconds,
        args.output.display()
    );
    Ok(())
}
