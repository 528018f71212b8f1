//! Cycle-accurate Game Boy programmable sound generator.
//!
//! This crate contains the platform-agnostic sound unit. The CPU/bus that
//! issues register accesses, the master clock driver and any audio device
//! live outside and drive the unit through [`apu::Apu`].

#[cfg(feature = "apu-trace")]
macro_rules! apu_trace {
    ($($arg:tt)*) => {
        log::trace!(target: "gb_psg::apu", $($arg)*);
    };
}
#[cfg(not(feature = "apu-trace"))]
macro_rules! apu_trace {
    ($($arg:tt)*) => {};
}

/// Audio Processing Unit (APU) emulation.
pub mod apu;

/// Console models and model-specific hooks.
pub mod hardware;

/// Offline tone rendering and WAV output.
pub mod render;

pub use apu::Apu;
pub use hardware::Model;
