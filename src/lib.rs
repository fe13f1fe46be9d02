//! Beat detection and rhythm-game choreography generation.
//!
//! [`analysis`] turns a mono waveform into beats, a BPM estimate and an
//! intensity curve; [`choreography`] turns those beats into note and wall
//! placements per difficulty. [`song::process_song`] runs both.

pub mod analysis;
pub mod audio;
pub mod choreography;
pub mod config;
pub mod error;
pub mod rng;
pub mod song;

pub use error::{Error, Result};
