//! pilights — timed LED patterns on Raspberry Pi GPIO pins.

pub mod config;
pub mod controller;
pub mod error;
pub mod gpio;
pub mod groups;
pub mod sequencer;
pub mod timing;

pub use error::PilightsError;
