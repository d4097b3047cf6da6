//! Derived presentation values: styling and the clock area.

pub mod appearance;
pub mod clock;
