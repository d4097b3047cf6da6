//! Core types: errors, configuration, atomic file writes.

pub mod atomic;
pub mod config;
pub mod errors;
