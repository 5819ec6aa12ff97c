//! TrackVision command-line front end
//!
//! Exposes the command layer and sinks for integration testing.

pub mod cli;
pub mod commands;
pub mod settings;
pub mod sinks;
