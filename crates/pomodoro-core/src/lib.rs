//! Pomodoro Core - Shared functionality for the pomodoro tool
//!
//! Standard locations, JSON config persistence, and display formatting.

pub mod config;
pub mod format;
pub mod paths;

pub use paths::Paths;
