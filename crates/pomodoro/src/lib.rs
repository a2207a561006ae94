//! pomodoro - Focus/break interval timer with session history
//!
//! Alternates focus sessions with short breaks, inserting a long break after
//! every N focus sessions, and keeps a log of completed sessions for
//! statistics:
//! - `timer`: the session state machine
//! - `driver`: the one-second cadence that advances a running timer
//! - `stats`: daily and weekly rollups, totals and streaks
//! - `store`: settings and session log persistence
//! - `notify`: completion notifications

pub mod driver;
pub mod notify;
pub mod session;
pub mod settings;
pub mod stats;
pub mod store;
pub mod timer;

pub use driver::Driver;
pub use notify::{DesktopNotifier, Notifier};
pub use session::{SessionRecord, SessionType};
pub use settings::{Settings, SettingsError, SettingsUpdate};
pub use stats::{DayStats, Summary};
pub use store::{FileStore, MemoryStore, Storage};
pub use timer::{Completion, Timer, TimerSnapshot, TimerStatus};
