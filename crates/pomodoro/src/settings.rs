//! User settings
//!
//! `Settings` is the persisted record. `SettingsUpdate` is a partial edit;
//! callers validate it against the UI bounds before handing it to the timer,
//! which applies whatever it is given.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::session::SessionType;

pub const FOCUS_BOUNDS: RangeInclusive<u32> = 1..=120;
pub const SHORT_BREAK_BOUNDS: RangeInclusive<u32> = 1..=60;
pub const LONG_BREAK_BOUNDS: RangeInclusive<u32> = 1..=60;
pub const LONG_BREAK_EVERY_BOUNDS: RangeInclusive<u32> = 2..=10;
pub const DAILY_GOAL_BOUNDS: RangeInclusive<u32> = 1..=20;

/// Rejected settings input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}

/// Timer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Focus length in minutes
    pub focus_duration: u32,
    /// Short break length in minutes
    pub short_break_duration: u32,
    /// Long break length in minutes
    pub long_break_duration: u32,
    /// Focus sessions per cycle before a long break
    pub sessions_until_long_break: u32,
    /// Focus sessions per day to aim for
    pub daily_goal: u32,
    /// Start the next session as soon as one completes
    pub auto_start_next: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            sessions_until_long_break: 4,
            daily_goal: 8,
            auto_start_next: false,
        }
    }
}

impl Settings {
    /// Configured length of a session type in minutes
    pub fn minutes_for(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Focus => self.focus_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Configured length of a session type in seconds
    pub fn duration_for(&self, session_type: SessionType) -> u32 {
        self.minutes_for(session_type).saturating_mul(60)
    }

    /// Apply the fields present in `update`
    pub fn merge(&mut self, update: &SettingsUpdate) {
        if let Some(v) = update.focus_duration {
            self.focus_duration = v;
        }
        if let Some(v) = update.short_break_duration {
            self.short_break_duration = v;
        }
        if let Some(v) = update.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = update.sessions_until_long_break {
            self.sessions_until_long_break = v;
        }
        if let Some(v) = update.daily_goal {
            self.daily_goal = v;
        }
        if let Some(v) = update.auto_start_next {
            self.auto_start_next = v;
        }
    }
}

/// A partial settings edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub focus_duration: Option<u32>,
    pub short_break_duration: Option<u32>,
    pub long_break_duration: Option<u32>,
    pub sessions_until_long_break: Option<u32>,
    pub daily_goal: Option<u32>,
    pub auto_start_next: Option<bool>,
}

impl SettingsUpdate {
    /// An update that sets the duration of one session type
    pub fn duration(session_type: SessionType, minutes: u32) -> Self {
        let mut update = Self::default();
        match session_type {
            SessionType::Focus => update.focus_duration = Some(minutes),
            SessionType::ShortBreak => update.short_break_duration = Some(minutes),
            SessionType::LongBreak => update.long_break_duration = Some(minutes),
        }
        update
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check every present field against its own bounds
    pub fn validate(&self) -> Result<(), SettingsError> {
        check("focus duration", self.focus_duration, FOCUS_BOUNDS)?;
        check("short break duration", self.short_break_duration, SHORT_BREAK_BOUNDS)?;
        check("long break duration", self.long_break_duration, LONG_BREAK_BOUNDS)?;
        check(
            "sessions until long break",
            self.sessions_until_long_break,
            LONG_BREAK_EVERY_BOUNDS,
        )?;
        check("daily goal", self.daily_goal, DAILY_GOAL_BOUNDS)?;
        Ok(())
    }
}

fn check(field: &'static str, value: Option<u32>, bounds: RangeInclusive<u32>) -> Result<(), SettingsError> {
    match value {
        Some(value) if !bounds.contains(&value) => Err(SettingsError::OutOfRange {
            field,
            value,
            min: *bounds.start(),
            max: *bounds.end(),
        }),
        _ => Ok(()),
    }
}
