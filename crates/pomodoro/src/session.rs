//! Session types and completed session records
//!
//! A session is one interval of the cycle: a focus block or a short/long
//! break. Every interval that runs down to zero leaves a `SessionRecord`
//! in the log.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type of session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    /// Work interval
    #[default]
    Focus,
    /// Rest between focus sessions
    ShortBreak,
    /// Rest at the end of a cycle
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Focus => "focus",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Focus => "Focus",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    /// The session that follows this one.
    ///
    /// `focus_count` is the number of focus sessions finished in the current
    /// cycle, already including the one being exited when called on completion.
    pub fn next(&self, focus_count: u32, sessions_until_long_break: u32) -> Self {
        match self {
            SessionType::Focus if focus_count >= sessions_until_long_break => SessionType::LongBreak,
            SessionType::Focus => SessionType::ShortBreak,
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A completed session (one line of the session log)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier
    pub id: String,
    /// Type of the session that completed
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Nominal duration in seconds (the configured length, not wall time)
    #[serde(rename = "duration")]
    pub duration_secs: u32,
    /// When the session reached zero
    pub completed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Create a record completed right now
    pub fn new(session_type: SessionType, duration_secs: u32) -> Self {
        Self::completed_at(session_type, duration_secs, Utc::now())
    }

    /// Create a record with an explicit completion time
    pub fn completed_at(session_type: SessionType, duration_secs: u32, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_type,
            duration_secs,
            completed_at,
        }
    }

    /// Local calendar day the session completed on
    pub fn date_key(&self) -> NaiveDate {
        self.completed_at.with_timezone(&Local).date_naive()
    }

    /// Duration rounded to whole minutes (half a minute rounds up)
    pub fn minutes(&self) -> u32 {
        (self.duration_secs + 30) / 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_from_focus() {
        assert_eq!(SessionType::Focus.next(1, 4), SessionType::ShortBreak);
        assert_eq!(SessionType::Focus.next(3, 4), SessionType::ShortBreak);
        assert_eq!(SessionType::Focus.next(4, 4), SessionType::LongBreak);
        assert_eq!(SessionType::Focus.next(5, 4), SessionType::LongBreak);
    }

    #[test]
    fn test_breaks_always_lead_to_focus() {
        assert_eq!(SessionType::ShortBreak.next(4, 4), SessionType::Focus);
        assert_eq!(SessionType::LongBreak.next(0, 4), SessionType::Focus);
    }

    #[test]
    fn test_record_minutes_round() {
        assert_eq!(SessionRecord::new(SessionType::Focus, 1500).minutes(), 25);
        assert_eq!(SessionRecord::new(SessionType::Focus, 89).minutes(), 1);
        assert_eq!(SessionRecord::new(SessionType::Focus, 90).minutes(), 2);
        assert_eq!(SessionRecord::new(SessionType::Focus, 29).minutes(), 0);
    }

    #[test]
    fn test_record_serializes_with_log_field_names() {
        let record = SessionRecord::new(SessionType::ShortBreak, 300);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "shortBreak");
        assert_eq!(json["duration"], 300);
        assert!(json["completed_at"].is_string());

        let back: SessionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let a = SessionRecord::new(SessionType::Focus, 60);
        let b = SessionRecord::new(SessionType::Focus, 60);
        assert_ne!(a.id, b.id);
    }
}
