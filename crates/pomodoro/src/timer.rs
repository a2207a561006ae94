//! The timer state machine
//!
//! `Timer` owns the countdown, the current session type, the cycle counter,
//! the settings and the in-memory session log. It is driven by discrete
//! events: user actions (`start`, `pause`, `reset`, `skip`), settings edits,
//! and `tick` from the scheduling driver.
//!
//! Skip and natural completion share the "what comes next" rule but differ
//! in two ways: only completion advances `focus_count`, and only completion
//! writes a `SessionRecord` and notifies.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::notify::Notifier;
use crate::session::{SessionRecord, SessionType};
use crate::settings::{Settings, SettingsUpdate};
use crate::store::Storage;

/// Timer status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
        }
    }
}

/// Read-only view of the timer for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerSnapshot {
    pub status: TimerStatus,
    pub remaining_seconds: u32,
    pub session_type: SessionType,
    pub focus_count: u32,
    pub settings: Settings,
    /// Full length of the current session type in seconds
    pub total_seconds: u32,
    /// Elapsed share of the current session, 0.0..=1.0
    pub progress: f64,
}

/// Outcome of a natural completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Record appended for the session that just ended
    pub record: SessionRecord,
    /// Session type now loaded on the timer
    pub next: SessionType,
}

/// Pomodoro timer
pub struct Timer {
    status: TimerStatus,
    remaining_seconds: u32,
    session_type: SessionType,
    focus_count: u32,
    settings: Settings,
    sessions: Vec<SessionRecord>,
    storage: Box<dyn Storage>,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl Timer {
    /// Create an idle timer on a fresh focus session
    pub fn new(settings: Settings, sessions: Vec<SessionRecord>, storage: Box<dyn Storage>) -> Self {
        Self {
            status: TimerStatus::Idle,
            remaining_seconds: settings.duration_for(SessionType::Focus),
            session_type: SessionType::Focus,
            focus_count: 0,
            settings,
            sessions,
            storage,
            notifiers: Vec::new(),
        }
    }

    /// Create a timer from whatever the storage holds.
    ///
    /// Unreadable settings fall back to defaults and an unreadable log to an
    /// empty history; neither is fatal.
    pub fn load(storage: Box<dyn Storage>) -> Self {
        let settings = match storage.load_settings() {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!(error = %e, "could not load settings, using defaults");
                Settings::default()
            }
        };

        let sessions = storage.load_sessions().unwrap_or_else(|e| {
            warn!(error = %e, "could not load session log, starting empty");
            Vec::new()
        });

        debug!(sessions = sessions.len(), "timer loaded");
        Self::new(settings, sessions, storage)
    }

    /// Register a completion listener
    pub fn add_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn focus_count(&self) -> u32 {
        self.focus_count
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Completed sessions, oldest first
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Full length of the current session type in seconds
    pub fn total_seconds(&self) -> u32 {
        self.settings.duration_for(self.session_type)
    }

    /// Elapsed share of the current session
    pub fn progress(&self) -> f64 {
        let total = self.total_seconds();
        if total == 0 {
            return 0.0;
        }
        total.saturating_sub(self.remaining_seconds) as f64 / total as f64
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            status: self.status,
            remaining_seconds: self.remaining_seconds,
            session_type: self.session_type,
            focus_count: self.focus_count,
            settings: self.settings.clone(),
            total_seconds: self.total_seconds(),
            progress: self.progress(),
        }
    }

    /// Start or resume. Calling while running leaves it running.
    pub fn start(&mut self) {
        self.set_status(TimerStatus::Running);
    }

    /// Freeze the countdown
    pub fn pause(&mut self) {
        if self.status == TimerStatus::Running {
            self.set_status(TimerStatus::Paused);
        }
    }

    /// Stop and rewind the current session to its full length
    pub fn reset(&mut self) {
        self.set_status(TimerStatus::Idle);
        self.remaining_seconds = self.total_seconds();
    }

    /// Jump to the next session without completing this one.
    ///
    /// `focus_count` is not advanced, even when skipping a focus session.
    pub fn skip(&mut self) {
        let from = self.session_type;
        let next = from.next(self.focus_count, self.settings.sessions_until_long_break);

        self.enter(from, next, self.focus_count);
        self.set_status(TimerStatus::Idle);
        debug!(from = from.as_str(), to = next.as_str(), "skipped session");
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> Option<Completion> {
        if self.remaining_seconds <= 1 {
            Some(self.complete_session())
        } else {
            self.remaining_seconds -= 1;
            None
        }
    }

    /// Finish the current session as if it ran down to zero
    pub fn complete_session(&mut self) -> Completion {
        let was_running = self.status == TimerStatus::Running;
        let from = self.session_type;

        let focus_count = match from {
            SessionType::Focus => self.focus_count + 1,
            _ => self.focus_count,
        };
        let next = from.next(focus_count, self.settings.sessions_until_long_break);

        let record = SessionRecord::new(from, self.settings.duration_for(from));
        if let Err(e) = self.storage.append_session(&record) {
            warn!(error = %e, "could not persist completed session");
        }
        self.sessions.push(record.clone());

        self.enter(from, next, focus_count);
        let status = if self.settings.auto_start_next {
            TimerStatus::Running
        } else {
            TimerStatus::Idle
        };
        self.set_status(status);

        info!(
            completed = from.as_str(),
            next = next.as_str(),
            focus_count = self.focus_count,
            "session complete"
        );

        if was_running {
            for notifier in &self.notifiers {
                notifier.session_complete(from, next);
            }
        }

        Completion { record, next }
    }

    /// Merge a settings edit and persist it.
    ///
    /// While idle the countdown is resized to the new duration; a running or
    /// paused session keeps its remaining time.
    pub fn update_settings(&mut self, update: &SettingsUpdate) {
        self.settings.merge(update);

        if let Err(e) = self.storage.save_settings(&self.settings) {
            warn!(error = %e, "could not persist settings");
        }

        if self.status == TimerStatus::Idle {
            self.remaining_seconds = self.total_seconds();
        }
        debug!(status = self.status.as_str(), remaining = self.remaining_seconds, "settings updated");
    }

    /// Load `next`, clearing the cycle counter when a long break ends
    fn enter(&mut self, from: SessionType, next: SessionType, focus_count: u32) {
        self.focus_count = if from == SessionType::LongBreak && next == SessionType::Focus {
            0
        } else {
            focus_count
        };
        self.session_type = next;
        self.remaining_seconds = self.settings.duration_for(next);
    }

    fn set_status(&mut self, status: TimerStatus) {
        if self.status != status {
            debug!(from = self.status.as_str(), to = status.as_str(), "timer status");
        }
        self.status = status;
    }
}
