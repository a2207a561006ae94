//! Completion notifications
//!
//! The timer signals every natural completion to its registered notifiers.
//! `DesktopNotifier` forwards them to the platform notification command
//! (notify-send, osascript, kdialog) and keeps a one-line-per-entry history.

use anyhow::{bail, Result};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::session::SessionType;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Pomodoro Timer";

/// Receives "session X complete, next is Y"
pub trait Notifier {
    fn session_complete(&self, completed: SessionType, next: SessionType);
}

/// A notification to display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Whether to play a sound
    pub sound: bool,
}

impl Notification {
    /// The message shown when a session completes
    pub fn session_complete(completed: SessionType, next: SessionType) -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            message: format!("{} complete! Next: {}", session_phrase(completed), session_phrase(next)),
            sound: true,
        }
    }
}

fn session_phrase(session_type: SessionType) -> &'static str {
    match session_type {
        SessionType::Focus => "Focus session",
        SessionType::ShortBreak => "Short break",
        SessionType::LongBreak => "Long break",
    }
}

/// Available notification backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// macOS osascript
    Osascript,
    /// Linux notify-send
    NotifySend,
    /// KDE kdialog
    Kdialog,
    /// Terminal bell plus a line on stdout
    Echo,
    /// Deliver nowhere (history only)
    Silent,
}

impl Backend {
    /// Detect the best available backend for the current platform
    pub fn detect() -> Self {
        #[cfg(target_os = "macos")]
        {
            return Self::Osascript;
        }

        #[cfg(target_os = "linux")]
        {
            if Self::command_exists("notify-send") {
                return Self::NotifySend;
            }
            if Self::command_exists("kdialog") {
                return Self::Kdialog;
            }
            return Self::Echo;
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            Self::Echo
        }
    }

    /// Check if a command exists
    #[allow(dead_code)]
    fn command_exists(cmd: &str) -> bool {
        Command::new("which")
            .arg(cmd)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Osascript => "osascript",
            Self::NotifySend => "notify-send",
            Self::Kdialog => "kdialog",
            Self::Echo => "echo",
            Self::Silent => "silent",
        }
    }

    /// Send a notification using this backend
    pub fn send(&self, notification: &Notification) -> Result<()> {
        match self {
            Self::Osascript => self.send_osascript(notification),
            Self::NotifySend => self.send_notify_send(notification),
            Self::Kdialog => self.send_kdialog(notification),
            Self::Echo => self.send_echo(notification),
            Self::Silent => Ok(()),
        }
    }

    fn send_osascript(&self, notification: &Notification) -> Result<()> {
        let title = notification.title.replace('"', r#"\""#);
        let message = notification.message.replace('"', r#"\""#);

        let mut script = format!(r#"display notification "{}" with title "{}""#, message, title);

        if notification.sound {
            script.push_str(r#" sound name "default""#);
        }

        let status = quiet(Command::new("osascript").args(["-e", &script])).status()?;

        if !status.success() {
            bail!("osascript failed with status: {}", status);
        }
        Ok(())
    }

    fn send_notify_send(&self, notification: &Notification) -> Result<()> {
        let status = quiet(Command::new("notify-send").args([&notification.title, &notification.message]))
            .status()?;

        if !status.success() {
            bail!("notify-send failed with status: {}", status);
        }
        Ok(())
    }

    fn send_kdialog(&self, notification: &Notification) -> Result<()> {
        let status = quiet(Command::new("kdialog").args([
            "--passivepopup",
            &notification.message,
            "5",
            "--title",
            &notification.title,
        ]))
        .status()?;

        if !status.success() {
            bail!("kdialog failed with status: {}", status);
        }
        Ok(())
    }

    fn send_echo(&self, notification: &Notification) -> Result<()> {
        let bell = if notification.sound { "\x07" } else { "" };
        println!("{}[{}] {}", bell, notification.title, notification.message);
        Ok(())
    }
}

/// Keep a notification command off the terminal
fn quiet(command: &mut Command) -> &mut Command {
    command.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null())
}

/// Delivers completion notifications through a platform backend
pub struct DesktopNotifier {
    backend: Backend,
    history: Option<PathBuf>,
}

impl DesktopNotifier {
    pub fn new(backend: Backend) -> Self {
        Self { backend, history: None }
    }

    /// Also append each notification to a history file
    pub fn with_history(mut self, path: PathBuf) -> Self {
        self.history = Some(path);
        self
    }

    fn log(&self, notification: &Notification) -> Result<()> {
        let Some(path) = &self.history else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(
            file,
            "{}|{}|{}",
            Utc::now().timestamp(),
            notification.title,
            notification.message
        )?;
        Ok(())
    }
}

impl Notifier for DesktopNotifier {
    fn session_complete(&self, completed: SessionType, next: SessionType) {
        let notification = Notification::session_complete(completed, next);
        debug!(backend = self.backend.name(), message = %notification.message, "sending notification");

        if let Err(e) = self.backend.send(&notification) {
            warn!(backend = self.backend.name(), error = %e, "notification delivery failed");
        }
        if let Err(e) = self.log(&notification) {
            warn!(error = %e, "failed to record notification history");
        }
    }
}
