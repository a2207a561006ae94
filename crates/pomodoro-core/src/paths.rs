//! Standard paths used by pomodoro

use std::path::{Path, PathBuf};

/// Standard pomodoro paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/pomodoro)
    pub data: PathBuf,
    /// Config directory (~/.config/pomodoro)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("pomodoro");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pomodoro");

        Self { data, config }
    }

    /// Keep everything under a single root (`ROOT/data`, `ROOT/config`)
    pub fn with_root(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Settings file
    pub fn settings(&self) -> PathBuf {
        self.config.join("settings.json")
    }

    /// Append-only log of completed sessions
    pub fn session_log(&self) -> PathBuf {
        self.data.join("sessions.jsonl")
    }

    /// Notification history
    pub fn notify_history(&self) -> PathBuf {
        self.data.join("notify_history")
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_file(&self) -> PathBuf {
        self.data.join("pomodoro.log")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_layout() {
        let paths = Paths::with_root(Path::new("/tmp/pomo"));
        assert_eq!(paths.settings(), PathBuf::from("/tmp/pomo/config/settings.json"));
        assert_eq!(paths.session_log(), PathBuf::from("/tmp/pomo/data/sessions.jsonl"));
        assert_eq!(paths.log_file(), PathBuf::from("/tmp/pomo/data/pomodoro.log"));
    }

    #[test]
    fn test_default_paths_end_in_pomodoro() {
        let paths = Paths::new();
        assert!(paths.data.ends_with("pomodoro"));
        assert!(paths.config.ends_with("pomodoro"));
    }
}
