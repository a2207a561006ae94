//! Settings and session log storage
//!
//! - Settings: ~/.config/pomodoro/settings.json
//! - Session log: ~/.local/share/pomodoro/sessions.jsonl (one record per line)

use anyhow::{Context, Result};
use pomodoro_core::Paths;
use std::cell::RefCell;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::rc::Rc;
use tracing::warn;

use crate::session::SessionRecord;
use crate::settings::Settings;

/// Where the timer keeps its settings and completed sessions
pub trait Storage {
    /// Saved settings, `None` if nothing was saved yet
    fn load_settings(&self) -> Result<Option<Settings>>;

    fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// All completed sessions, oldest first
    fn load_sessions(&self) -> Result<Vec<SessionRecord>>;

    fn append_session(&self, record: &SessionRecord) -> Result<()>;
}

/// File-backed storage
pub struct FileStore {
    settings_path: PathBuf,
    log_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the standard paths. Directories are created
    /// on first write.
    pub fn new(paths: &Paths) -> Self {
        Self {
            settings_path: paths.settings(),
            log_path: paths.session_log(),
        }
    }
}

impl Storage for FileStore {
    fn load_settings(&self) -> Result<Option<Settings>> {
        pomodoro_core::config::load(&self.settings_path)
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        pomodoro_core::config::save(&self.settings_path, settings)
    }

    fn load_sessions(&self) -> Result<Vec<SessionRecord>> {
        let path = &self.log_path;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open session log: {}", path.display()))?;

        let reader = BufReader::new(file);
        let mut sessions = Vec::new();

        for (line_num, line) in reader.split(b'\n').enumerate() {
            let bytes = match line {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(line = line_num + 1, error = %e, "session log read stopped early");
                    break;
                }
            };
            let line = String::from_utf8_lossy(&bytes);

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<SessionRecord>(&line) {
                Ok(session) => sessions.push(session),
                Err(e) => {
                    warn!(line = line_num + 1, error = %e, "skipping unreadable session record");
                }
            }
        }

        sessions.sort_by_key(|s| s.completed_at);

        Ok(sessions)
    }

    fn append_session(&self, record: &SessionRecord) -> Result<()> {
        let path = &self.log_path;
        let line = serde_json::to_string(record).context("Failed to serialize session record")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open session log: {}", path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to session log: {}", path.display()))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    settings: Option<Settings>,
    sessions: Vec<SessionRecord>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory storage. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with saved settings and sessions
    pub fn with_contents(settings: Option<Settings>, sessions: Vec<SessionRecord>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.borrow_mut();
            inner.settings = settings;
            inner.sessions = sessions;
        }
        store
    }

    /// Make every subsequent read fail
    pub fn fail_reads(&self, fail: bool) {
        self.inner.borrow_mut().fail_reads = fail;
    }

    /// Make every subsequent write fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    pub fn settings(&self) -> Option<Settings> {
        self.inner.borrow().settings.clone()
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.inner.borrow().sessions.clone()
    }
}

impl Storage for MemoryStore {
    fn load_settings(&self) -> Result<Option<Settings>> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            anyhow::bail!("memory store is unreadable");
        }
        Ok(inner.settings.clone())
    }

    fn save_settings(&self, settings: &Settings) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            anyhow::bail!("memory store is read-only");
        }
        inner.settings = Some(settings.clone());
        Ok(())
    }

    fn load_sessions(&self) -> Result<Vec<SessionRecord>> {
        let inner = self.inner.borrow();
        if inner.fail_reads {
            anyhow::bail!("memory store is unreadable");
        }
        Ok(inner.sessions.clone())
    }

    fn append_session(&self, record: &SessionRecord) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            anyhow::bail!("memory store is read-only");
        }
        inner.sessions.push(record.clone());
        Ok(())
    }
}
