//! JSON-file session log.
//!
//! The log is the sole source of truth for statistics: a single JSON array
//! of session records, rewritten in full on every append. Decode failures on
//! load degrade to an empty log so a corrupt file can never wedge the app.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

use crate::error::StoreError;
use crate::session::{DaySummary, Session, SessionTag};
use crate::stats;

/// Append-only store of completed sessions, flushed to disk on every append.
pub struct SessionStore {
    path: PathBuf,
    sessions: Vec<Session>,
}

impl SessionStore {
    /// Open the store at `data_dir()/sessions.json`.
    pub fn open() -> crate::error::Result<Self> {
        let path = super::data_dir()?.join("sessions.json");
        Ok(Self::open_at(path))
    }

    /// Open a store backed by an explicit file (tests, tooling).
    ///
    /// A missing file yields an empty log; an unreadable or corrupt one
    /// yields an empty log with a warning on stderr.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let sessions = load_log(&path);
        Self { path, sessions }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Append a completed session and flush the whole log.
    ///
    /// The in-memory append is never rolled back; a flush failure is logged
    /// and retried once, then absorbed. Callers cannot observe it -- the
    /// session is only at risk if the process dies before the next
    /// successful flush.
    pub fn record(&mut self, pomodoros: u32, duration_minutes: u32, tag: SessionTag) {
        self.sessions
            .push(Session::new(pomodoros, duration_minutes, tag));
        if let Err(e) = self.flush() {
            eprintln!("Warning: failed to flush session log: {e}; retrying");
            if let Err(e) = self.flush() {
                eprintln!("Warning: session log flush retry failed: {e}");
            }
        }
    }

    /// Serialize the full log next to the target, then rename over it, so
    /// readers never observe a half-written file.
    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.sessions)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    // ── Statistics ───────────────────────────────────────────────────

    /// Pomodoros completed on the current local calendar day.
    pub fn today_pomos(&self) -> u32 {
        stats::today_pomos(&self.sessions, Utc::now())
    }

    /// Pomodoros inside the rolling last seven days.
    pub fn week_pomos(&self) -> u32 {
        stats::week_pomos(&self.sessions, Utc::now())
    }

    pub fn all_time_pomos(&self) -> u32 {
        stats::all_time_pomos(&self.sessions)
    }

    /// Consecutive active days ending today or yesterday.
    pub fn day_streak(&self) -> u32 {
        stats::day_streak(&self.sessions, Utc::now())
    }

    /// Per-day summaries, newest first, at most the last 7 active days.
    pub fn recent_days(&self) -> Vec<DaySummary> {
        stats::recent_days(&self.sessions)
    }

    /// Day -> pomodoro totals over the last six months.
    pub fn heatmap(&self) -> BTreeMap<NaiveDate, u32> {
        stats::heatmap(&self.sessions, Utc::now())
    }
}

fn load_log(path: &Path) -> Vec<Session> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(source) => {
            let err = StoreError::Read {
                path: path.to_path_buf(),
                source,
            };
            eprintln!("Warning: {err}; starting empty");
            return Vec::new();
        }
    };
    match serde_json::from_slice(&data) {
        Ok(sessions) => sessions,
        Err(e) => {
            let err = StoreError::Json(e);
            eprintln!(
                "Warning: corrupt session log at {}: {err}; starting empty",
                path.display()
            );
            Vec::new()
        }
    }
}
