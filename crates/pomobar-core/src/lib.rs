//! # Pomobar Core Library
//!
//! Core logic for Pomobar, a menu-bar Pomodoro timer: a caller-driven
//! countdown engine feeding an append-only session log, with statistics
//! derived from the log on demand.
//!
//! ## Architecture
//!
//! - **Timer engine**: a state machine (`Idle`/`Running`/`Paused`) advanced
//!   by a 1 Hz `tick()` from the presentation layer; completion appends a
//!   session to the store and fires the feedback collaborators
//! - **Session store**: a JSON-file log of completed sessions -- the sole
//!   source of truth for streaks, day summaries and the activity heatmap
//! - **Feedback seams**: the status display callback, tone cues and user
//!   notifications are injected collaborators; the core never talks to the
//!   OS directly
//!
//! The menu-bar GUI is a thin layer over this crate; the bundled CLI drives
//! the same API.

pub mod error;
pub mod events;
pub mod feedback;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use feedback::{Notifier, Silent, ToneCue, TonePlayer};
pub use session::{DaySummary, Session, SessionTag};
pub use storage::{Config, SessionStore};
pub use timer::{TimerEngine, TimerState};
