use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionTag;
use crate::timer::TimerState;

/// Every externally visible state change produces an Event.
/// Commands return them; the presentation layer renders or logs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_secs: u32,
        tag: SessionTag,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    TimerCompleted {
        pomodoros: u32,
        duration_minutes: u32,
        tag: SessionTag,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u32,
        total_secs: u32,
        progress: f64,
        tag: SessionTag,
        at: DateTime<Utc>,
    },
}
