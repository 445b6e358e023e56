//! Derived statistics over the session log.
//!
//! All functions are pure over `(&[Session], now)` so the clock is
//! injectable in tests; `SessionStore` wraps them with `Utc::now()`.
//!
//! Day attribution uses the local calendar. The weekly total is the one
//! exception: a rolling window over raw timestamps, not calendar-aligned.
//! That asymmetry is product behavior, not an oversight.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Local, Months, NaiveDate, Utc};

use crate::session::{DaySummary, Session};

/// Pomodoros completed on the current local calendar day.
pub fn today_pomos(sessions: &[Session], now: DateTime<Utc>) -> u32 {
    let today = now.with_timezone(&Local).date_naive();
    sessions
        .iter()
        .filter(|s| s.local_day() == today)
        .map(|s| s.pomodoros)
        .sum()
}

/// Pomodoros inside the rolling seven-day window ending at `now`.
pub fn week_pomos(sessions: &[Session], now: DateTime<Utc>) -> u32 {
    let week_ago = now - chrono::Duration::days(7);
    sessions
        .iter()
        .filter(|s| s.date >= week_ago)
        .map(|s| s.pomodoros)
        .sum()
}

pub fn all_time_pomos(sessions: &[Session]) -> u32 {
    sessions.iter().map(|s| s.pomodoros).sum()
}

/// Count of consecutive active local days ending today or yesterday.
///
/// An inactive gap of more than one day breaks the chain entirely: the
/// streak is 0, not "whatever it was when it ended".
pub fn day_streak(sessions: &[Session], now: DateTime<Utc>) -> u32 {
    let today = now.with_timezone(&Local).date_naive();
    let mut active: Vec<NaiveDate> = sessions.iter().map(|s| s.local_day()).collect();
    active.sort_unstable();
    active.dedup();
    active.reverse();

    let Some(&most_recent) = active.first() else {
        return 0;
    };
    let Some(yesterday) = today.pred_opt() else {
        return 0;
    };
    if most_recent < yesterday {
        return 0;
    }

    let mut streak = 0;
    let mut expected = most_recent;
    for day in active {
        if day != expected {
            break;
        }
        streak += 1;
        match expected.pred_opt() {
            Some(prev) => expected = prev,
            None => break,
        }
    }
    streak
}

/// Group sessions into per-day summaries, newest day first, capped at the
/// seven most recent active days.
pub fn recent_days(sessions: &[Session]) -> Vec<DaySummary> {
    let mut by_day: BTreeMap<NaiveDate, DaySummary> = BTreeMap::new();
    for s in sessions {
        let day = s.local_day();
        let entry = by_day.entry(day).or_insert_with(|| DaySummary {
            date: day,
            pomos: 0,
            minutes: 0,
            tags: HashMap::new(),
        });
        entry.pomos += s.pomodoros;
        entry.minutes += s.duration_minutes;
        if let Some(tag) = s.tag {
            *entry.tags.entry(tag).or_insert(0) += s.pomodoros;
        }
    }
    by_day.into_values().rev().take(7).collect()
}

/// Day -> pomodoro totals for sessions within the last six months.
/// Days without sessions are absent, never zero-valued.
pub fn heatmap(sessions: &[Session], now: DateTime<Utc>) -> BTreeMap<NaiveDate, u32> {
    let cutoff = now
        .checked_sub_months(Months::new(6))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut result = BTreeMap::new();
    for s in sessions.iter().filter(|s| s.date >= cutoff) {
        *result.entry(s.local_day()).or_insert(0) += s.pomodoros;
    }
    result
}
