//! Session records and tags.
//!
//! A `Session` is written exactly once, at countdown completion, and never
//! mutated afterwards. The on-disk shape is the legacy JSON format
//! (`id`/`date`/`pomodoros`/`durationMinutes`/`tag`) so logs written by any
//! earlier build stay readable.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Category label attached to a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionTag {
    Reading,
    Writing,
    Coding,
}

impl SessionTag {
    pub const ALL: [SessionTag; 3] = [
        SessionTag::Reading,
        SessionTag::Writing,
        SessionTag::Coding,
    ];

    pub fn emoji(&self) -> &'static str {
        match self {
            SessionTag::Reading => "\u{1F4D6}",
            SessionTag::Writing => "\u{270F}\u{FE0F}",
            SessionTag::Coding => "\u{1F4BB}",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionTag::Reading => "reading",
            SessionTag::Writing => "writing",
            SessionTag::Coding => "coding",
        }
    }
}

impl Default for SessionTag {
    fn default() -> Self {
        SessionTag::Coding
    }
}

impl std::str::FromStr for SessionTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reading" => Ok(SessionTag::Reading),
            "writing" => Ok(SessionTag::Writing),
            "coding" => Ok(SessionTag::Coding),
            other => Err(format!(
                "unknown tag '{other}' (expected reading, writing or coding)"
            )),
        }
    }
}

impl std::fmt::Display for SessionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single completed countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    /// Instant of completion. Stored in UTC; calendar-day attribution
    /// happens in the local timezone.
    pub date: DateTime<Utc>,
    /// 25-minute-equivalent units earned by this session, at least 1.
    pub pomodoros: u32,
    pub duration_minutes: u32,
    /// Absent for legacy records and for tags this build does not know.
    #[serde(
        default,
        deserialize_with = "lenient_tag",
        skip_serializing_if = "Option::is_none"
    )]
    pub tag: Option<SessionTag>,
}

impl Session {
    /// Stamp a freshly completed session with a new id and the current time.
    pub fn new(pomodoros: u32, duration_minutes: u32, tag: SessionTag) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            pomodoros,
            duration_minutes,
            tag: Some(tag),
        }
    }

    /// Local calendar day this session counts toward.
    pub fn local_day(&self) -> NaiveDate {
        self.date.with_timezone(&Local).date_naive()
    }
}

/// Unknown tag strings decode to `None` so a log written by a newer build
/// never fails to load here.
fn lenient_tag<'de, D>(de: D) -> Result<Option<SessionTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(de)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// Aggregate of one local calendar day, recomputed from the log on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub pomos: u32,
    pub minutes: u32,
    /// Tag -> pomodoro count for the day. Untagged sessions contribute to
    /// the totals but not to this map.
    pub tags: HashMap<SessionTag, u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_to_legacy_field_names() {
        let session = Session::new(2, 50, SessionTag::Writing);
        let value = serde_json::to_value(&session).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("date"));
        assert!(obj.contains_key("pomodoros"));
        assert!(obj.contains_key("durationMinutes"));
        assert_eq!(obj["tag"], "writing");
    }

    #[test]
    fn absent_tag_is_omitted() {
        let mut session = Session::new(1, 25, SessionTag::Coding);
        session.tag = None;
        let value = serde_json::to_value(&session).unwrap();
        assert!(!value.as_object().unwrap().contains_key("tag"));
    }

    #[test]
    fn unknown_tag_decodes_to_none() {
        let json = r#"{
            "id": "ba4e9f0e-8a3f-4a6e-9a63-4f6e2f1c7d20",
            "date": "2026-08-01T10:00:00Z",
            "pomodoros": 1,
            "durationMinutes": 25,
            "tag": "gardening"
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.tag, None);
    }

    #[test]
    fn missing_tag_decodes_to_none() {
        let json = r#"{
            "id": "ba4e9f0e-8a3f-4a6e-9a63-4f6e2f1c7d20",
            "date": "2026-08-01T10:00:00Z",
            "pomodoros": 3,
            "durationMinutes": 75
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.tag, None);
        assert_eq!(session.pomodoros, 3);
    }

    #[test]
    fn tag_parses_from_str() {
        assert_eq!("reading".parse(), Ok(SessionTag::Reading));
        assert!("READING".parse::<SessionTag>().is_err());
    }
}
