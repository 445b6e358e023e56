//! Countdown timer engine.
//!
//! The engine is a caller-driven state machine: it owns no thread and no
//! timer source. The presentation layer calls `tick()` once per second while
//! a countdown is live, and keeps calling it through the short grace window
//! after a completion so the status display can revert to idle.
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!   ^       |
//!   +-------+  (completion or reset)
//! ```
//!
//! Invalid transitions are silent no-ops rather than errors. A menu-bar
//! front end mashes buttons; it should never have to handle a transition
//! failure.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::feedback::{Notifier, Silent, ToneCue, TonePlayer};
use crate::session::SessionTag;
use crate::storage::SessionStore;

/// Seconds in one full pomodoro block.
const POMODORO_SECS: u32 = 25 * 60;
/// Duration clamp bounds, in minutes.
const MIN_MINUTES: u32 = 5;
const MAX_MINUTES: u32 = 120;
/// Ticks the done glyph stays up before the display reverts to idle.
const GRACE_TICKS: u8 = 3;

const IDLE_GLYPH: &str = "\u{1F345}";
const DONE_GLYPH: &str = "\u{1F345} Done!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Pending revert of the status display after a completion.
///
/// Stamped with the generation current at completion time. `start()` bumps
/// the engine generation, so a revert that outlived its completion is
/// dropped instead of clobbering the display of the next countdown.
#[derive(Debug, Clone, Copy)]
struct GraceRevert {
    ticks_left: u8,
    generation: u64,
}

/// Core countdown engine.
///
/// Owns the session store so completed sessions land in the log without the
/// presentation layer in the loop; the read side is reachable via `store()`.
pub struct TimerEngine {
    state: TimerState,
    total_secs: u32,
    remaining_secs: u32,
    selected_tag: SessionTag,
    store: SessionStore,
    generation: u64,
    grace: Option<GraceRevert>,
    display: Option<Box<dyn FnMut(&str)>>,
    tones: Box<dyn TonePlayer>,
    notifier: Box<dyn Notifier>,
}

impl TimerEngine {
    /// Create an idle engine with the default 25-minute countdown.
    pub fn new(store: SessionStore) -> Self {
        Self {
            state: TimerState::Idle,
            total_secs: POMODORO_SECS,
            remaining_secs: POMODORO_SECS,
            selected_tag: SessionTag::default(),
            store,
            generation: 0,
            grace: None,
            display: None,
            tones: Box::new(Silent),
            notifier: Box::new(Silent),
        }
    }

    /// Register the single status-display subscriber.
    pub fn on_display(&mut self, callback: impl FnMut(&str) + 'static) {
        self.display = Some(Box::new(callback));
    }

    pub fn set_tone_player(&mut self, tones: Box<dyn TonePlayer>) {
        self.tones = tones;
    }

    pub fn set_notifier(&mut self, notifier: Box<dyn Notifier>) {
        self.notifier = notifier;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn duration_minutes(&self) -> u32 {
        self.total_secs / 60
    }

    pub fn selected_tag(&self) -> SessionTag {
        self.selected_tag
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// `MM:SS` for the remaining time.
    pub fn display_time(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    /// Fraction of the countdown already elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 0.0;
        }
        f64::from(self.total_secs - self.remaining_secs) / f64::from(self.total_secs)
    }

    /// Pomodoros one completion of the current duration earns: one per full
    /// 25-minute block, at least one.
    pub fn pomodoros_in_session(&self) -> u32 {
        (self.total_secs / POMODORO_SECS).max(1)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            progress: self.progress(),
            tag: self.selected_tag,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change the countdown length, clamped to 5..=120 minutes.
    ///
    /// Only honored while Idle; a live or paused countdown keeps its
    /// progress accounting intact.
    pub fn set_duration(&mut self, minutes: u32) {
        if self.state != TimerState::Idle {
            return;
        }
        let clamped = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
        self.total_secs = clamped * 60;
        self.remaining_secs = self.total_secs;
    }

    pub fn increment_duration(&mut self) {
        self.set_duration(self.duration_minutes() + 5);
    }

    pub fn decrement_duration(&mut self) {
        self.set_duration(self.duration_minutes().saturating_sub(5));
    }

    /// Idle -> Running or Paused -> Running. Already Running is a no-op.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                // A new countdown supersedes any pending display revert.
                self.generation = self.generation.wrapping_add(1);
                self.tones.play(ToneCue::Start);
                Some(Event::TimerStarted {
                    duration_secs: self.total_secs,
                    tag: self.selected_tag,
                    at: Utc::now(),
                })
            }
            TimerState::Running => None,
        }
    }

    /// Running -> Paused. Anything else is a no-op.
    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.state = TimerState::Paused;
        self.tones.play(ToneCue::Pause);
        let line = format!("\u{23F8} {}", self.display_time());
        self.push_display(&line);
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// The start/pause button: pause when Running, start otherwise.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.state == TimerState::Running {
            self.pause()
        } else {
            self.start()
        }
    }

    /// Any state -> Idle with a full countdown ready.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs;
        self.tones.play(ToneCue::Reset);
        self.push_display(IDLE_GLYPH);
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Select the tag recorded at the next completion. Allowed in any
    /// state; never retroactive.
    pub fn set_tag(&mut self, tag: SessionTag) {
        self.selected_tag = tag;
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `Some(Event::TimerCompleted)` on the tick that finishes the
    /// countdown. Idle ticks service the post-completion grace window.
    pub fn tick(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                if self.remaining_secs == 0 {
                    return None;
                }
                self.remaining_secs -= 1;
                let line = self.display_time();
                self.push_display(&line);
                if self.remaining_secs == 0 {
                    return Some(self.complete());
                }
                None
            }
            TimerState::Idle => {
                self.service_grace();
                None
            }
            TimerState::Paused => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Completion sequence: record the session, fire the cues, show the
    /// done glyph, and arm the revert back to the idle glyph.
    fn complete(&mut self) -> Event {
        self.state = TimerState::Idle;

        let pomodoros = self.pomodoros_in_session();
        let duration_minutes = self.duration_minutes();
        let tag = self.selected_tag;
        self.store.record(pomodoros, duration_minutes, tag);

        self.tones.play(ToneCue::Complete);
        let plural = if pomodoros == 1 { "" } else { "s" };
        let body = format!("Great focus! You earned {pomodoros} pomo{plural}.");
        self.notifier.notify("Pomo Complete! \u{1F345}", &body);

        // Ready for an immediate restart, even inside the grace window.
        self.remaining_secs = self.total_secs;
        self.push_display(DONE_GLYPH);
        self.grace = Some(GraceRevert {
            ticks_left: GRACE_TICKS,
            generation: self.generation,
        });

        Event::TimerCompleted {
            pomodoros,
            duration_minutes,
            tag,
            at: Utc::now(),
        }
    }

    fn service_grace(&mut self) {
        let Some(mut grace) = self.grace else {
            return;
        };
        grace.ticks_left -= 1;
        if grace.ticks_left > 0 {
            self.grace = Some(grace);
            return;
        }
        self.grace = None;
        // Only revert if no countdown started since the completion.
        if grace.generation == self.generation {
            self.push_display(IDLE_GLYPH);
        }
    }

    fn push_display(&mut self, text: &str) {
        if let Some(callback) = self.display.as_mut() {
            callback(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use proptest::prelude::*;

    use super::*;

    fn engine() -> (TimerEngine, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::open_at(dir.path().join("sessions.json"));
        (TimerEngine::new(store), dir)
    }

    fn displays(engine: &mut TimerEngine) -> Rc<RefCell<Vec<String>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        engine.on_display(move |text| sink.borrow_mut().push(text.to_string()));
        seen
    }

    #[derive(Clone, Default)]
    struct CueLog(Rc<RefCell<Vec<ToneCue>>>);

    impl TonePlayer for CueLog {
        fn play(&mut self, cue: ToneCue) {
            self.0.borrow_mut().push(cue);
        }
    }

    #[test]
    fn set_duration_applies_while_idle() {
        let (mut engine, _dir) = engine();
        for minutes in [5, 30, 120] {
            engine.set_duration(minutes);
            assert_eq!(engine.total_secs(), minutes * 60);
            assert_eq!(engine.remaining_secs(), minutes * 60);
        }
    }

    #[test]
    fn set_duration_clamps_out_of_range() {
        let (mut engine, _dir) = engine();
        engine.set_duration(1);
        assert_eq!(engine.total_secs(), 5 * 60);
        engine.set_duration(500);
        assert_eq!(engine.total_secs(), 120 * 60);
    }

    #[test]
    fn set_duration_is_ignored_unless_idle() {
        let (mut engine, _dir) = engine();
        engine.start();
        engine.tick();
        engine.set_duration(50);
        assert_eq!(engine.total_secs(), 25 * 60);
        assert_eq!(engine.remaining_secs(), 25 * 60 - 1);

        engine.pause();
        engine.set_duration(50);
        assert_eq!(engine.total_secs(), 25 * 60);

        engine.reset();
        engine.set_duration(50);
        assert_eq!(engine.total_secs(), 50 * 60);
    }

    #[test]
    fn duration_steps_move_in_five_minute_increments() {
        let (mut engine, _dir) = engine();
        engine.increment_duration();
        assert_eq!(engine.duration_minutes(), 30);
        engine.set_duration(5);
        engine.decrement_duration();
        assert_eq!(engine.duration_minutes(), 5);
    }

    #[test]
    fn start_is_idempotent_while_running() {
        let (mut engine, _dir) = engine();
        let cues = CueLog::default();
        engine.set_tone_player(Box::new(cues.clone()));

        assert!(engine.start().is_some());
        assert!(engine.start().is_none());
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(cues.0.borrow().as_slice(), &[ToneCue::Start]);
    }

    #[test]
    fn pause_only_from_running() {
        let (mut engine, _dir) = engine();
        assert!(engine.pause().is_none());
        engine.start();
        assert!(engine.pause().is_some());
        assert_eq!(engine.state(), TimerState::Paused);
        assert!(engine.pause().is_none());
        assert!(engine.start().is_some());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn paused_ticks_do_not_advance() {
        let (mut engine, _dir) = engine();
        engine.start();
        engine.tick();
        engine.pause();
        let remaining = engine.remaining_secs();
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.remaining_secs(), remaining);
    }

    #[test]
    fn full_countdown_completes_with_one_pomodoro() {
        let (mut engine, _dir) = engine();
        engine.start();

        let mut completions = Vec::new();
        for _ in 0..1500 {
            if let Some(event) = engine.tick() {
                completions.push(event);
            }
        }

        assert_eq!(completions.len(), 1);
        match &completions[0] {
            Event::TimerCompleted {
                pomodoros,
                duration_minutes,
                ..
            } => {
                assert_eq!(*pomodoros, 1);
                assert_eq!(*duration_minutes, 25);
            }
            other => panic!("expected TimerCompleted, got {other:?}"),
        }
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), engine.total_secs());
        assert_eq!(engine.store().sessions().len(), 1);
    }

    #[test]
    fn fifty_minutes_earns_two_pomodoros() {
        let (mut engine, _dir) = engine();
        engine.set_duration(50);
        engine.start();

        let mut completed = None;
        for _ in 0..3000 {
            if let Some(event) = engine.tick() {
                completed = Some(event);
            }
        }

        match completed {
            Some(Event::TimerCompleted { pomodoros, .. }) => assert_eq!(pomodoros, 2),
            other => panic!("expected TimerCompleted, got {other:?}"),
        }
    }

    #[test]
    fn five_minutes_still_earns_one_pomodoro() {
        let (mut engine, _dir) = engine();
        engine.set_duration(5);
        assert_eq!(engine.pomodoros_in_session(), 1);
    }

    #[test]
    fn reset_returns_to_idle_from_any_state() {
        let (mut engine, _dir) = engine();
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), engine.total_secs());

        engine.start();
        engine.tick();
        engine.pause();
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), engine.total_secs());
    }

    #[test]
    fn tag_selection_applies_to_next_completion() {
        let (mut engine, _dir) = engine();
        engine.set_duration(5);
        engine.start();
        for _ in 0..100 {
            engine.tick();
        }
        // Mid-countdown change is picked up by this completion.
        engine.set_tag(SessionTag::Reading);
        for _ in 0..200 {
            engine.tick();
        }
        let sessions = engine.store().sessions();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].tag, Some(SessionTag::Reading));
    }

    #[test]
    fn display_time_formats_mm_ss() {
        let (mut engine, _dir) = engine();
        assert_eq!(engine.display_time(), "25:00");
        engine.start();
        engine.tick();
        assert_eq!(engine.display_time(), "24:59");
    }

    #[test]
    fn progress_runs_from_zero_to_reset() {
        let (mut engine, _dir) = engine();
        engine.set_duration(5);
        assert_eq!(engine.progress(), 0.0);
        engine.start();
        for _ in 0..75 {
            engine.tick();
        }
        assert!((engine.progress() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn display_sequence_through_completion_and_grace() {
        let (mut engine, _dir) = engine();
        let seen = displays(&mut engine);
        engine.set_duration(5);
        engine.start();
        for _ in 0..300 {
            engine.tick();
        }
        // Grace window: three idle ticks, then the idle glyph.
        for _ in 0..3 {
            engine.tick();
        }
        let seen = seen.borrow();
        let tail: Vec<&str> = seen.iter().rev().take(3).rev().map(String::as_str).collect();
        assert_eq!(tail, ["00:00", "\u{1F345} Done!", "\u{1F345}"]);
    }

    #[test]
    fn pause_prefixes_the_display() {
        let (mut engine, _dir) = engine();
        let seen = displays(&mut engine);
        engine.start();
        engine.tick();
        engine.pause();
        assert_eq!(seen.borrow().last().map(String::as_str), Some("\u{23F8} 24:59"));
    }

    #[test]
    fn stale_grace_revert_is_superseded_by_start() {
        let (mut engine, _dir) = engine();
        engine.set_duration(5);
        engine.start();
        for _ in 0..300 {
            engine.tick();
        }
        // New countdown begins inside the grace window, then is reset.
        engine.start();
        engine.reset();

        let seen = displays(&mut engine);
        for _ in 0..5 {
            engine.tick();
        }
        // The stale revert must not fire; nothing new on the display.
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn grace_revert_fires_when_nothing_intervenes() {
        let (mut engine, _dir) = engine();
        engine.set_duration(5);
        engine.start();
        for _ in 0..300 {
            engine.tick();
        }
        let seen = displays(&mut engine);
        engine.tick();
        engine.tick();
        assert!(seen.borrow().is_empty());
        engine.tick();
        assert_eq!(seen.borrow().as_slice(), ["\u{1F345}"]);
    }

    #[test]
    fn toggle_flips_between_running_and_paused() {
        let (mut engine, _dir) = engine();
        engine.toggle();
        assert_eq!(engine.state(), TimerState::Running);
        engine.toggle();
        assert_eq!(engine.state(), TimerState::Paused);
        engine.toggle();
        assert_eq!(engine.state(), TimerState::Running);
    }

    proptest! {
        #[test]
        fn set_duration_always_lands_in_bounds(minutes in 0u32..=10_000) {
            let (mut engine, _dir) = engine();
            engine.set_duration(minutes);
            prop_assert!(engine.total_secs() >= MIN_MINUTES * 60);
            prop_assert!(engine.total_secs() <= MAX_MINUTES * 60);
            prop_assert_eq!(engine.remaining_secs(), engine.total_secs());
            if (MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
                prop_assert_eq!(engine.total_secs(), minutes * 60);
            }
        }
    }
}
