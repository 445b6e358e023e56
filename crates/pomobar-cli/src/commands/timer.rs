use std::io::Write;
use std::thread;
use std::time::Duration;

use clap::Subcommand;
use pomobar_core::feedback::{Notifier, ToneCue, TonePlayer};
use pomobar_core::session::SessionTag;
use pomobar_core::storage::{Config, SessionStore};
use pomobar_core::timer::TimerEngine;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run one countdown to completion in the foreground
    Run {
        /// Countdown length in minutes (5-120); defaults to the configured value
        #[arg(long)]
        minutes: Option<u32>,
        /// Tag recorded with the session (reading, writing or coding)
        #[arg(long)]
        tag: Option<SessionTag>,
    },
    /// Print the initial timer snapshot as JSON without running
    Preview {
        /// Countdown length in minutes (5-120); defaults to the configured value
        #[arg(long)]
        minutes: Option<u32>,
    },
}

/// Rings the terminal bell on completion; real synthesis lives in the app.
struct TerminalTones;

impl TonePlayer for TerminalTones {
    fn play(&mut self, cue: ToneCue) {
        if cue == ToneCue::Complete {
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
    }
}

/// Prints the notification in place of a system notification center.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&mut self, title: &str, body: &str) {
        println!("\n{title} {body}");
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match action {
        TimerAction::Run { minutes, tag } => run_countdown(&config, minutes, tag),
        TimerAction::Preview { minutes } => preview(&config, minutes),
    }
}

fn build_engine(
    config: &Config,
    minutes: Option<u32>,
    tag: Option<SessionTag>,
) -> Result<TimerEngine, Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;
    let mut engine = TimerEngine::new(store);
    engine.set_duration(minutes.unwrap_or(config.duration_min));
    engine.set_tag(tag.unwrap_or(config.tag));
    Ok(engine)
}

fn run_countdown(
    config: &Config,
    minutes: Option<u32>,
    tag: Option<SessionTag>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = build_engine(config, minutes, tag)?;
    if config.sounds_enabled {
        engine.set_tone_player(Box::new(TerminalTones));
    }
    if config.notifications_enabled {
        engine.set_notifier(Box::new(TerminalNotifier));
    }
    engine.on_display(|text| {
        // Redraw in place, padding over the previous line.
        print!("\r{text}      ");
        let _ = std::io::stdout().flush();
    });

    engine.start();
    let completed = loop {
        thread::sleep(Duration::from_secs(1));
        if let Some(event) = engine.tick() {
            break event;
        }
    };
    // Keep ticking through the grace window so the status line reverts
    // to the idle glyph.
    for _ in 0..3 {
        thread::sleep(Duration::from_secs(1));
        engine.tick();
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&completed)?);
    Ok(())
}

fn preview(config: &Config, minutes: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(config, minutes, None)?;
    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}
