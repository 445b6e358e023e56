use clap::Subcommand;
use pomobar_core::storage::SessionStore;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Pomodoros completed today
    Today,
    /// Pomodoros in the rolling last 7 days
    Week,
    /// All-time pomodoro total
    All,
    /// Current day streak
    Streak,
    /// Per-day summaries for the last 7 active days, as JSON
    Recent,
    /// Day-by-day pomodoro counts over the last 6 months, as JSON
    Heatmap,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = SessionStore::open()?;

    match action {
        StatsAction::Today => println!("{}", store.today_pomos()),
        StatsAction::Week => println!("{}", store.week_pomos()),
        StatsAction::All => println!("{}", store.all_time_pomos()),
        StatsAction::Streak => println!("{}", store.day_streak()),
        StatsAction::Recent => {
            println!("{}", serde_json::to_string_pretty(&store.recent_days())?)
        }
        StatsAction::Heatmap => {
            println!("{}", serde_json::to_string_pretty(&store.heatmap())?)
        }
    }
    Ok(())
}
