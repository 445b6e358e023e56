use clap::Subcommand;
use pomobar_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the active configuration as TOML
    Show,
    /// Set a configuration value
    Set {
        /// duration_min, tag, notifications_enabled, sounds_enabled or launch_at_login
        key: String,
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}
