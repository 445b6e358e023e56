mod config;
mod store;

pub use config::Config;
pub use store::SessionStore;

use std::path::PathBuf;

/// Returns `~/.config/pomobar[-dev]/` based on POMOBAR_ENV.
///
/// Set POMOBAR_ENV=dev to keep development data away from the real log.
pub fn data_dir() -> crate::error::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POMOBAR_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pomobar-dev")
    } else {
        base_dir.join("pomobar")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
