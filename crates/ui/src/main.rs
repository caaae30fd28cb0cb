mod app;
mod bridge;
mod widgets;

use std::{fs, io};

use app::AppState;
use engine::StudioConfig;
use tracing::{info, warn};

const CONFIG_PATH: &str = "studio.toml";

fn main() -> iced::Result {
    init_tracing();
    let config = load_config();

    iced::application("Shorts Studio", AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .run_with(move || AppState::boot(config))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

/// Reads `studio.toml` from the working directory, falling back to defaults.
fn load_config() -> StudioConfig {
    let source = match fs::read_to_string(CONFIG_PATH) {
        Ok(source) => source,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return StudioConfig::default(),
        Err(err) => {
            warn!(%err, path = CONFIG_PATH, "config unreadable, using defaults");
            return StudioConfig::default();
        }
    };

    match StudioConfig::from_toml_str(&source) {
        Ok(config) => {
            info!(path = CONFIG_PATH, "config loaded");
            config
        }
        Err(err) => {
            warn!(%err, path = CONFIG_PATH, "invalid config, using defaults");
            StudioConfig::default()
        }
    }
}
