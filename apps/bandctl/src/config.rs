use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use shared::protocol::DEFAULT_API_URL;
use tracing::warn;

pub const SETTINGS_FILE: &str = "bandctl.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_url: String,
    pub fallback_api_url: Option<String>,
    pub navigation_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            fallback_api_url: None,
            navigation_delay_ms: 2000,
        }
    }
}

impl Settings {
    pub fn navigation_delay(&self) -> Duration {
        Duration::from_millis(self.navigation_delay_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    fallback_api_url: Option<String>,
    navigation_delay_ms: Option<u64>,
}

pub fn load_settings() -> Settings {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_settings_from(Path::new(SETTINGS_FILE), &env)
}

/// Defaults, then the settings file, then environment variables; later
/// sources win.
pub fn load_settings_from(path: &Path, env: &HashMap<String, String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.api_url {
                    settings.api_url = v;
                }
                if let Some(v) = file_cfg.fallback_api_url {
                    settings.fallback_api_url = Some(v);
                }
                if let Some(v) = file_cfg.navigation_delay_ms {
                    settings.navigation_delay_ms = v;
                }
            }
            Err(error) => {
                warn!(path = %path.display(), %error, "ignoring malformed settings file");
            }
        }
    }

    if let Some(v) = env.get("BAND_API_URL") {
        settings.api_url = v.clone();
    }
    if let Some(v) = env.get("APP__API_URL") {
        settings.api_url = v.clone();
    }

    if let Some(v) = env.get("APP__FALLBACK_API_URL") {
        let v = v.trim();
        settings.fallback_api_url = (!v.is_empty()).then(|| v.to_string());
    }

    if let Some(v) = env.get("APP__NAVIGATION_DELAY_MS") {
        match v.parse::<u64>() {
            Ok(parsed) => settings.navigation_delay_ms = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__NAVIGATION_DELAY_MS"),
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
