// Loaded on startup and saved on quit, so the chain comes back the way the
// user left it.
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::chain::ChainSettings;

const APP_DIR: &str = "fluentty";
const SETTINGS_FILE: &str = "settings.json";

// <config dir>/fluentty, or the working directory if the platform has none
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

fn settings_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SETTINGS_FILE)
}

/// Missing file means first run; a file we can't parse is logged and ignored.
pub fn load_settings(config_dir: &Path) -> ChainSettings {
    let path = settings_file_path(config_dir);
    let data = match std::fs::read_to_string(&path) {
        Ok(data) => data,
        Err(_) => return ChainSettings::default(),
    };
    match serde_json::from_str::<ChainSettings>(&data) {
        Ok(settings) => {
            log::info!(target: "settings", "loaded {}", path.display());
            settings.saturated()
        }
        Err(e) => {
            log::warn!(target: "settings", "ignoring malformed {}: {e}", path.display());
            ChainSettings::default()
        }
    }
}

// Save the settings, making the config dir if it doesn't exist already
pub fn save_settings(config_dir: &Path, settings: &ChainSettings) -> anyhow::Result<()> {
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;
    let path = settings_file_path(config_dir);
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    log::info!(target: "settings", "saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MicPreset;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_settings(dir.path()), ChainSettings::default());
    }

    #[test]
    fn save_then_load_into_fresh_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("fluentty");
        let settings = ChainSettings {
            requested_delay_ms: 150.0,
            feedback_enabled: true,
            mic_preset: MicPreset::Smooth,
            preferred_input_device_id: 2,
            ..ChainSettings::default()
        };
        save_settings(&nested, &settings).unwrap();
        assert_eq!(load_settings(&nested), settings);
    }

    #[test]
    fn malformed_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        assert_eq!(load_settings(dir.path()), ChainSettings::default());
    }

    #[test]
    fn hand_edited_values_are_saturated() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "global_gain": 40.0, "pitch_ratio": 0.1 }"#,
        )
        .unwrap();
        let s = load_settings(dir.path());
        assert_eq!(s.global_gain, 2.0);
        assert_eq!(s.pitch_ratio, 0.8);
        assert_eq!(s.mic_gain, 1.0);
    }
}
