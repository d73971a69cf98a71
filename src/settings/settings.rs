// Settings management and persistence
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Playback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub volume: f32, // 0.0-1.0
    pub asset: String, // File name under the bundled assets directory
    pub buffer_ms: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            asset: "alert.wav".to_string(),
            buffer_ms: 250,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String, // "error", "warn", "info", "debug" or "trace"
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Parsed level, falling back to INFO for anything unrecognised
    pub fn max_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Main application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub version: i32, // Settings schema version for future migrations
    pub playback: PlaybackSettings,
    pub logging: LoggingSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: 1,
            playback: PlaybackSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn get_settings_path(app_dir: &Path) -> PathBuf {
        app_dir.join("settings.json")
    }

    /// Load settings from file, writing defaults out if there is none yet
    pub fn load_or_init(app_dir: &Path) -> Result<Self> {
        let path = Self::get_settings_path(app_dir);

        if !path.exists() {
            let settings = Self::default();
            settings.save(app_dir)?;
            return Ok(settings);
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;

        let settings: AppSettings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))?;

        Ok(settings)
    }

    pub fn save(&self, app_dir: &Path) -> Result<()> {
        fs::create_dir_all(app_dir).context("Failed to create settings directory")?;

        let path = Self::get_settings_path(app_dir);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write settings file {:?}", path))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();

        let settings = AppSettings::load_or_init(dir.path()).unwrap();
        assert_eq!(settings, AppSettings::default());
        assert!(AppSettings::get_settings_path(dir.path()).exists());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = AppSettings::default();
        settings.playback.volume = 0.4;
        settings.playback.asset = "chime.m4a".to_string();
        settings.logging.level = "debug".to_string();

        settings.save(dir.path()).unwrap();
        assert_eq!(AppSettings::load_or_init(dir.path()).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            AppSettings::get_settings_path(dir.path()),
            r#"{ "playback": { "volume": 0.5 } }"#,
        )
        .unwrap();

        let settings = AppSettings::load_or_init(dir.path()).unwrap();
        assert_eq!(settings.playback.volume, 0.5);
        assert_eq!(settings.playback.asset, "alert.wav");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(AppSettings::get_settings_path(dir.path()), "{ not json").unwrap();
        assert!(AppSettings::load_or_init(dir.path()).is_err());
    }

    #[test]
    fn test_log_level_parsing() {
        let logging = LoggingSettings {
            level: "debug".to_string(),
        };
        assert_eq!(logging.max_level(), tracing::Level::DEBUG);

        let logging = LoggingSettings {
            level: "loud".to_string(),
        };
        assert_eq!(logging.max_level(), tracing::Level::INFO);
    }
}
