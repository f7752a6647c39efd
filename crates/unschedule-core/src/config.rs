use crate::time::TimeFormat;
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_DIR_NAME: &str = "unschedule";
const CONFIG_FILE_NAME: &str = "config.toml";
const CURRENT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_START_HOUR: u32 = 3;
pub const DEFAULT_END_HOUR: u32 = 22;

/// Result returned by [`load_config`], capturing the source and any non-fatal issues.
#[derive(Debug, Clone)]
pub struct ConfigLoadResult {
    pub config: FileConfig,
    pub warnings: Vec<String>,
    pub source: ConfigSource,
}

/// Indicates where the configuration was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No persisted configuration was found or usable; defaults were synthesized.
    Default,
    /// Configuration was read from `config.toml`.
    File,
}

/// Errors that can occur when persisting configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Ser(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "IO error: {err}"),
            ConfigError::Ser(err) => write!(f, "TOML serialization error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(value: toml::ser::Error) -> Self {
        Self::Ser(value)
    }
}

/// Disk-backed configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default = "FileConfig::schema_version")]
    pub schema_version: u32,
    /// Absolute path of the most recently analyzed schedule.
    #[serde(default)]
    pub last_schedule_file: Option<String>,
    #[serde(default)]
    pub calendar: CalendarPreferences,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            last_schedule_file: None,
            calendar: CalendarPreferences::default(),
        }
    }
}

impl FileConfig {
    const fn schema_version() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

/// Visible window and label style for calendar views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarPreferences {
    #[serde(default = "CalendarPreferences::default_start_hour")]
    pub start_hour: u32,
    #[serde(default = "CalendarPreferences::default_end_hour")]
    pub end_hour: u32,
    #[serde(default)]
    pub time_format: TimeFormat,
}

impl Default for CalendarPreferences {
    fn default() -> Self {
        Self {
            start_hour: Self::default_start_hour(),
            end_hour: Self::default_end_hour(),
            time_format: TimeFormat::default(),
        }
    }
}

impl CalendarPreferences {
    const fn default_start_hour() -> u32 {
        DEFAULT_START_HOUR
    }

    const fn default_end_hour() -> u32 {
        DEFAULT_END_HOUR
    }

    /// Check an hour window: start in 0..=23, end in 1..=24, start before end.
    pub fn validate_window(start_hour: u32, end_hour: u32) -> Result<(), String> {
        if start_hour > 23 {
            return Err(format!("Start hour {start_hour} must be between 0 and 23."));
        }
        if !(1..=24).contains(&end_hour) {
            return Err(format!("End hour {end_hour} must be between 1 and 24."));
        }
        if start_hour >= end_hour {
            return Err(format!(
                "Start hour {start_hour} must be less than end hour {end_hour}."
            ));
        }
        Ok(())
    }

    /// Window bounds in minutes of the day.
    pub fn window_minutes(&self) -> (u16, u16) {
        let to_minutes = |hour: u32| (hour.min(24) * 60) as u16;
        (to_minutes(self.start_hour), to_minutes(self.end_hour))
    }
}

/// Path to the configuration directory.
pub fn config_directory() -> PathBuf {
    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path to `config.toml`.
pub fn config_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

/// Load the configuration from the default location, falling back to defaults.
pub fn load_config() -> ConfigLoadResult {
    load_config_from(&config_path())
}

/// Load the configuration from `path`. Never fails; problems become warnings.
pub fn load_config_from(path: &Path) -> ConfigLoadResult {
    let mut warnings = Vec::new();

    if path.exists() {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<FileConfig>(&raw) {
                Ok(cfg) => {
                    let (cfg, mut sanitize_warnings) = sanitize_config(cfg);
                    warnings.append(&mut sanitize_warnings);
                    return ConfigLoadResult {
                        config: cfg,
                        warnings,
                        source: ConfigSource::File,
                    };
                }
                Err(err) => {
                    warnings.push(format!(
                        "Failed to parse {} as TOML: {}. Falling back to defaults.",
                        CONFIG_FILE_NAME, err
                    ));
                }
            },
            Err(err) => {
                warnings.push(format!(
                    "Failed to read {}: {}. Falling back to defaults.",
                    CONFIG_FILE_NAME, err
                ));
            }
        }
    }

    // Default fallback
    ConfigLoadResult {
        config: FileConfig::default(),
        warnings,
        source: ConfigSource::Default,
    }
}

/// Persist the configuration to the default location.
pub fn save_config(config: &FileConfig) -> Result<(), ConfigError> {
    save_config_to(&config_path(), config)
}

/// Persist the configuration to `path`, creating parent directories.
pub fn save_config_to(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = toml::to_string_pretty(config)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn sanitize_config(mut config: FileConfig) -> (FileConfig, Vec<String>) {
    let mut warnings = Vec::new();

    if config.schema_version != CURRENT_SCHEMA_VERSION {
        warnings.push(format!(
            "Unknown config schema version {}. Resetting to {}.",
            config.schema_version, CURRENT_SCHEMA_VERSION
        ));
        return (FileConfig::default(), warnings);
    }

    let calendar = &mut config.calendar;
    if let Err(reason) =
        CalendarPreferences::validate_window(calendar.start_hour, calendar.end_hour)
    {
        warnings.push(format!(
            "{reason} Resetting calendar window to {DEFAULT_START_HOUR}-{DEFAULT_END_HOUR}."
        ));
        calendar.start_hour = DEFAULT_START_HOUR;
        calendar.end_hour = DEFAULT_END_HOUR;
    }

    if config
        .last_schedule_file
        .as_ref()
        .is_some_and(|path| path.trim().is_empty())
    {
        config.last_schedule_file = None;
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = tempdir().expect("tempdir");
        let result = load_config_from(&temp.path().join("config.toml"));
        assert_eq!(result.source, ConfigSource::Default);
        assert!(result.warnings.is_empty());
        assert_eq!(result.config, FileConfig::default());
        assert_eq!(result.config.calendar.start_hour, 3);
        assert_eq!(result.config.calendar.end_hour, 22);
    }

    #[test]
    fn test_round_trip_through_disk() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("config.toml");
        let mut config = FileConfig::default();
        config.last_schedule_file = Some("/home/me/week.txt".to_string());
        config.calendar.start_hour = 6;
        config.calendar.time_format = TimeFormat::TwelveHour;

        save_config_to(&path, &config).expect("save");
        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("time_format = \"12h\""), "{raw}");

        let loaded = load_config_from(&path);
        assert_eq!(loaded.source, ConfigSource::File);
        assert_eq!(loaded.config, config);
    }

    #[test]
    fn test_load_config_bad_toml() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "calendar = [not toml").expect("write");
        let result = load_config_from(&path);
        assert_eq!(result.source, ConfigSource::Default);
        assert!(result.warnings.iter().any(|w| w.contains("Failed to parse")));
    }

    #[test]
    fn test_sanitize_wrong_schema_version() {
        let mut config = FileConfig::default();
        config.schema_version = 99;
        config.calendar.start_hour = 8;
        let (sanitized, warnings) = sanitize_config(config);
        assert_eq!(sanitized, FileConfig::default());
        assert!(warnings.iter().any(|w| w.contains("schema version")));
    }

    #[test]
    fn test_sanitize_inverted_window() {
        let mut config = FileConfig::default();
        config.calendar.start_hour = 20;
        config.calendar.end_hour = 8;
        let (sanitized, warnings) = sanitize_config(config);
        assert_eq!(sanitized.calendar.start_hour, DEFAULT_START_HOUR);
        assert_eq!(sanitized.calendar.end_hour, DEFAULT_END_HOUR);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        fs::write(&path, "[calendar]\nend_hour = 24\n").expect("write");
        let result = load_config_from(&path);
        assert_eq!(result.source, ConfigSource::File);
        assert_eq!(result.config.calendar.start_hour, DEFAULT_START_HOUR);
        assert_eq!(result.config.calendar.end_hour, 24);
        assert_eq!(result.config.calendar.window_minutes(), (180, 1440));
    }

    #[test]
    fn test_validate_window() {
        assert!(CalendarPreferences::validate_window(0, 24).is_ok());
        assert!(CalendarPreferences::validate_window(24, 24).is_err());
        assert!(CalendarPreferences::validate_window(5, 0).is_err());
        assert!(CalendarPreferences::validate_window(9, 9).is_err());
    }
}
