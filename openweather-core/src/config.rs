use anyhow::{Context, Result, anyhow};
use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::WeatherError;

/// Base URLs of the four provider endpoint families.
///
/// Each URL ends with `?` so the encoded query string can be appended directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub current: String,
    pub forecast: String,
    pub one_call: String,
    pub historical: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            current: "https://api.openweathermap.org/data/2.5/weather?".to_string(),
            forecast: "https://api.openweathermap.org/data/2.5/forecast?".to_string(),
            one_call: "https://api.openweathermap.org/data/2.5/onecall?".to_string(),
            historical: "https://api.openweathermap.org/data/2.5/onecall/timemachine?".to_string(),
        }
    }
}

/// Fully-resolved client configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// language = "de"
/// date_format = "%d.%m.%Y"
///
/// [endpoints]
/// current = "https://api.openweathermap.org/data/2.5/weather?"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub endpoints: Endpoints,
    pub icon_base_url: String,
    pub icon_ext: String,
    pub language: String,
    /// strftime patterns, see `chrono::format::strftime`.
    pub date_format: String,
    pub time_format: String,
    pub day_format: String,
    /// Offset applied to every timestamp before formatting.
    pub utc_offset_seconds: i32,
    /// Request timeout used by the default HTTP transport.
    pub timeout_secs: u64,
    /// Units used by the CLI when none is given on the command line.
    pub default_units: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoints: Endpoints::default(),
            icon_base_url: "https://openweathermap.org/img/w/".to_string(),
            icon_ext: "png".to_string(),
            language: "en".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            time_format: "%I:%M %p".to_string(),
            day_format: "%A".to_string(),
            utc_offset_seconds: 0,
            timeout_secs: 30,
            default_units: None,
        }
    }
}

impl Config {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Check every field the client relies on.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::config(
                "API key is empty. Hint: run `openweather configure` or set OPENWEATHER_API_KEY.",
            ));
        }

        for (name, url) in [
            ("endpoints.current", &self.endpoints.current),
            ("endpoints.forecast", &self.endpoints.forecast),
            ("endpoints.one_call", &self.endpoints.one_call),
            ("endpoints.historical", &self.endpoints.historical),
            ("icon_base_url", &self.icon_base_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(WeatherError::config(format!("{name} is not an http(s) URL: '{url}'")));
            }
        }

        if self.icon_ext.is_empty() {
            return Err(WeatherError::config("icon_ext is empty"));
        }
        if self.language.is_empty() {
            return Err(WeatherError::config("language is empty"));
        }

        for (name, pattern) in [
            ("date_format", &self.date_format),
            ("time_format", &self.time_format),
            ("day_format", &self.day_format),
        ] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(WeatherError::config(format!(
                    "{name} is not a valid strftime pattern: '{pattern}'"
                )));
            }
        }

        if chrono::FixedOffset::east_opt(self.utc_offset_seconds).is_none() {
            return Err(WeatherError::config(format!(
                "utc_offset_seconds out of range: {}",
                self.utc_offset_seconds
            )));
        }

        Ok(())
    }

    /// Load config from disk (or defaults if the file doesn't exist yet),
    /// then apply `OPENWEATHER_*` environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        cfg.apply_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from a key lookup, `std::env::var` in production.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            ("OPENWEATHER_API_KEY", &mut self.api_key),
            ("OPENWEATHER_API_LANG", &mut self.language),
            ("OPENWEATHER_API_DATE_FORMAT", &mut self.date_format),
            ("OPENWEATHER_API_TIME_FORMAT", &mut self.time_format),
            ("OPENWEATHER_API_DAY_FORMAT", &mut self.day_format),
        ];

        for (key, field) in fields {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                *field = value;
            }
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("org", "openweather", "openweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
