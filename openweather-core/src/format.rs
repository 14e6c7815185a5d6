use chrono::{DateTime, FixedOffset};
use std::fmt::Write;

use crate::{config::Config, error::WeatherError, model::DateTimeInfo};

/// Formats epoch seconds with the patterns of a [`Config`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct TimestampFormatter<'a> {
    config: &'a Config,
    offset: FixedOffset,
}

impl<'a> TimestampFormatter<'a> {
    pub(crate) fn new(config: &'a Config) -> Result<Self, WeatherError> {
        let offset = FixedOffset::east_opt(config.utc_offset_seconds).ok_or_else(|| {
            WeatherError::config(format!(
                "utc_offset_seconds out of range: {}",
                config.utc_offset_seconds
            ))
        })?;
        Ok(Self { config, offset })
    }

    fn format(&self, timestamp: i64, pattern: &str) -> Result<String, WeatherError> {
        let dt = DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| WeatherError::schema(format!("timestamp {timestamp} out of range")))?
            .with_timezone(&self.offset);

        let mut out = String::new();
        write!(out, "{}", dt.format(pattern)).map_err(|_| {
            WeatherError::config(format!("cannot format with pattern '{pattern}'"))
        })?;
        Ok(out)
    }

    /// Build the full date/time block for an observation time and optional
    /// sunrise/sunset.
    pub(crate) fn datetime(
        &self,
        timestamp: i64,
        sunrise: Option<i64>,
        sunset: Option<i64>,
    ) -> Result<DateTimeInfo, WeatherError> {
        let time_of = |ts: Option<i64>| {
            ts.map(|ts| self.format(ts, &self.config.time_format)).transpose()
        };

        Ok(DateTimeInfo {
            timestamp,
            sunrise,
            sunset,
            formatted_date: self.format(timestamp, &self.config.date_format)?,
            formatted_day: self.format(timestamp, &self.config.day_format)?,
            formatted_time: self.format(timestamp, &self.config.time_format)?,
            formatted_sunrise: time_of(sunrise)?,
            formatted_sunset: time_of(sunset)?,
        })
    }
}
