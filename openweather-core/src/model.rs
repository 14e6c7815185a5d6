use serde::{Deserialize, Serialize};
use std::{convert::Infallible, str::FromStr};

use crate::direction::Direction;

/// Unit system forwarded to the provider in the `units` query parameter.
///
/// Unknown values are kept verbatim; the provider decides what is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Units {
    #[default]
    Imperial,
    Metric,
    Standard,
    Other(String),
}

impl Units {
    pub fn as_str(&self) -> &str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
            Units::Standard => "standard",
            Units::Other(s) => s,
        }
    }
}

impl FromStr for Units {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "imperial" => Units::Imperial,
            "metric" => Units::Metric,
            "standard" => Units::Standard,
            _ => Units::Other(s.to_string()),
        })
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Units {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Units {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

/// Echo of the settings a response was produced with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Formats {
    pub language: String,
    pub date: String,
    pub time: String,
    pub day: String,
    pub units: Units,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateTimeInfo {
    pub timestamp: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub formatted_date: String,
    pub formatted_day: String,
    pub formatted_time: String,
    pub formatted_sunrise: Option<String>,
    pub formatted_sunset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Provider city id, 0 when the response has none.
    pub id: u64,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub degrees: f64,
    pub direction: Direction,
}

/// Rounded weather metrics, in whatever units the request asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub temp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_max: Option<i64>,
    pub pressure: i64,
    pub humidity: i64,
}

/// One normalized observation or forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub datetime: DateTimeInfo,
    pub condition: Condition,
    pub wind: Wind,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub formats: Formats,
    pub location: Location,
    #[serde(flatten)]
    pub weather: WeatherSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub formats: Formats,
    pub location: Location,
    /// Provider order, chronological.
    pub forecast: Vec<WeatherSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneCallResponse {
    pub formats: Formats,
    pub location: Coordinates,
    pub timezone: Option<String>,
    pub timezone_offset: Option<i32>,
    pub current: Option<WeatherSnapshot>,
    pub hourly: Vec<WeatherSnapshot>,
    pub daily: Vec<WeatherSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalResponse {
    pub formats: Formats,
    pub location: Coordinates,
    pub timezone: Option<String>,
    pub timezone_offset: Option<i32>,
    pub current: Option<WeatherSnapshot>,
    pub hourly: Vec<WeatherSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_parse_known_and_passthrough() {
        assert_eq!("metric".parse::<Units>().unwrap(), Units::Metric);
        assert_eq!("IMPERIAL".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!("kelvin".parse::<Units>().unwrap(), Units::Other("kelvin".into()));
        assert_eq!(Units::Other("kelvin".into()).as_str(), "kelvin");
    }

    #[test]
    fn units_default_is_imperial() {
        assert_eq!(Units::default().as_str(), "imperial");
    }

    #[test]
    fn units_serialize_as_plain_string() {
        assert_eq!(serde_json::to_string(&Units::Standard).unwrap(), "\"standard\"");
        let parsed: Units = serde_json::from_str("\"metric\"").unwrap();
        assert_eq!(parsed, Units::Metric);
    }

    #[test]
    fn metrics_omit_missing_min_max() {
        let metrics = Metrics {
            temp: 12,
            temp_min: None,
            temp_max: None,
            pressure: 1013,
            humidity: 70,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("temp_min").is_none());
        assert_eq!(json["temp"], 12);
    }
}
