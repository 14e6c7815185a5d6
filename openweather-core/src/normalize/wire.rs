//! Provider JSON shapes, only the fields the normalizers read.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct OwCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwWeather {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwMain {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OwWind {
    #[serde(default)]
    pub speed: f64,
    // omitted by the provider in calm conditions
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct OwSys {
    #[serde(default)]
    pub country: String,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwCurrentResponse {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    pub coord: OwCoord,
    #[serde(default)]
    pub sys: OwSys,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwCity {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub coord: OwCoord,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwForecastEntry {
    pub dt: i64,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwForecastResponse {
    pub city: OwCity,
    #[serde(default)]
    pub list: Vec<OwForecastEntry>,
}

/// A `current` or `hourly` element of a one-call / timemachine response.
#[derive(Debug, Deserialize)]
pub(super) struct OcPoint {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub temp: f64,
    pub pressure: f64,
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    pub weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OcDailyTemp {
    pub day: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
pub(super) struct OcDaily {
    pub dt: i64,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
    pub temp: OcDailyTemp,
    pub pressure: f64,
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_deg: f64,
    pub weather: Vec<OwWeather>,
}

/// One-call and timemachine responses share this envelope; the timemachine
/// endpoint never sends `daily`.
#[derive(Debug, Deserialize)]
pub(super) struct OcResponse {
    pub lat: f64,
    pub lon: f64,
    pub timezone: Option<String>,
    pub timezone_offset: Option<i32>,
    pub current: Option<OcPoint>,
    #[serde(default)]
    pub hourly: Vec<OcPoint>,
    #[serde(default)]
    pub daily: Vec<OcDaily>,
}
