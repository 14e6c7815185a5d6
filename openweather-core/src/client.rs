use chrono::{DateTime, Utc};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, instrument, warn};

use crate::{
    config::Config,
    error::{TransportError, WeatherError},
    model::{CurrentWeather, ForecastResponse, HistoricalResponse, OneCallResponse, Units},
    normalize::{normalize_current, normalize_forecast, normalize_historical, normalize_onecall},
    transport::{HttpTransport, Transport},
};

/// Callback invoked with a human-readable message whenever a request fails.
pub type FailureReporter = Arc<dyn Fn(&str) + Send + Sync>;

type Params = Vec<(&'static str, String)>;

/// How a location is identified in current/forecast requests.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// City name, optionally with a country code (`Boston,US`).
    CityName(String),
    /// Provider city id.
    CityId(u64),
    Coords { lat: f64, lon: f64 },
    /// Postal code, optionally with a country code (`02108,US`).
    Postal(String),
}

impl Lookup {
    fn params(&self) -> Params {
        match self {
            Lookup::CityName(city) => vec![("q", city.clone())],
            Lookup::CityId(id) => vec![("id", id.to_string())],
            Lookup::Coords { lat, lon } => coords(*lat, *lon),
            Lookup::Postal(postal) => vec![("zip", postal.clone())],
        }
    }
}

/// Blocks a one-call response can leave out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclude {
    Current,
    Minutely,
    Hourly,
    Daily,
    Alerts,
}

impl Exclude {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exclude::Current => "current",
            Exclude::Minutely => "minutely",
            Exclude::Hourly => "hourly",
            Exclude::Daily => "daily",
            Exclude::Alerts => "alerts",
        }
    }
}

impl FromStr for Exclude {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "current" => Ok(Exclude::Current),
            "minutely" => Ok(Exclude::Minutely),
            "hourly" => Ok(Exclude::Hourly),
            "daily" => Ok(Exclude::Daily),
            "alerts" => Ok(Exclude::Alerts),
            _ => Err(WeatherError::Value(format!(
                "unknown one-call block '{s}'. \
                 Expected one of: current, minutely, hourly, daily, alerts."
            ))),
        }
    }
}

/// Client for the OpenWeather current, forecast, one-call and timemachine APIs.
///
/// The client only holds immutable state, so it can be cloned and shared
/// across tasks freely. Units are chosen per call.
#[derive(Clone)]
pub struct WeatherClient {
    config: Arc<Config>,
    transport: Arc<dyn Transport>,
    reporter: Option<FailureReporter>,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("language", &self.config.language)
            .field("transport", &self.transport)
            .field("reporter", &self.reporter.is_some())
            .finish()
    }
}

impl WeatherClient {
    /// Build a client using the default HTTP transport.
    ///
    /// Fails with [`WeatherError::Config`] if the config is incomplete.
    pub fn new(config: Config) -> Result<Self, WeatherError> {
        config.validate()?;
        let transport = HttpTransport::new(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
            reporter: None,
        })
    }

    pub fn with_transport(
        config: Config,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, WeatherError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            transport,
            reporter: None,
        })
    }

    pub fn with_failure_reporter(
        mut self,
        reporter: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.reporter = Some(Arc::new(reporter));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn current(
        &self,
        lookup: &Lookup,
        units: Option<Units>,
    ) -> Result<CurrentWeather, WeatherError> {
        let units = units.unwrap_or_default();
        self.request(
            "current",
            &self.config.endpoints.current,
            lookup.params(),
            &units,
            normalize_current,
        )
        .await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn forecast(
        &self,
        lookup: &Lookup,
        units: Option<Units>,
    ) -> Result<ForecastResponse, WeatherError> {
        let units = units.unwrap_or_default();
        self.request(
            "forecast",
            &self.config.endpoints.forecast,
            lookup.params(),
            &units,
            normalize_forecast,
        )
        .await
    }

    pub async fn current_by_city_name(
        &self,
        city: &str,
        units: Option<Units>,
    ) -> Result<CurrentWeather, WeatherError> {
        self.current(&Lookup::CityName(city.to_string()), units).await
    }

    pub async fn current_by_city_id(
        &self,
        id: u64,
        units: Option<Units>,
    ) -> Result<CurrentWeather, WeatherError> {
        self.current(&Lookup::CityId(id), units).await
    }

    pub async fn current_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Option<Units>,
    ) -> Result<CurrentWeather, WeatherError> {
        self.current(&Lookup::Coords { lat, lon }, units).await
    }

    pub async fn current_by_postal(
        &self,
        postal: &str,
        units: Option<Units>,
    ) -> Result<CurrentWeather, WeatherError> {
        self.current(&Lookup::Postal(postal.to_string()), units).await
    }

    pub async fn forecast_by_city_name(
        &self,
        city: &str,
        units: Option<Units>,
    ) -> Result<ForecastResponse, WeatherError> {
        self.forecast(&Lookup::CityName(city.to_string()), units).await
    }

    pub async fn forecast_by_city_id(
        &self,
        id: u64,
        units: Option<Units>,
    ) -> Result<ForecastResponse, WeatherError> {
        self.forecast(&Lookup::CityId(id), units).await
    }

    pub async fn forecast_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Option<Units>,
    ) -> Result<ForecastResponse, WeatherError> {
        self.forecast(&Lookup::Coords { lat, lon }, units).await
    }

    pub async fn forecast_by_postal(
        &self,
        postal: &str,
        units: Option<Units>,
    ) -> Result<ForecastResponse, WeatherError> {
        self.forecast(&Lookup::Postal(postal.to_string()), units).await
    }

    /// Current, hourly and daily weather in one request.
    ///
    /// `exclude` is sent as a comma-separated list and left out when empty.
    #[instrument(level = "debug", skip(self))]
    pub async fn onecall_by_coords(
        &self,
        lat: f64,
        lon: f64,
        units: Option<Units>,
        exclude: &[Exclude],
    ) -> Result<OneCallResponse, WeatherError> {
        let units = units.unwrap_or_default();
        let mut params = coords(lat, lon);
        if !exclude.is_empty() {
            let blocks: Vec<&str> = exclude.iter().map(Exclude::as_str).collect();
            params.push(("exclude", blocks.join(",")));
        }

        self.request("one-call", &self.config.endpoints.one_call, params, &units, normalize_onecall)
            .await
    }

    /// Historical weather for the day containing `date`.
    #[instrument(level = "debug", skip(self))]
    pub async fn historical_by_coords(
        &self,
        lat: f64,
        lon: f64,
        date: DateTime<Utc>,
        units: Option<Units>,
    ) -> Result<HistoricalResponse, WeatherError> {
        let units = units.unwrap_or_default();
        let mut params = coords(lat, lon);
        params.push(("dt", date.timestamp().to_string()));

        self.request(
            "historical",
            &self.config.endpoints.historical,
            params,
            &units,
            normalize_historical,
        )
        .await
    }

    async fn request<T>(
        &self,
        family: &'static str,
        endpoint: &str,
        mut params: Params,
        units: &Units,
        normalize: fn(&str, &Config, &Units) -> Result<T, WeatherError>,
    ) -> Result<T, WeatherError> {
        params.push(("units", units.as_str().to_string()));
        params.push(("lang", self.config.language.clone()));
        params.push(("appid", self.config.api_key.clone()));

        let url = format!("{endpoint}{}", encode_query(&params));
        debug!(family, endpoint, "sending OpenWeather request");

        let result = match self.transport.fetch(&url).await {
            Ok(body) => normalize(&body, &self.config, units),
            Err(err) => Err(classify(err)),
        };

        if let Err(err) = &result {
            warn!(family, kind = ?err.kind(), error = %err, "OpenWeather request failed");
            if let Some(report) = &self.reporter {
                report(&format!("OpenWeather {family} request failed: {err}"));
            }
        }

        result
    }
}

fn coords(lat: f64, lon: f64) -> Params {
    vec![("lat", lat.to_string()), ("lon", lon.to_string())]
}

fn encode_query(params: &[(&'static str, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// A 4xx means the provider looked at the request and refused it.
fn classify(err: TransportError) -> WeatherError {
    match err {
        TransportError::Status { status, body } if (400..500).contains(&status) => {
            WeatherError::Api {
                code: i64::from(status),
                body,
            }
        }
        other => WeatherError::Transport(other),
    }
}
