//! Reshape the four OpenWeather response families into the models of
//! [`crate::model`].
//!
//! Every function here is pure: the same body, config and units always give
//! the same record. Metrics are rounded half away from zero but never
//! converted; they stay in the units the request asked for.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::Config,
    direction::Direction,
    error::WeatherError,
    format::TimestampFormatter,
    model::{
        Condition, Coordinates, CurrentWeather, ForecastResponse, Formats, HistoricalResponse,
        Location, Metrics, OneCallResponse, Units, WeatherSnapshot, Wind,
    },
};

mod wire;

use wire::{OcDaily, OcPoint, OcResponse, OwCurrentResponse, OwForecastResponse, OwWeather};

pub fn normalize_current(
    body: &str,
    config: &Config,
    units: &Units,
) -> Result<CurrentWeather, WeatherError> {
    let value = parse(body)?;
    check_status(&value, body)?;
    let raw: OwCurrentResponse = decode(value)?;
    let ctx = Normalizer::new(config, units)?;

    let weather = WeatherSnapshot {
        datetime: ctx.formatter.datetime(raw.dt, raw.sys.sunrise, raw.sys.sunset)?,
        condition: ctx.condition(&raw.weather)?,
        wind: wind(raw.wind.speed, raw.wind.deg)?,
        metrics: Metrics {
            temp: round(raw.main.temp),
            temp_min: Some(round(raw.main.temp_min)),
            temp_max: Some(round(raw.main.temp_max)),
            pressure: round(raw.main.pressure),
            humidity: round(raw.main.humidity),
        },
    };

    Ok(CurrentWeather {
        formats: ctx.formats(),
        location: Location {
            id: raw.id,
            name: raw.name,
            country: raw.sys.country,
            latitude: raw.coord.lat,
            longitude: raw.coord.lon,
        },
        weather,
    })
}

pub fn normalize_forecast(
    body: &str,
    config: &Config,
    units: &Units,
) -> Result<ForecastResponse, WeatherError> {
    let value = parse(body)?;
    check_status(&value, body)?;
    let raw: OwForecastResponse = decode(value)?;
    let ctx = Normalizer::new(config, units)?;

    // The 3-hour forecast only reports sunrise/sunset once, on the city.
    let (sunrise, sunset) = (raw.city.sunrise, raw.city.sunset);

    let forecast = raw
        .list
        .iter()
        .map(|entry| {
            Ok(WeatherSnapshot {
                datetime: ctx.formatter.datetime(entry.dt, sunrise, sunset)?,
                condition: ctx.condition(&entry.weather)?,
                wind: wind(entry.wind.speed, entry.wind.deg)?,
                metrics: Metrics {
                    temp: round(entry.main.temp),
                    temp_min: Some(round(entry.main.temp_min)),
                    temp_max: Some(round(entry.main.temp_max)),
                    pressure: round(entry.main.pressure),
                    humidity: round(entry.main.humidity),
                },
            })
        })
        .collect::<Result<Vec<_>, WeatherError>>()?;

    Ok(ForecastResponse {
        formats: ctx.formats(),
        location: Location {
            id: raw.city.id,
            name: raw.city.name,
            country: raw.city.country,
            latitude: raw.city.coord.lat,
            longitude: raw.city.coord.lon,
        },
        forecast,
    })
}

pub fn normalize_onecall(
    body: &str,
    config: &Config,
    units: &Units,
) -> Result<OneCallResponse, WeatherError> {
    let raw = decode_onecall(body)?;
    let ctx = Normalizer::new(config, units)?;
    let (current, hourly) = ctx.current_and_hourly(&raw)?;

    let daily = raw.daily.iter().map(|day| ctx.daily(day)).collect::<Result<Vec<_>, _>>()?;

    Ok(OneCallResponse {
        formats: ctx.formats(),
        location: Coordinates {
            latitude: raw.lat,
            longitude: raw.lon,
        },
        timezone: raw.timezone,
        timezone_offset: raw.timezone_offset,
        current,
        hourly,
        daily,
    })
}

pub fn normalize_historical(
    body: &str,
    config: &Config,
    units: &Units,
) -> Result<HistoricalResponse, WeatherError> {
    let raw = decode_onecall(body)?;
    let ctx = Normalizer::new(config, units)?;
    let (current, hourly) = ctx.current_and_hourly(&raw)?;

    Ok(HistoricalResponse {
        formats: ctx.formats(),
        location: Coordinates {
            latitude: raw.lat,
            longitude: raw.lon,
        },
        timezone: raw.timezone,
        timezone_offset: raw.timezone_offset,
        current,
        hourly,
    })
}

/// Per-call state shared by the entry helpers.
struct Normalizer<'a> {
    config: &'a Config,
    units: &'a Units,
    formatter: TimestampFormatter<'a>,
}

impl<'a> Normalizer<'a> {
    fn new(config: &'a Config, units: &'a Units) -> Result<Self, WeatherError> {
        Ok(Self {
            config,
            units,
            formatter: TimestampFormatter::new(config)?,
        })
    }

    fn formats(&self) -> Formats {
        Formats {
            language: self.config.language.clone(),
            date: self.config.date_format.clone(),
            time: self.config.time_format.clone(),
            day: self.config.day_format.clone(),
            units: self.units.clone(),
        }
    }

    fn condition(&self, weather: &[OwWeather]) -> Result<Condition, WeatherError> {
        let first = weather
            .first()
            .ok_or_else(|| WeatherError::schema("response has an empty `weather` list"))?;

        Ok(Condition {
            id: first.id,
            name: first.main.clone(),
            description: first.description.clone(),
            icon_url: format!(
                "{}{}.{}",
                self.config.icon_base_url, first.icon, self.config.icon_ext
            ),
        })
    }

    /// Point entries carry no min/max; the sunrise/sunset pair is supplied by
    /// the caller so hourly entries can borrow the current block's values.
    fn point(
        &self,
        point: &OcPoint,
        sunrise: Option<i64>,
        sunset: Option<i64>,
    ) -> Result<WeatherSnapshot, WeatherError> {
        Ok(WeatherSnapshot {
            datetime: self.formatter.datetime(point.dt, sunrise, sunset)?,
            condition: self.condition(&point.weather)?,
            wind: wind(point.wind_speed, point.wind_deg)?,
            metrics: Metrics {
                temp: round(point.temp),
                temp_min: None,
                temp_max: None,
                pressure: round(point.pressure),
                humidity: round(point.humidity),
            },
        })
    }

    fn daily(&self, day: &OcDaily) -> Result<WeatherSnapshot, WeatherError> {
        Ok(WeatherSnapshot {
            datetime: self.formatter.datetime(day.dt, day.sunrise, day.sunset)?,
            condition: self.condition(&day.weather)?,
            wind: wind(day.wind_speed, day.wind_deg)?,
            metrics: Metrics {
                temp: round(day.temp.day),
                temp_min: Some(round(day.temp.min)),
                temp_max: Some(round(day.temp.max)),
                pressure: round(day.pressure),
                humidity: round(day.humidity),
            },
        })
    }

    /// Hourly entries reuse the current block's sunrise/sunset, even for
    /// hours on another calendar day. The endpoint gives nothing better.
    fn current_and_hourly(
        &self,
        raw: &OcResponse,
    ) -> Result<(Option<WeatherSnapshot>, Vec<WeatherSnapshot>), WeatherError> {
        let (sunrise, sunset) =
            raw.current.as_ref().map_or((None, None), |c| (c.sunrise, c.sunset));

        let current = raw.current.as_ref().map(|c| self.point(c, sunrise, sunset)).transpose()?;
        let hourly = raw
            .hourly
            .iter()
            .map(|hour| self.point(hour, sunrise, sunset))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((current, hourly))
    }
}

fn parse(body: &str) -> Result<Value, WeatherError> {
    Ok(serde_json::from_str(body)?)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, WeatherError> {
    serde_json::from_value(value).map_err(|e| WeatherError::schema(e.to_string()))
}

/// Reject current/forecast payloads whose `cod` marker is not 200.
///
/// The provider sends `cod` as a number on `/weather` and as a string on
/// `/forecast`, so both are accepted.
fn check_status(value: &Value, body: &str) -> Result<(), WeatherError> {
    let Some(cod) = value.get("cod") else {
        return Ok(());
    };

    let code = match cod {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| WeatherError::schema(format!("unrecognized status marker `cod`: {cod}")))?;

    if code != 200 {
        return Err(WeatherError::Api {
            code,
            body: body.to_string(),
        });
    }
    Ok(())
}

fn decode_onecall(body: &str) -> Result<OcResponse, WeatherError> {
    let value = parse(body)?;

    let missing: Vec<&str> = ["lat", "lon"]
        .into_iter()
        .filter(|key| value.get(key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(WeatherError::schema(format!(
            "response is missing top-level field(s): {}",
            missing.join(", ")
        )));
    }

    decode(value)
}

fn wind(speed: f64, degrees: f64) -> Result<Wind, WeatherError> {
    Ok(Wind {
        speed,
        degrees,
        direction: Direction::from_degrees(degrees)?,
    })
}

fn round(value: f64) -> i64 {
    value.round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    const CURRENT: &str = include_str!("../tests/fixtures/current.json");
    const FORECAST: &str = include_str!("../tests/fixtures/forecast.json");
    const ONECALL: &str = include_str!("../tests/fixtures/onecall.json");
    const HISTORICAL: &str = include_str!("../tests/fixtures/historical.json");
    const NOT_FOUND: &str = include_str!("../tests/fixtures/not_found.json");

    fn config() -> Config {
        Config::with_api_key("KEY")
    }

    #[test]
    fn current_rounds_metrics() {
        let cw = normalize_current(CURRENT, &config(), &Units::Metric).unwrap();

        assert_eq!(
            cw.weather.metrics,
            Metrics {
                temp: 13,
                temp_min: Some(-4),
                temp_max: Some(14),
                pressure: 1014,
                humidity: 81,
            }
        );
    }

    #[test]
    fn current_builds_icon_url_and_condition() {
        let cw = normalize_current(CURRENT, &config(), &Units::Metric).unwrap();

        assert_eq!(cw.weather.condition.icon_url, "https://openweathermap.org/img/w/10d.png");
        assert_eq!(cw.weather.condition.id, 501);
        assert_eq!(cw.weather.condition.name, "Rain");
        assert_eq!(cw.weather.condition.description, "moderate rain");
    }

    #[test]
    fn current_maps_location_wind_and_times() {
        let cw = normalize_current(CURRENT, &config(), &Units::Metric).unwrap();

        assert_eq!(cw.location.id, 2643743);
        assert_eq!(cw.location.name, "London");
        assert_eq!(cw.location.country, "GB");
        assert_eq!(cw.location.latitude, 51.5085);
        assert_eq!(cw.location.longitude, -0.1257);

        assert_eq!(cw.weather.wind.speed, 4.1);
        assert_eq!(cw.weather.wind.direction, Direction::W);

        let dt = &cw.weather.datetime;
        assert_eq!(dt.timestamp, 1_546_356_600);
        assert_eq!(dt.formatted_date, "01/01/2019");
        assert_eq!(dt.formatted_day, "Tuesday");
        assert_eq!(dt.formatted_time, "03:30 PM");
        assert_eq!(dt.sunrise, Some(1_546_329_600));
        assert_eq!(dt.formatted_sunrise.as_deref(), Some("08:00 AM"));
        assert_eq!(dt.formatted_sunset.as_deref(), Some("04:00 PM"));
    }

    #[test]
    fn current_echoes_formats() {
        let cw = normalize_current(CURRENT, &config(), &Units::Other("kelvin".into())).unwrap();

        assert_eq!(cw.formats.language, "en");
        assert_eq!(cw.formats.date, "%m/%d/%Y");
        assert_eq!(cw.formats.units, Units::Other("kelvin".into()));
    }

    #[test]
    fn current_custom_icon_settings() {
        let cfg = Config {
            icon_base_url: "https://cdn.example.com/icons/".into(),
            icon_ext: "svg".into(),
            ..config()
        };
        let cw = normalize_current(CURRENT, &cfg, &Units::Metric).unwrap();
        assert_eq!(cw.weather.condition.icon_url, "https://cdn.example.com/icons/10d.svg");
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let cfg = config();
        let first = normalize_current(CURRENT, &cfg, &Units::Metric).unwrap();
        let second = normalize_current(CURRENT, &cfg, &Units::Metric).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first, second);

        let first = normalize_onecall(ONECALL, &cfg, &Units::Imperial).unwrap();
        let second = normalize_onecall(ONECALL, &cfg, &Units::Imperial).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn current_with_error_code_is_api_failure() {
        let body = r#"{"cod":404,"message":"city not found"}"#;
        let err = normalize_current(body, &config(), &Units::Imperial).unwrap_err();

        match err {
            WeatherError::Api { code, body } => {
                assert_eq!(code, 404);
                assert!(body.contains("city not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn current_without_status_code_is_accepted() {
        let body = CURRENT.replace(",\n  \"cod\": 200", "");
        assert_ne!(body, CURRENT);
        assert!(!body.contains("cod"));

        let cw = normalize_current(&body, &config(), &Units::Metric).unwrap();
        assert_eq!(cw.location.name, "London");
        assert_eq!(cw.weather.metrics.temp, 13);
    }

    #[test]
    fn string_status_code_is_recognized() {
        let err = normalize_forecast(NOT_FOUND, &config(), &Units::Imperial).unwrap_err();
        assert!(matches!(err, WeatherError::Api { code: 404, .. }));
    }

    #[test]
    fn malformed_json_is_parse_failure_for_every_family() {
        let cfg = config();
        let body = "{not json";
        let units = Units::Imperial;

        let errors = [
            normalize_current(body, &cfg, &units).unwrap_err(),
            normalize_forecast(body, &cfg, &units).unwrap_err(),
            normalize_onecall(body, &cfg, &units).unwrap_err(),
            normalize_historical(body, &cfg, &units).unwrap_err(),
        ];

        for err in errors {
            assert!(matches!(err, WeatherError::Parse(_)), "{err:?}");
            assert_eq!(err.kind(), FailureKind::Parse);
        }
    }

    #[test]
    fn current_with_empty_weather_list_is_schema_error() {
        let body = CURRENT.replace(
            r#"[{"id":501,"main":"Rain","description":"moderate rain","icon":"10d"}]"#,
            "[]",
        );
        assert_ne!(body, CURRENT);

        let err = normalize_current(&body, &config(), &Units::Metric).unwrap_err();
        assert!(matches!(err, WeatherError::Schema(_)));
    }

    #[test]
    fn forecast_hoists_city_sunrise_and_sunset() {
        let fc = normalize_forecast(FORECAST, &config(), &Units::Imperial).unwrap();

        assert_eq!(fc.forecast.len(), 2);
        for entry in &fc.forecast {
            assert_eq!(entry.datetime.sunrise, Some(1000));
            assert_eq!(entry.datetime.sunset, Some(2000));
            assert_eq!(entry.datetime.formatted_sunrise.as_deref(), Some("12:16 AM"));
        }
    }

    #[test]
    fn forecast_keeps_provider_order_and_location() {
        let fc = normalize_forecast(FORECAST, &config(), &Units::Imperial).unwrap();

        let stamps: Vec<i64> = fc.forecast.iter().map(|e| e.datetime.timestamp).collect();
        assert_eq!(stamps, vec![1_546_365_600, 1_546_376_400]);

        assert_eq!(fc.location.id, 4930956);
        assert_eq!(fc.location.name, "Boston");
        assert_eq!(fc.location.country, "US");

        let first = &fc.forecast[0];
        assert_eq!(first.metrics.temp, 35);
        assert_eq!(first.metrics.temp_min, Some(34));
        assert_eq!(first.metrics.temp_max, Some(36));
        assert_eq!(first.wind.direction, Direction::NE);
        assert_eq!(fc.forecast[1].wind.direction, Direction::N);
    }

    #[test]
    fn forecast_out_of_time_order_is_not_resorted() {
        let body = r#"{
            "cod": "200",
            "list": [
                {
                    "dt": 1546376400,
                    "main": {"temp": 31.2, "temp_min": 31.2, "temp_max": 31.2,
                             "pressure": 1022, "humidity": 70},
                    "weather": [{"id": 600, "main": "Snow",
                                 "description": "light snow", "icon": "13n"}]
                },
                {
                    "dt": 1546365600,
                    "main": {"temp": 34.6, "temp_min": 33.5, "temp_max": 36.4,
                             "pressure": 1021, "humidity": 64},
                    "weather": [{"id": 803, "main": "Clouds",
                                 "description": "broken clouds", "icon": "04n"}]
                }
            ],
            "city": {"id": 4930956, "name": "Boston", "coord": {"lat": 42.36, "lon": -71.06}}
        }"#;
        let fc = normalize_forecast(body, &config(), &Units::Imperial).unwrap();

        let stamps: Vec<i64> = fc.forecast.iter().map(|e| e.datetime.timestamp).collect();
        assert_eq!(stamps, vec![1_546_376_400, 1_546_365_600]);
        assert_eq!(fc.forecast[0].condition.name, "Snow");
        assert_eq!(fc.forecast[1].condition.name, "Clouds");
    }

    #[test]
    fn onecall_sections() {
        let oc = normalize_onecall(ONECALL, &config(), &Units::Imperial).unwrap();

        assert_eq!(
            oc.location,
            Coordinates {
                latitude: 42.36,
                longitude: -71.06
            }
        );
        assert_eq!(oc.timezone.as_deref(), Some("America/New_York"));
        assert_eq!(oc.timezone_offset, Some(-18000));

        let current = oc.current.as_ref().expect("current block");
        assert_eq!(current.metrics.temp, 31);
        assert_eq!(current.metrics.temp_min, None);
        assert_eq!(current.metrics.temp_max, None);
        assert_eq!(current.wind.direction, Direction::SE);

        assert_eq!(oc.hourly.len(), 2);
        assert_eq!(oc.daily.len(), 2);
    }

    #[test]
    fn onecall_hourly_reuses_current_sunrise_and_sunset() {
        let oc = normalize_onecall(ONECALL, &config(), &Units::Imperial).unwrap();
        let current = oc.current.as_ref().unwrap();

        for hour in &oc.hourly {
            assert_eq!(hour.datetime.sunrise, current.datetime.sunrise);
            assert_eq!(hour.datetime.sunset, current.datetime.sunset);
            assert_eq!(hour.metrics.temp_min, None);
        }
    }

    #[test]
    fn onecall_daily_uses_own_times_and_min_max() {
        let oc = normalize_onecall(ONECALL, &config(), &Units::Imperial).unwrap();
        let day = &oc.daily[1];

        assert_eq!(day.datetime.sunrise, Some(1_546_430_400));
        assert_eq!(day.datetime.sunset, Some(1_546_464_600));
        assert_eq!(day.metrics.temp, 40);
        assert_eq!(day.metrics.temp_min, Some(28));
        assert_eq!(day.metrics.temp_max, Some(43));
        assert_eq!(day.datetime.formatted_day, "Wednesday");
    }

    #[test]
    fn onecall_without_lat_lon_is_schema_error() {
        let body = r#"{"timezone":"UTC","hourly":[]}"#;
        let err = normalize_onecall(body, &config(), &Units::Imperial).unwrap_err();

        match err {
            WeatherError::Schema(msg) => assert!(msg.contains("lat, lon")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn onecall_without_daily_has_empty_sequence() {
        let oc = normalize_onecall(r#"{"lat":1.5,"lon":2.5}"#, &config(), &Units::Metric).unwrap();

        assert!(oc.current.is_none());
        assert!(oc.hourly.is_empty());
        assert!(oc.daily.is_empty());

        let json = serde_json::to_value(&oc).unwrap();
        assert_eq!(json["daily"], serde_json::json!([]));
    }

    #[test]
    fn hourly_without_current_block_has_no_sun_times() {
        let body = r#"{
            "lat": 1.0, "lon": 2.0,
            "hourly": [{"dt": 1546300800, "temp": 10.2, "pressure": 1000, "humidity": 50,
                        "wind_speed": 1.0, "wind_deg": 90,
                        "weather": [{"id": 800, "main": "Clear",
                                     "description": "clear sky", "icon": "01n"}]}]
        }"#;
        let oc = normalize_onecall(body, &config(), &Units::Metric).unwrap();

        assert_eq!(oc.hourly[0].datetime.sunrise, None);
        assert_eq!(oc.hourly[0].datetime.formatted_sunset, None);
        assert_eq!(oc.hourly[0].wind.direction, Direction::E);
    }

    #[test]
    fn historical_has_current_and_hourly() {
        let hist = normalize_historical(HISTORICAL, &config(), &Units::Metric).unwrap();

        assert_eq!(
            hist.location,
            Coordinates {
                latitude: 60.99,
                longitude: 30.9
            }
        );
        let current = hist.current.as_ref().expect("current block");
        assert_eq!(current.metrics.temp, -2);
        assert_eq!(current.wind.direction, Direction::SW);

        assert_eq!(hist.hourly.len(), 2);
        for hour in &hist.hourly {
            assert_eq!(hour.datetime.sunrise, Some(1_586_413_800));
            assert_eq!(hour.datetime.sunset, Some(1_586_465_400));
        }
        assert_eq!(hist.hourly[1].metrics.temp, -3);
    }

    #[test]
    fn historical_without_lat_is_schema_error() {
        let err = normalize_historical(r#"{"lon":2.0}"#, &config(), &Units::Metric).unwrap_err();
        assert!(matches!(err, WeatherError::Schema(ref msg) if msg.contains("lat")));
    }

    #[test]
    fn out_of_range_wind_bearing_surfaces_value_error() {
        let body = CURRENT.replace(r#""deg":250"#, r#""deg":400"#);
        assert_ne!(body, CURRENT);

        let err = normalize_current(&body, &config(), &Units::Metric).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Value);
    }
}
