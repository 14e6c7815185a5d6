use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, Select, Text};
use openweather_core::{Config, Exclude, Lookup, Units, WeatherClient};
use serde::Serialize;
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "openweather", version, about = "OpenWeatherMap CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key, language and default units.
    Configure,

    /// Show current weather.
    Current {
        #[command(flatten)]
        lookup: LookupArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the 5 day / 3 hour forecast.
    Forecast {
        #[command(flatten)]
        lookup: LookupArgs,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show current, hourly and daily weather for coordinates.
    Onecall {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Blocks to leave out, e.g. `minutely,alerts`.
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<Exclude>,
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show historical weather for coordinates.
    History {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC).
        #[arg(long, value_parser = parse_date)]
        date: DateTime<Utc>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Exactly one way of identifying the location.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct LookupArgs {
    /// City name, optionally with country code (`Boston,US`).
    #[arg(long)]
    city: Option<String>,

    /// OpenWeather city id.
    #[arg(long)]
    id: Option<u64>,

    /// Coordinates as `LAT,LON`.
    #[arg(long, value_parser = parse_coords, allow_hyphen_values = true)]
    coords: Option<(f64, f64)>,

    /// Postal code, optionally with country code (`02108,US`).
    #[arg(long)]
    zip: Option<String>,
}

impl LookupArgs {
    fn to_lookup(&self) -> Result<Lookup> {
        if let Some(city) = &self.city {
            return Ok(Lookup::CityName(city.clone()));
        }
        if let Some(id) = self.id {
            return Ok(Lookup::CityId(id));
        }
        if let Some((lat, lon)) = self.coords {
            return Ok(Lookup::Coords { lat, lon });
        }
        if let Some(zip) = &self.zip {
            return Ok(Lookup::Postal(zip.clone()));
        }
        Err(anyhow!("one of --city, --id, --coords or --zip is required"))
    }
}

#[derive(Debug, Args)]
pub struct OutputArgs {
    /// imperial, metric or standard. Defaults to the configured units.
    #[arg(long)]
    units: Option<Units>,

    /// Print the normalized record as JSON.
    #[arg(long)]
    json: bool,
}

impl OutputArgs {
    fn units(&self, config: &Config) -> Option<Units> {
        self.units
            .clone()
            .or_else(|| config.default_units.as_deref().and_then(|u| u.parse().ok()))
    }

    fn print<T: Serialize>(&self, record: &T, human: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(record)?);
        } else {
            print!("{}", human(record));
        }
        Ok(())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { lookup, output } => {
                let client = client()?;
                let units = output.units(client.config());
                let weather = client.current(&lookup.to_lookup()?, units).await?;
                output.print(&weather, render::current)
            }
            Command::Forecast { lookup, output } => {
                let client = client()?;
                let units = output.units(client.config());
                let forecast = client.forecast(&lookup.to_lookup()?, units).await?;
                output.print(&forecast, render::forecast)
            }
            Command::Onecall { lat, lon, exclude, output } => {
                let client = client()?;
                let units = output.units(client.config());
                let onecall = client.onecall_by_coords(lat, lon, units, &exclude).await?;
                output.print(&onecall, render::onecall)
            }
            Command::History { lat, lon, date, output } => {
                let client = client()?;
                let units = output.units(client.config());
                let history = client.historical_by_coords(lat, lon, date, units).await?;
                output.print(&history, render::historical)
            }
        }
    }
}

fn client() -> Result<WeatherClient> {
    let config = Config::load()?;
    debug!(
        language = %config.language,
        default_units = ?config.default_units,
        "loaded configuration"
    );
    WeatherClient::new(config).context("Cannot create OpenWeather client")
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.api_key = api_key.trim().to_string();
    }

    let language = Text::new("Language code:")
        .with_default(&config.language)
        .prompt()
        .context("Failed to read language")?;
    config.language = language;

    let units = Select::new("Default units:", vec!["imperial", "metric", "standard"])
        .prompt()
        .context("Failed to read units")?;
    config.default_units = Some(units.to_string());

    config.validate()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

fn parse_coords(s: &str) -> Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got '{s}'"))?;

    let lat: f64 = lat.trim().parse().map_err(|_| format!("invalid latitude '{lat}'"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("invalid longitude '{lon}'"))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("coordinates out of range: {lat},{lon}"));
    }
    Ok((lat, lon))
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
        .ok_or_else(|| format!("expected RFC 3339 or YYYY-MM-DD, got '{s}'"))
}
