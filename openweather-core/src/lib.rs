//! Core library for the `openweather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A pluggable HTTP transport
//! - Normalization of the provider's current, forecast, one-call and
//!   historical responses into one schema
//! - [`WeatherClient`], which ties the pieces together
//!
//! It is used by `openweather-cli`, but can also be reused by other binaries or services.

pub mod client;
pub mod config;
pub mod direction;
pub mod error;
mod format;
pub mod model;
pub mod normalize;
pub mod transport;

pub use client::{Exclude, FailureReporter, Lookup, WeatherClient};
pub use config::{Config, Endpoints};
pub use direction::Direction;
pub use error::{FailureKind, TransportError, WeatherError};
pub use model::{
    Condition, Coordinates, CurrentWeather, DateTimeInfo, ForecastResponse, Formats,
    HistoricalResponse, Location, Metrics, OneCallResponse, Units, WeatherSnapshot, Wind,
};
pub use transport::{HttpTransport, Transport};
