//! Plain-text rendering of normalized records.

use openweather_core::{
    CurrentWeather, ForecastResponse, Formats, HistoricalResponse, OneCallResponse, Units,
    WeatherSnapshot,
};
use std::fmt::Write;

fn temp_unit(units: &Units) -> &'static str {
    match units {
        Units::Imperial => "°F",
        Units::Metric => "°C",
        Units::Standard => "K",
        Units::Other(_) => "",
    }
}

fn speed_unit(units: &Units) -> &'static str {
    match units {
        Units::Imperial => "mph",
        Units::Metric | Units::Standard => "m/s",
        Units::Other(_) => "",
    }
}

/// One-line summary used for list entries.
fn summary_line(w: &WeatherSnapshot, formats: &Formats) -> String {
    let t = temp_unit(&formats.units);
    let mut line = format!(
        "{} {} {}  {}{t}",
        w.datetime.formatted_day,
        w.datetime.formatted_date,
        w.datetime.formatted_time,
        w.metrics.temp,
    );
    if let (Some(min), Some(max)) = (w.metrics.temp_min, w.metrics.temp_max) {
        let _ = write!(line, " ({min}..{max}{t})");
    }
    let _ = write!(
        line,
        "  {}  wind {} {} {}",
        w.condition.description,
        w.wind.speed,
        speed_unit(&formats.units),
        w.wind.direction
    );
    line
}

fn details(out: &mut String, w: &WeatherSnapshot, formats: &Formats) {
    let t = temp_unit(&formats.units);
    let dt = &w.datetime;

    let _ = writeln!(out, "{} {} {}", dt.formatted_day, dt.formatted_date, dt.formatted_time);
    let _ = writeln!(out, "{}: {}", w.condition.name, w.condition.description);
    match (w.metrics.temp_min, w.metrics.temp_max) {
        (Some(min), Some(max)) => {
            let _ = writeln!(
                out,
                "Temperature: {}{t} (min {min}{t}, max {max}{t})",
                w.metrics.temp
            );
        }
        _ => {
            let _ = writeln!(out, "Temperature: {}{t}", w.metrics.temp);
        }
    }
    let _ = writeln!(
        out,
        "Humidity: {}%  Pressure: {} hPa",
        w.metrics.humidity, w.metrics.pressure
    );
    let _ = writeln!(
        out,
        "Wind: {} {} {} ({}°)",
        w.wind.speed,
        speed_unit(&formats.units),
        w.wind.direction,
        w.wind.degrees
    );
    if let (Some(rise), Some(set)) = (&dt.formatted_sunrise, &dt.formatted_sunset) {
        let _ = writeln!(out, "Sunrise {rise}  Sunset {set}");
    }
}

pub fn current(cw: &CurrentWeather) -> String {
    let mut out = String::new();
    let loc = &cw.location;
    let _ = writeln!(out, "{}, {} ({}, {})", loc.name, loc.country, loc.latitude, loc.longitude);
    details(&mut out, &cw.weather, &cw.formats);
    out
}

pub fn forecast(fc: &ForecastResponse) -> String {
    let mut out = String::new();
    let loc = &fc.location;
    let _ = writeln!(
        out,
        "Forecast for {}, {} ({}, {})",
        loc.name, loc.country, loc.latitude, loc.longitude
    );
    for entry in &fc.forecast {
        let _ = writeln!(out, "  {}", summary_line(entry, &fc.formats));
    }
    out
}

fn current_and_hourly(
    out: &mut String,
    current: Option<&WeatherSnapshot>,
    hourly: &[WeatherSnapshot],
    formats: &Formats,
) {
    if let Some(current) = current {
        let _ = writeln!(out, "\nCurrent");
        details(out, current, formats);
    }
    if !hourly.is_empty() {
        let _ = writeln!(out, "\nHourly");
        for hour in hourly {
            let _ = writeln!(out, "  {}", summary_line(hour, formats));
        }
    }
}

pub fn onecall(oc: &OneCallResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Weather at ({}, {})", oc.location.latitude, oc.location.longitude);
    current_and_hourly(&mut out, oc.current.as_ref(), &oc.hourly, &oc.formats);
    if !oc.daily.is_empty() {
        let _ = writeln!(out, "\nDaily");
        for day in &oc.daily {
            let _ = writeln!(out, "  {}", summary_line(day, &oc.formats));
        }
    }
    out
}

pub fn historical(hist: &HistoricalResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Historical weather at ({}, {})",
        hist.location.latitude, hist.location.longitude
    );
    current_and_hourly(&mut out, hist.current.as_ref(), &hist.hourly, &hist.formats);
    out
}
