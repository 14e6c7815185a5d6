use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// Eight-point compass label for a wind bearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    /// Exclusive upper bound of each sector, clockwise from north.
    const SECTORS: [(f64, Direction); 8] = [
        (22.5, Direction::N),
        (67.5, Direction::NE),
        (112.5, Direction::E),
        (157.5, Direction::SE),
        (202.5, Direction::S),
        (247.5, Direction::SW),
        (292.5, Direction::W),
        (337.5, Direction::NW),
    ];

    /// Resolve a bearing in `[0, 360)` to its compass sector.
    ///
    /// Each sector is half-open and centred on its compass point, so
    /// `22.5` is already `NE` and `337.5` wraps back to `N`. Bearings outside
    /// the range are rejected instead of wrapped.
    pub fn from_degrees(degrees: f64) -> Result<Self, WeatherError> {
        if !(0.0..360.0).contains(&degrees) {
            return Err(WeatherError::Value(format!(
                "wind bearing {degrees} is outside [0, 360)"
            )));
        }

        let direction = Self::SECTORS
            .iter()
            .find(|(upper, _)| degrees < *upper)
            .map_or(Direction::N, |(_, direction)| *direction);
        Ok(direction)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::N => "N",
            Direction::NE => "NE",
            Direction::E => "E",
            Direction::SE => "SE",
            Direction::S => "S",
            Direction::SW => "SW",
            Direction::W => "W",
            Direction::NW => "NW",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
