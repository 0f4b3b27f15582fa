use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// What gets sent to the provider: a free-text place name or a position.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Text(String),
    Coordinates(Coordinates),
}

impl Query {
    pub fn kind(&self) -> &'static str {
        match self {
            Query::Text(_) => "text",
            Query::Coordinates(_) => "coordinates",
        }
    }
}

/// Normalized current conditions, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub place_name: String,
    pub region: String,
    pub temperature_celsius: i32,
    pub condition_text: String,
    pub humidity_percent: u8,
    pub pressure_millibar: u32,
    /// Provider units (m/s with metric units), not converted.
    pub wind_speed: f64,
    pub visibility_kilometers: f64,
    pub observed_at: Option<DateTime<Utc>>,
}

/// Rounds half-up, so -2.5 reads as -2 rather than -3.
pub fn round_temperature(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

pub fn meters_to_kilometers(meters: f64) -> f64 {
    meters / 1000.0
}
