use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    Config,
    error::FetchError,
    model::{Query, WeatherReading, meters_to_kilometers, round_temperature},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const CURRENT_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(
            api_key,
            DEFAULT_BASE_URL,
            Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_base_url(api_key: String, base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_owned();
        let base_url = config.provider.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        Self::with_base_url(api_key, base_url, config.timeout())
    }

    fn query_params(&self, query: &Query) -> Vec<(&'static str, String)> {
        let mut params = match query {
            Query::Text(place) => vec![("q", place.clone())],
            Query::Coordinates(pos) => vec![
                ("lat", pos.latitude.to_string()),
                ("lon", pos.longitude.to_string()),
            ],
        };
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: f64,
    #[serde(default)]
    dt: Option<i64>,
}

fn parse_current(body: &str) -> Result<WeatherReading, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    // The first weather entry is required, same as every other field.
    let condition_text = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or_else(|| {
            FetchError::Decode(serde::de::Error::custom("`weather` array is empty"))
        })?;

    Ok(WeatherReading {
        place_name: parsed.name,
        region: parsed.sys.country,
        temperature_celsius: round_temperature(parsed.main.temp),
        condition_text,
        humidity_percent: parsed.main.humidity.round().clamp(0.0, 100.0) as u8,
        pressure_millibar: parsed.main.pressure.round().max(0.0) as u32,
        wind_speed: parsed.wind.speed,
        visibility_kilometers: meters_to_kilometers(parsed.visibility),
        observed_at: parsed.dt.and_then(|ts| DateTime::from_timestamp(ts, 0)),
    })
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, query: &Query) -> Result<WeatherReading, FetchError> {
        let url = format!("{}{}", self.base_url, CURRENT_PATH);
        tracing::debug!(kind = query.kind(), "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(%status, kind = query.kind(), "OpenWeather request failed");
            return Err(FetchError::from_status(status));
        }

        let body = res.text().await?;
        parse_current(&body).inspect_err(|err| {
            tracing::warn!(error = %err, "OpenWeather response did not match the expected shape");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinates;

    const SAMPLE: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
        "main": {"temp": 14.62, "feels_like": 14.1, "pressure": 1012, "humidity": 76},
        "visibility": 10000,
        "wind": {"speed": 4.12, "deg": 250},
        "dt": 1700000000,
        "sys": {"country": "GB"},
        "name": "London"
    }"#;

    #[test]
    fn maps_every_field() {
        let reading = parse_current(SAMPLE).unwrap();

        assert_eq!(reading.place_name, "London");
        assert_eq!(reading.region, "GB");
        assert_eq!(reading.temperature_celsius, 15);
        assert_eq!(reading.condition_text, "broken clouds");
        assert_eq!(reading.humidity_percent, 76);
        assert_eq!(reading.pressure_millibar, 1012);
        assert_eq!(reading.wind_speed, 4.12);
        assert_eq!(reading.visibility_kilometers, 10.0);
        assert_eq!(reading.observed_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let body = SAMPLE.replace(r#""visibility": 10000,"#, "");
        assert!(matches!(parse_current(&body), Err(FetchError::Decode(_))));
    }

    #[test]
    fn empty_weather_array_is_a_decode_error() {
        let body = r#"{
            "weather": [],
            "main": {"temp": 1.0, "pressure": 1000, "humidity": 50},
            "visibility": 1000, "wind": {"speed": 1.0},
            "sys": {"country": "NO"}, "name": "Oslo"
        }"#;
        assert!(matches!(parse_current(body), Err(FetchError::Decode(_))));
    }

    #[test]
    fn missing_timestamp_is_fine() {
        let body = SAMPLE.replace(r#""dt": 1700000000,"#, "");
        let reading = parse_current(&body).unwrap();
        assert!(reading.observed_at.is_none());
    }

    #[test]
    fn query_params_for_each_query_kind() {
        let provider = OpenWeatherProvider::new("KEY".into()).unwrap();

        let text = provider.query_params(&Query::Text("New York".into()));
        assert_eq!(text[0], ("q", "New York".to_string()));
        assert!(text.contains(&("appid", "KEY".to_string())));
        assert!(text.contains(&("units", "metric".to_string())));

        let coords = provider.query_params(&Query::Coordinates(Coordinates::new(50.5, 30.25)));
        assert_eq!(coords[0], ("lat", "50.5".to_string()));
        assert_eq!(coords[1], ("lon", "30.25".to_string()));
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let provider =
            OpenWeatherProvider::with_base_url("KEY".into(), "http://x/", Duration::from_secs(1))
                .unwrap();
        assert_eq!(provider.base_url, "http://x");
    }
}
