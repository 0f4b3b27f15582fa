use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::FetchError,
    model::{Query, WeatherReading},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions for `query`. Exactly one upstream request per call.
    async fn current(&self, query: &Query) -> Result<WeatherReading, FetchError>;
}

/// Construct the provider from config, validating the API key first.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    Ok(Box::new(OpenWeatherProvider::from_config(config)?))
}
