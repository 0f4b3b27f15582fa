//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client and position lookup
//! - The lookup state machine and icon selection shared by any front end
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod lookup;
pub mod model;
pub mod provider;

pub use config::Config;
pub use error::{FetchError, LocateError, LookupError, Origin};
pub use icon::{WeatherIcon, weather_icon};
pub use location::{Locator, locator_from_config};
pub use lookup::{LookupState, PendingFetch, RequestToken, WeatherLookup};
pub use model::{Coordinates, Query, WeatherReading};
pub use provider::{WeatherProvider, provider_from_config};
