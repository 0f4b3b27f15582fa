//! Current-position lookup.
//!
//! A terminal has no platform geolocation prompt, so the capability is modelled as a
//! [`Locator`]: an IP-based lookup, a fixed configured position, or nothing at all.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{Config, error::LocateError, model::Coordinates};

pub const DEFAULT_IP_LOCATOR_URL: &str = "https://ipinfo.io/json";

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Locates the machine by its public IP address (ipinfo-style `loc` field).
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLocation {
    /// "latitude,longitude"
    loc: String,
    #[serde(default)]
    city: Option<String>,
}

fn parse_loc(loc: &str) -> Option<Coordinates> {
    let (lat, lon) = loc.split_once(',')?;
    let latitude = lat.trim().parse().ok()?;
    let longitude = lon.trim().parse().ok()?;
    Some(Coordinates::new(latitude, longitude))
}

impl IpLocator {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LocateError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocateError::Denied(e.to_string()))?;
        Ok(Self { url: url.to_string(), http })
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocateError::Denied(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LocateError::Denied(format!("geolocation service returned {status}")));
        }

        let body: IpLocation = res.json().await.map_err(|e| LocateError::Denied(e.to_string()))?;
        let coords = parse_loc(&body.loc)
            .ok_or_else(|| LocateError::Denied(format!("unparseable position '{}'", body.loc)))?;

        tracing::info!(
            city = body.city.as_deref().unwrap_or("?"),
            %coords,
            "resolved position from IP address"
        );
        Ok(coords)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

/// Geolocation capability absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledLocator;

#[async_trait]
impl Locator for DisabledLocator {
    async fn locate(&self) -> Result<Coordinates, LocateError> {
        Err(LocateError::Unsupported)
    }
}

/// Fixed position wins, then IP lookup; disabled geolocation yields [`DisabledLocator`].
pub fn locator_from_config(config: &Config) -> Box<dyn Locator> {
    if !config.geolocation.enabled {
        return Box::new(DisabledLocator);
    }
    if let Some(coords) = config.fixed_position() {
        return Box::new(FixedLocator(coords));
    }

    let url = config.geolocation.url.as_deref().unwrap_or(DEFAULT_IP_LOCATOR_URL);
    match IpLocator::new(url, config.timeout()) {
        Ok(locator) => Box::new(locator),
        Err(err) => {
            tracing::warn!(error = %err, "IP geolocation unavailable");
            Box::new(DisabledLocator)
        }
    }
}
