//! The lookup component: one state value, two fetch entry points, and a request
//! generation counter so that only the most recently issued request may update the state.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::{
    error::{FetchError, LookupError, Origin},
    location::Locator,
    model::{Coordinates, Query, WeatherReading},
    provider::WeatherProvider,
};

/// What the display shows. Exactly one variant is active at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Loaded(WeatherReading),
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LookupState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn reading(&self) -> Option<&WeatherReading> {
        match self {
            LookupState::Loaded(reading) => Some(reading),
            _ => None,
        }
    }
}

/// Identifies one issued request; only the latest token may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// A request that has been started (state is `Loading`) but not yet sent.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    token: RequestToken,
    query: Query,
    origin: Origin,
}

impl PendingFetch {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: LookupState,
    query_text: String,
    latest: u64,
    torn_down: bool,
}

impl Inner {
    fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    fn is_current(&self, token: RequestToken) -> bool {
        !self.torn_down && token.0 == self.latest
    }
}

/// Cloneable handle; clones share state, so a completion can land from any task.
#[derive(Debug, Clone)]
pub struct WeatherLookup {
    provider: Arc<dyn WeatherProvider>,
    inner: Arc<Mutex<Inner>>,
}

impl WeatherLookup {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider, inner: Arc::new(Mutex::new(Inner::default())) }
    }

    pub fn state(&self) -> LookupState {
        self.inner.lock().state.clone()
    }

    pub fn query_text(&self) -> String {
        self.inner.lock().query_text.clone()
    }

    /// The controlled input value; independent of the display state.
    pub fn set_query_text(&self, text: impl Into<String>) {
        self.inner.lock().query_text = text.into();
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.lock().torn_down
    }

    /// Starts a place-name lookup. A blank query issues no request and shows an error.
    ///
    /// A blank submit also supersedes any request still in flight.
    pub fn start_text(&self, text: &str) -> Result<PendingFetch, LookupError> {
        let place = text.trim();
        if place.is_empty() {
            let mut inner = self.inner.lock();
            inner.issue();
            inner.state = LookupState::Error(LookupError::EmptyQuery.user_message().to_string());
            return Err(LookupError::EmptyQuery);
        }
        Ok(self.begin(Query::Text(place.to_string()), Origin::Text))
    }

    pub fn start_coordinates(&self, latitude: f64, longitude: f64) -> PendingFetch {
        self.begin(
            Query::Coordinates(Coordinates::new(latitude, longitude)),
            Origin::Coordinates,
        )
    }

    fn begin(&self, query: Query, origin: Origin) -> PendingFetch {
        let mut inner = self.inner.lock();
        let token = inner.issue();
        inner.state = LookupState::Loading;
        tracing::debug!(token = token.0, kind = query.kind(), "lookup started");
        PendingFetch { token, query, origin }
    }

    /// Sends the request and applies the result if it is still the latest one.
    pub async fn run(&self, pending: PendingFetch) -> LookupState {
        let result = self.provider.current(&pending.query).await;
        self.complete(pending.token, pending.origin, result);
        self.state()
    }

    /// Applies a finished request. Returns `false` when the result was discarded because a
    /// newer request was issued or the lookup was torn down.
    pub fn complete(
        &self,
        token: RequestToken,
        origin: Origin,
        result: Result<WeatherReading, FetchError>,
    ) -> bool {
        let mut inner = self.inner.lock();
        if !inner.is_current(token) {
            tracing::debug!(token = token.0, latest = inner.latest, "discarding stale result");
            return false;
        }

        inner.state = match result {
            Ok(reading) => {
                tracing::info!(place = %reading.place_name, "weather loaded");
                LookupState::Loaded(reading)
            }
            Err(source) => {
                let err = LookupError::Fetch { origin, source };
                tracing::warn!(error = %err, "weather lookup failed");
                LookupState::Error(err.user_message().to_string())
            }
        };
        true
    }

    pub async fn fetch_by_text(&self, text: &str) -> LookupState {
        match self.start_text(text) {
            Ok(pending) => self.run(pending).await,
            Err(_) => self.state(),
        }
    }

    pub async fn fetch_by_coordinates(&self, latitude: f64, longitude: f64) -> LookupState {
        let pending = self.start_coordinates(latitude, longitude);
        self.run(pending).await
    }

    /// One-shot startup geolocation. On success fetches by coordinates; on failure shows an
    /// advisory error. Either outcome is dropped if a newer request started meanwhile.
    pub async fn locate_and_fetch(&self, locator: &dyn Locator) -> LookupState {
        let issued_before = self.inner.lock().latest;
        let located = locator.locate().await;

        let pending = {
            let mut inner = self.inner.lock();
            if inner.torn_down || inner.latest != issued_before {
                tracing::debug!("geolocation finished after a newer request; ignoring");
                return inner.state.clone();
            }
            match located {
                Ok(pos) => {
                    let token = inner.issue();
                    inner.state = LookupState::Loading;
                    PendingFetch { token, query: Query::Coordinates(pos), origin: Origin::Coordinates }
                }
                Err(err) => {
                    tracing::info!(error = %err, "geolocation unavailable");
                    let err = LookupError::from(err);
                    inner.state = LookupState::Error(err.user_message().to_string());
                    return inner.state.clone();
                }
            }
        };

        self.run(pending).await
    }

    /// Invalidates every outstanding request; later completions are ignored.
    pub fn teardown(&self) {
        let mut inner = self.inner.lock();
        inner.torn_down = true;
        inner.latest += 1;
    }
}
