use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name";
pub const TEXT_LOOKUP_FAILED_MESSAGE: &str =
    "City not found. Please try again with a valid city name.";
pub const COORDINATE_LOOKUP_FAILED_MESSAGE: &str = "Could not get weather for your location.";
pub const GEOLOCATION_DENIED_MESSAGE: &str = "Location access denied. Please search manually.";
pub const GEOLOCATION_UNSUPPORTED_MESSAGE: &str =
    "Geolocation is not supported on this system. Please search manually.";

/// Why a provider request failed. Kept for logs; users see one message per entry point.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("location not found")]
    NotFound,

    #[error("provider rejected the API key")]
    Unauthorized,

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("malformed provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            404 => FetchError::NotFound,
            401 | 403 => FetchError::Unauthorized,
            code => FetchError::Status(code),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(err)
        }
    }
}

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("geolocation is not available")]
    Unsupported,

    #[error("geolocation failed: {0}")]
    Denied(String),
}

impl LocateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocateError::Unsupported => GEOLOCATION_UNSUPPORTED_MESSAGE,
            LocateError::Denied(_) => GEOLOCATION_DENIED_MESSAGE,
        }
    }
}

/// Which entry point a fetch came through; picks the user-facing failure text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Text,
    Coordinates,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("empty query")]
    EmptyQuery,

    #[error(transparent)]
    Geolocation(#[from] LocateError),

    #[error("{origin:?} lookup failed: {source}")]
    Fetch {
        origin: Origin,
        #[source]
        source: FetchError,
    },
}

impl LookupError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::EmptyQuery => EMPTY_QUERY_MESSAGE,
            LookupError::Geolocation(err) => err.user_message(),
            LookupError::Fetch { origin: Origin::Text, .. } => TEXT_LOOKUP_FAILED_MESSAGE,
            LookupError::Fetch { origin: Origin::Coordinates, .. } => {
                COORDINATE_LOOKUP_FAILED_MESSAGE
            }
        }
    }
}
