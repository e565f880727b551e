use async_trait::async_trait;

use crate::types::user_location::UserLocation;

#[derive(Debug)]
pub enum GeolocationError {
    Unavailable,
    Denied(String),
    Failed(String),
}

impl std::fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeolocationError::Unavailable => write!(f, "Geolocation is not available"),
            GeolocationError::Denied(reason) => write!(f, "Geolocation denied: {}", reason),
            GeolocationError::Failed(e) => write!(f, "Geolocation failed: {}", e),
        }
    }
}

impl std::error::Error for GeolocationError {}

/// One-shot source of the user's current position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(&self) -> Result<UserLocation, GeolocationError>;
}

/// Position taken from configuration; `None` behaves like a device without
/// geolocation support.
pub struct FixedGeolocator {
    location: Option<UserLocation>,
}

impl FixedGeolocator {
    pub fn new(location: Option<UserLocation>) -> Self {
        Self { location }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<UserLocation, GeolocationError> {
        self.location.ok_or(GeolocationError::Unavailable)
    }
}
