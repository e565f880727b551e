use async_trait::async_trait;

use super::types::IpApiResponse;
use crate::{
    session::geolocation::{GeolocationError, Geolocator},
    types::user_location::UserLocation,
};

/// Resolves the host's approximate position from its public IP address.
#[derive(Clone)]
pub struct IpGeolocationService {
    host: String,
    client: reqwest::Client,
}

impl IpGeolocationService {
    pub fn new(host: String) -> Self {
        Self {
            host,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Geolocator for IpGeolocationService {
    async fn current_position(&self) -> Result<UserLocation, GeolocationError> {
        let body = self
            .client
            .get(format!("{}/json", self.host))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GeolocationError::Failed(format!("Failed to send request: {}", e)))?
            .json::<IpApiResponse>()
            .await
            .map_err(|e| {
                GeolocationError::Failed(format!("Failed to get response body: {}", e))
            })?;

        if body.status != "success" {
            return Err(GeolocationError::Denied(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => UserLocation::new(lat, lon).ok_or_else(|| {
                GeolocationError::Failed(format!("Coordinates out of range: {}, {}", lat, lon))
            }),
            _ => Err(GeolocationError::Failed(
                "Response did not include coordinates".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service_with_body(body: IpApiResponse) -> (mockito::ServerGuard, IpGeolocationService) {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/json")
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&body).unwrap())
            .create_async()
            .await;

        let service = IpGeolocationService::new(server.url());
        (server, service)
    }

    #[tokio::test]
    async fn resolves_coordinates() {
        let (_server, service) = service_with_body(IpApiResponse {
            status: "success".to_string(),
            lat: Some(37.77),
            lon: Some(-122.41),
            message: None,
        })
        .await;

        let location = service.current_position().await.unwrap();

        assert_eq!(location, UserLocation::new(37.77, -122.41).unwrap());
    }

    #[tokio::test]
    async fn failed_lookup_is_denied() {
        let (_server, service) = service_with_body(IpApiResponse {
            status: "fail".to_string(),
            lat: None,
            lon: None,
            message: Some("private range".to_string()),
        })
        .await;

        match service.current_position().await {
            Err(GeolocationError::Denied(message)) => assert_eq!(message, "private range"),
            _ => panic!("Expected a denied lookup"),
        }
    }

    #[tokio::test]
    async fn server_error_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/json").with_status(500).create_async().await;

        let service = IpGeolocationService::new(server.url());

        assert!(matches!(
            service.current_position().await,
            Err(GeolocationError::Failed(_))
        ));
    }
}
