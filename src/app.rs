use std::{env, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::{
    routes::apply_routes,
    services::{
        gemini_client::gemini_service::{
            GeminiService, GeminiServiceConfig, DEFAULT_GEMINI_HOST, DEFAULT_GEMINI_MODEL,
        },
        geolocation_client::ip_geolocation_service::IpGeolocationService,
        places_ai::PlacesAi,
    },
    session::{
        coordinator::Coordinator,
        geolocation::{FixedGeolocator, Geolocator},
        search_input::{SearchInput, DEFAULT_DEBOUNCE},
    },
    types::{app_state::AppState, user_location::UserLocation},
};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "Missing required setting {}", key),
            ConfigError::Invalid { key, value } => {
                write!(f, "Invalid value for {}: {:?}", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub gemini_key: String,
    pub gemini_host: String,
    pub gemini_model: String,
    pub suggestion_debounce: Duration,
    pub geolocation_host: Option<String>,
    pub fixed_location: Option<UserLocation>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let gemini_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let suggestion_debounce = match get("SUGGESTION_DEBOUNCE_MS") {
            Some(ms) => Duration::from_millis(ms.parse().map_err(|_| ConfigError::Invalid {
                key: "SUGGESTION_DEBOUNCE_MS",
                value: ms.clone(),
            })?),
            None => DEFAULT_DEBOUNCE,
        };

        let coordinate = |key: &'static str| -> Result<Option<f64>, ConfigError> {
            get(key)
                .map(|v| {
                    v.parse::<f64>()
                        .map_err(|_| ConfigError::Invalid { key, value: v })
                })
                .transpose()
        };

        let fixed_location = match (
            coordinate("EXPLORER_LATITUDE")?,
            coordinate("EXPLORER_LONGITUDE")?,
        ) {
            (None, None) => None,
            (Some(lat), Some(lon)) => Some(UserLocation::new(lat, lon).ok_or_else(|| {
                ConfigError::Invalid {
                    key: "EXPLORER_LATITUDE",
                    value: format!("{}, {}", lat, lon),
                }
            })?),
            (None, Some(_)) => return Err(ConfigError::Missing("EXPLORER_LATITUDE")),
            (Some(_), None) => return Err(ConfigError::Missing("EXPLORER_LONGITUDE")),
        };

        Ok(AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            gemini_key,
            gemini_host: get("GEMINI_HOST").unwrap_or_else(|| DEFAULT_GEMINI_HOST.to_string()),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            suggestion_debounce,
            geolocation_host: get("GEOLOCATION_HOST"),
            fixed_location,
        })
    }
}

pub fn gen_app(config: AppConfig) -> Router {
    let cors_middleware = CorsLayer::new();
    let geolocator = geolocator_for(&config);

    let places_ai: Arc<dyn PlacesAi> = Arc::new(GeminiService::new(GeminiServiceConfig {
        api_key: config.gemini_key,
        host: config.gemini_host,
        model: config.gemini_model,
    }));
    let coordinator = Arc::new(Coordinator::new(places_ai.clone()));

    {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.acquire_location(geolocator.as_ref()).await });
    }

    let state = AppState {
        search_input: Arc::new(SearchInput::new(
            places_ai.clone(),
            config.suggestion_debounce,
        )),
        places_ai,
        coordinator,
    };

    apply_routes(Router::new())
        .route("/", get(root))
        .layer(cors_middleware)
        .with_state(state)
}

/// Configured coordinates take precedence over an IP lookup.
fn geolocator_for(config: &AppConfig) -> Box<dyn Geolocator> {
    match (config.fixed_location, &config.geolocation_host) {
        (Some(location), host) => {
            if host.is_some() {
                warn!("GEOLOCATION_HOST is ignored because a fixed location is configured");
            }
            Box::new(FixedGeolocator::new(Some(location)))
        }
        (None, Some(host)) => Box::new(IpGeolocationService::new(host.clone())),
        (None, None) => Box::new(FixedGeolocator::new(None)),
    }
}

async fn root() -> &'static str {
    "Maps explorer is running"
}

#[cfg(test)]
pub struct MockApp {
    pub app: Router,
    pub gemini_server: mockito::ServerGuard,
}

#[cfg(test)]
pub async fn gen_mock_app() -> MockApp {
    let gemini_server = mockito::Server::new_async().await;

    let app = gen_app(AppConfig {
        bind_addr: DEFAULT_BIND_ADDR.to_string(),
        gemini_key: "key".to_string(),
        gemini_host: gemini_server.url(),
        gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        suggestion_debounce: Duration::from_millis(10),
        geolocation_host: None,
        fixed_location: None,
    });

    MockApp { app, gemini_server }
}
