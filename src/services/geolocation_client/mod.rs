pub mod ip_geolocation_service;
pub mod types;
