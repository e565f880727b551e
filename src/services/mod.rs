pub mod gemini_client;
pub mod geolocation_client;
pub mod places_ai;
