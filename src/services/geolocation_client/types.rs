use serde::{Deserialize, Serialize};

/// Body of an ip-api compatible `/json` lookup.
#[derive(Serialize, Deserialize)]
pub struct IpApiResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
