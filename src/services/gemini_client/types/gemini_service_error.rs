#[derive(Debug)]
pub enum GeminiServiceError {
    Request(String),
    Status(u16, String),
    Decode(String),
}

impl std::fmt::Display for GeminiServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            GeminiServiceError::Request(e) => write!(f, "Request failed: {}", e),
            GeminiServiceError::Status(code, body) => {
                write!(f, "Service responded with status {}: {}", code, body)
            }
            GeminiServiceError::Decode(e) => write!(f, "Failed to decode response: {}", e),
        }
    }
}

impl std::error::Error for GeminiServiceError {}
