pub mod gemini_service_error;
pub mod generate_content_request;
pub mod generate_content_response;
