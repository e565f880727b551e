pub mod app_state;
pub mod place;
pub mod user_location;
