pub mod coordinator;
pub mod geolocation;
pub mod results_view;
pub mod search_input;
