// Presentation layer - HTTP surface over the fleet engine
pub mod api_error;
pub mod app_state;
pub mod handlers;
