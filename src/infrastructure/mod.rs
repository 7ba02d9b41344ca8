// Infrastructure layer - External dependencies and adapters
pub mod chunked_json;
pub mod config;
pub mod file_preferences;
pub mod http_response;
