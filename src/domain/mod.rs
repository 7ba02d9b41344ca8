// Domain layer - Fleet, alert and preference models
pub mod alert;
pub mod preferences;
pub mod vehicle;
