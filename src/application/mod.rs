// Application layer - Simulation, alerting and dashboard use cases
pub mod alert_evaluator;
pub mod fleet_engine;
pub mod fleet_views;
pub mod preferences_repository;
pub mod simulator;
pub mod stream_driver;
pub mod theme_service;
