// Common library for the record layer shared by the API server and its clients

pub mod attendance;
pub mod clock;
pub mod config;
pub mod errors;
pub mod models;
pub mod onboarding;
pub mod reports;
pub mod repository;
pub mod telemetry;
pub mod validation;
