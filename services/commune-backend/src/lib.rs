pub mod application;
pub mod authentication;
pub mod domain;
pub mod services;
pub mod telemetry;
