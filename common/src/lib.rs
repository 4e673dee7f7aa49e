pub mod config;
pub mod err_context;
pub mod postgres;
pub mod settings;
pub mod tracing;
