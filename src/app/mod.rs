pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod telemetry;

// Re-export commonly used types
pub use cli::CliApp;
pub use config::AppConfig;
pub use error::AppError;
pub use service::run_service;
pub use telemetry::init_tracing;
