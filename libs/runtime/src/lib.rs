//! Process-level plumbing shared by the users service binary: layered
//! configuration, logging setup, home directory resolution and shutdown
//! signal handling.

pub mod config;
pub mod logging;
pub mod paths;
pub mod shutdown;

pub use config::{
    default_logging_config, AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
