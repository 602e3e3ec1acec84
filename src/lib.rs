/*!
 * thermalctl - read and update device thermal profiles
 *
 * Presentation layer over `thermal-connect`:
 * - TOML client configuration with CLI overrides
 * - Structured logging to stderr or a JSON log file
 * - Command handlers that receive their connector explicitly
 */

pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{ClientConfig, LogLevel, Protocol};
pub use error::{CliError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
