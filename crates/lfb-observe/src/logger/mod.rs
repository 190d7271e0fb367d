mod config;
mod error;
mod format;
mod layers;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global `tracing` subscriber for the dashboard process.
///
/// Call once, before the scheduler starts; a second call fails with
/// [`LoggerError::AlreadyInitialized`].
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    cfg.validate()?;
    layers::install(cfg)?;
    tracing::info!(format = ?cfg.format, level = %cfg.level, "logger initialized");
    Ok(())
}
