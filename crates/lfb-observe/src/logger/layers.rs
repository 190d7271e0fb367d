use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type Output = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the output layer for `cfg.format`, filter it, and make it the global default.
pub(super) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = env_filter(&cfg.level)?;
    let output = match cfg.format {
        LoggerFormat::Text => text(cfg),
        LoggerFormat::Json => json(cfg),
        LoggerFormat::Journald => journald()?,
    };

    // try_init only fails when a dispatcher (or log bridge) is already set.
    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn text(cfg: &LoggerConfig) -> Output {
    fmt::layer()
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_timer(local_rfc3339())
        .boxed()
}

fn json(cfg: &LoggerConfig) -> Output {
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(cfg.with_targets)
        .with_timer(local_rfc3339())
        .boxed()
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald() -> Result<Output, LoggerError> {
    tracing_journald::layer()
        .map(|layer| layer.with_syslog_identifier("lfb-dashboard".into()).boxed())
        .map_err(|e| LoggerError::Journald(e.to_string()))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald() -> Result<Output, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

fn env_filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Falls back to UTC when the local offset cannot be determined
/// (multi-threaded process on unix).
fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_crate_directives() {
        assert!(env_filter("info").is_ok());
        assert!(env_filter("lfb_core=debug,lfb_fetch=trace,warn").is_ok());
    }

    #[test]
    fn filter_reports_the_bad_directive() {
        match env_filter("lfb_core=loud") {
            Err(LoggerError::InvalidFilter { directive, .. }) => {
                assert_eq!(directive, "lfb_core=loud")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn second_install_is_rejected() {
        let cfg = LoggerConfig::with_level("warn");
        let first = install(&cfg);
        let second = install(&cfg);
        // another test binary thread may have won the first call
        assert!(first.is_ok() || matches!(first, Err(LoggerError::AlreadyInitialized)));
        assert!(matches!(second, Err(LoggerError::AlreadyInitialized)));
    }
}
