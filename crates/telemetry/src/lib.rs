//! Tracing subscriber bootstrap.

use amocover_kernel::settings::{LogFormat, TelemetrySettings};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once returns an error from the second call on.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(settings)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };

    installed
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")?;

    tracing::info!(
        target: "amocover-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn build_filter(settings: &TelemetrySettings) -> anyhow::Result<EnvFilter> {
    resolve_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok(), settings)
}

/// Valid `RUST_LOG` directives win; otherwise the configured filter must parse.
fn resolve_filter(
    env_directives: Option<String>,
    settings: &TelemetrySettings,
) -> anyhow::Result<EnvFilter> {
    if let Some(directives) = env_directives.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(&directives) {
            Ok(filter) => return Ok(filter),
            Err(e) => eprintln!("ignoring invalid RUST_LOG '{}': {}", directives, e),
        }
    }
    EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(log_filter: &str) -> TelemetrySettings {
        TelemetrySettings {
            log_format: LogFormat::Json,
            log_filter: log_filter.to_string(),
        }
    }

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        assert!(resolve_filter(None, &settings("warn,amocover_app=debug")).is_ok());
    }

    #[test]
    fn malformed_configured_filter_is_rejected() {
        let err = resolve_filter(None, &settings("amocover=notalevel")).unwrap_err();
        assert!(err.to_string().contains("invalid log filter 'amocover=notalevel'"));
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        let filter = resolve_filter(Some("debug".to_string()), &settings("amocover=notalevel")).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn invalid_rust_log_falls_back_to_configured_filter() {
        let filter = resolve_filter(Some("amocover=notalevel".to_string()), &settings("info")).unwrap();
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn build_filter_rejects_malformed_config() {
        std::env::remove_var(EnvFilter::DEFAULT_ENV);
        assert!(build_filter(&settings("amocover=notalevel")).is_err());
        assert!(build_filter(&settings("info,tower_http=debug")).is_ok());
    }
}
