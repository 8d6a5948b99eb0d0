//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable:
//! - `EMPORIO_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive, Standard: info
//! - `EMPORIO_LOG_FORMAT`: Format (text/json), Standard: text
//!
//! Umgebungsvariablen haben Vorrang vor den Werten aus der Konfigurationsdatei.

use tracing_subscriber::{fmt, EnvFilter};

/// Umgebungsvariable fuer den Log-Level
pub const ENV_LOG_LEVEL: &str = "EMPORIO_LOG_LEVEL";
/// Umgebungsvariable fuer das Log-Format
pub const ENV_LOG_FORMAT: &str = "EMPORIO_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// `level` und `format` stammen aus der Konfiguration und werden von
/// `EMPORIO_LOG_LEVEL` / `EMPORIO_LOG_FORMAT` ueberschrieben. Ein zweiter
/// Aufruf (z.B. in Tests) ist wirkungslos.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LOG_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let env_format = std::env::var(ENV_LOG_FORMAT).ok();

    let ergebnis = match format_aufloesen(env_format.as_deref(), format) {
        "json" => fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .try_init(),
        _ => fmt().with_env_filter(filter).with_target(true).try_init(),
    };

    if ergebnis.is_err() {
        tracing::debug!("Logging bereits initialisiert");
    }
}

/// Waehlt das effektive Log-Format: gueltiger Env-Wert vor Konfiguration
pub fn format_aufloesen<'a>(aus_env: Option<&'a str>, aus_konfig: &'a str) -> &'a str {
    match aus_env {
        Some(f) if log_format_gueltig(f) => f,
        _ if log_format_gueltig(aus_konfig) => aus_konfig,
        _ => "text",
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
