//! Prometheus-kompatible Metriken fuer Emporio
//!
//! Registrierte Metriken:
//! - `emporio_ws_sessions` – Gauge: Aktuell offene WebSocket-Sessions
//! - `emporio_deliveries_total` – Counter: Zustellungen (weg = user/broadcast)
//! - `emporio_deliveries_dropped_total` – Counter: Adressierte Nachrichten ohne Empfaenger
//! - `emporio_uploads_total` – Counter: Bild-Uploads (ergebnis = ok/abgelehnt/fehler)
//! - `emporio_http_requests_total` – Counter: HTTP-Anfragen (method, status)
//! - `emporio_http_request_duration_seconds` – Histogram: HTTP-Antwortzeit

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;

/// Alle Emporio-Prometheus-Metriken
#[derive(Clone)]
pub struct EmporioMetrics {
    pub registry: Arc<Registry>,

    // Chat-Metriken
    pub ws_sessions: IntGauge,
    pub deliveries_total: IntCounterVec,
    pub deliveries_dropped_total: IntCounter,
    pub uploads_total: IntCounterVec,

    // HTTP-Metriken
    pub http_requests_total: IntCounterVec,
    pub http_request_duration_seconds: HistogramVec,
}

impl EmporioMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // Prozess-Metriken (CPU, Speicher, offene FDs)
        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        // --- Chat-Metriken ---
        let ws_sessions = IntGauge::with_opts(Opts::new(
            "emporio_ws_sessions",
            "Anzahl aktuell offener WebSocket-Sessions",
        ))?;
        registry.register(Box::new(ws_sessions.clone()))?;

        let deliveries_total = IntCounterVec::new(
            Opts::new(
                "emporio_deliveries_total",
                "Zugestellte Nachrichten pro Session",
            ),
            &["weg"],
        )?;
        registry.register(Box::new(deliveries_total.clone()))?;

        let deliveries_dropped_total = IntCounter::with_opts(Opts::new(
            "emporio_deliveries_dropped_total",
            "Adressierte Nachrichten, deren Empfaenger nicht verbunden war",
        ))?;
        registry.register(Box::new(deliveries_dropped_total.clone()))?;

        let uploads_total = IntCounterVec::new(
            Opts::new("emporio_uploads_total", "Bild-Uploads nach Ergebnis"),
            &["ergebnis"],
        )?;
        registry.register(Box::new(uploads_total.clone()))?;

        // --- HTTP-Metriken ---
        let http_requests_total = IntCounterVec::new(
            Opts::new("emporio_http_requests_total", "Gesamtanzahl HTTP-Anfragen"),
            &["method", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        let http_request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "emporio_http_request_duration_seconds",
                "HTTP-Antwortzeit in Sekunden",
            )
            .buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5,
            ]),
            &["method"],
        )?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            ws_sessions,
            deliveries_total,
            deliveries_dropped_total,
            uploads_total,
            http_requests_total,
            http_request_duration_seconds,
        })
    }

    /// Erfasst eine Zustellung an `erreicht` Sessions
    pub fn zustellung_erfassen(&self, weg: &str, erreicht: usize) {
        self.deliveries_total
            .with_label_values(&[weg])
            .inc_by(erreicht as u64);
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: EmporioMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<EmporioMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metriken_erstellen_erfolgreich() {
        let metriken = EmporioMetrics::neu().unwrap();
        assert!(!metriken.registry.gather().is_empty());
    }

    #[test]
    fn gauge_ws_sessions() {
        let metriken = EmporioMetrics::neu().unwrap();
        metriken.ws_sessions.inc();
        metriken.ws_sessions.inc();
        metriken.ws_sessions.dec();
        assert_eq!(metriken.ws_sessions.get(), 1);
    }

    #[test]
    fn zustellungen_nach_weg() {
        let metriken = EmporioMetrics::neu().unwrap();
        metriken.zustellung_erfassen("broadcast", 3);
        metriken.zustellung_erfassen("broadcast", 2);
        metriken.zustellung_erfassen("user", 1);

        assert_eq!(
            metriken.deliveries_total.with_label_values(&["broadcast"]).get(),
            5
        );
        assert_eq!(metriken.deliveries_total.with_label_values(&["user"]).get(), 1);
    }

    #[test]
    fn metriken_export_prometheus_format() {
        let metriken = EmporioMetrics::neu().unwrap();
        metriken.ws_sessions.set(5);
        metriken.uploads_total.with_label_values(&["ok"]).inc();

        let output = metriken.exportieren().unwrap();
        assert!(output.contains("emporio_ws_sessions 5"));
        assert!(output.contains("emporio_uploads_total{ergebnis=\"ok\"} 1"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn zwei_instanzen_unabhaengig() {
        // Jede Instanz hat ihre eigene Registry, keine Doppelregistrierung
        let a = EmporioMetrics::neu().unwrap();
        let b = EmporioMetrics::neu().unwrap();
        a.deliveries_dropped_total.inc();
        assert_eq!(b.deliveries_dropped_total.get(), 0);
    }
}
