//! Request-Timing Middleware fuer Axum
//!
//! Misst die Antwortzeit jeder HTTP-Anfrage, protokolliert sie als
//! strukturiertes Log-Event und erfasst sie in den Prometheus-Metriken.

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;

use crate::metrics::EmporioMetrics;

/// Axum-Middleware-Funktion: misst Antwortzeit, loggt und zaehlt.
///
/// Verwendung:
/// ```ignore
/// Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(metriken, timing_middleware))
/// ```
pub async fn timing_middleware(
    State(metriken): State<EmporioMetrics>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let methode = req.method().to_string();
    let pfad = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    let dauer = start.elapsed();
    let status = response.status().as_u16();

    metriken
        .http_requests_total
        .with_label_values(&[methode.as_str(), status_klasse(status)])
        .inc();
    metriken
        .http_request_duration_seconds
        .with_label_values(&[methode.as_str()])
        .observe(dauer.as_secs_f64());

    tracing::info!(
        method = %methode,
        path = %pfad,
        status = status,
        duration_ms = dauer.as_millis() as u64,
        "HTTP-Anfrage abgeschlossen"
    );

    response
}

/// Fasst Statuscodes zu Klassen zusammen, damit die Label-Kardinalitaet klein bleibt
pub fn status_klasse(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use tower::ServiceExt;

    #[test]
    fn status_klassen() {
        assert_eq!(status_klasse(101), "1xx");
        assert_eq!(status_klasse(200), "2xx");
        assert_eq!(status_klasse(304), "3xx");
        assert_eq!(status_klasse(404), "4xx");
        assert_eq!(status_klasse(413), "4xx");
        assert_eq!(status_klasse(500), "5xx");
    }

    #[tokio::test]
    async fn middleware_zaehlt_anfragen() {
        let metriken = EmporioMetrics::neu().unwrap();
        let app = Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(axum::middleware::from_fn_with_state(
                metriken.clone(),
                timing_middleware,
            ));

        let antwort = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(antwort.status(), 200);
        assert_eq!(
            metriken
                .http_requests_total
                .with_label_values(&["GET", "2xx"])
                .get(),
            1
        );
    }
}
