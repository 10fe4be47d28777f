//! Request metrics for the `/api/v1` router.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use prometheus::IntGauge;
use tracing::debug;
use uuid::Uuid;

use crate::metrics::{
    normalize_path, HTTP_REQUESTS_IN_FLIGHT, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION,
};

/// One slot of an in-flight gauge, released on drop.
///
/// Handlers whose future is dropped mid-request (client hung up while a
/// checkout was uploading) still give their slot back.
struct InFlight<'a>(&'a IntGauge);

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

/// Session addressed by a `/sessions/{id}/...` path, if any.
fn session_id(path: &str) -> Option<Uuid> {
    let mut segments = path.split('/');
    segments.by_ref().find(|segment| *segment == "sessions")?;
    segments.next().and_then(|id| Uuid::parse_str(id).ok())
}

/// Record duration, count and in-flight requests per method, route and
/// status. Session IDs and numeric segments are folded into `{id}`.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let session = session_id(request.uri().path());
    let path = normalize_path(request.uri().path());

    let response = {
        let _in_flight = InFlight::enter(&HTTP_REQUESTS_IN_FLIGHT);
        next.run(request).await
    };

    let elapsed = start.elapsed();
    let status = response.status().as_u16().to_string();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &path, &status])
        .observe(elapsed.as_secs_f64());
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    match session {
        Some(id) => debug!(
            "{} {} -> {} in {:?} (session {})",
            method, path, status, elapsed, id
        ),
        None => debug!("{} {} -> {} in {:?}", method, path, status, elapsed),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::post, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    async fn toggle_handler() -> &'static str {
        "OK"
    }

    #[tokio::test]
    async fn test_metrics_middleware_folds_session_routes() {
        let app = Router::new()
            .route(
                "/sessions/{id}/seats/{row}/{column}/toggle",
                post(toggle_handler),
            )
            .layer(middleware::from_fn(metrics_middleware));
        let labels = ["POST", "/sessions/{id}/seats/{id}/{id}/toggle", "200"];
        let before = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();

        for (row, column) in [(0, 1), (3, 7)] {
            let request = Request::builder()
                .method("POST")
                .uri(format!(
                    "/sessions/{}/seats/{}/{}/toggle",
                    Uuid::new_v4(),
                    row,
                    column
                ))
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let after = HTTP_REQUESTS_TOTAL.with_label_values(&labels).get();
        assert_eq!(after, before + 2);
    }

    #[test]
    fn test_session_id_from_path() {
        let id = Uuid::new_v4();
        assert_eq!(
            session_id(&format!("/api/v1/sessions/{}/checkout", id)),
            Some(id)
        );
        assert_eq!(session_id(&format!("/api/v1/sessions/{}", id)), Some(id));
        assert_eq!(session_id("/api/v1/sessions"), None);
        assert_eq!(session_id("/api/v1/sessions/not-a-uuid"), None);
        assert_eq!(session_id("/api/v1/movies/603"), None);
    }

    #[test]
    fn test_in_flight_released_on_drop() {
        let gauge = IntGauge::new("test_in_flight", "In-flight test gauge").unwrap();
        {
            let _first = InFlight::enter(&gauge);
            let _second = InFlight::enter(&gauge);
            assert_eq!(gauge.get(), 2);
        }
        assert_eq!(gauge.get(), 0);
    }

    #[tokio::test]
    async fn test_in_flight_released_when_request_is_cancelled() {
        let gauge = IntGauge::new("test_in_flight_cancel", "In-flight test gauge").unwrap();
        let request = async {
            let _in_flight = InFlight::enter(&gauge);
            std::future::pending::<()>().await;
        };

        assert!(tokio::time::timeout(Duration::from_millis(10), request)
            .await
            .is_err());
        assert_eq!(gauge.get(), 0);
    }
}
