use axum::{extract::Request, middleware::Next, response::Response};
use metrics::{counter, histogram};
use std::time::Instant;

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status().as_u16().to_string();

    let labels = [("method", method), ("path", path), ("status", status)];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    response
}

/// Collapse per-resource path segments so metric label cardinality stays
/// bounded (`/profiles/children/42` -> `/profiles/children/{child_id}`).
fn normalize_path(path: &str) -> String {
    match path.strip_prefix("/profiles/children/") {
        Some(rest) if !rest.is_empty() && !rest.contains('/') && rest != "link-supervisor" => {
            "/profiles/children/{child_id}".to_string()
        }
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn child_id_segment_is_collapsed() {
        assert_eq!(
            normalize_path("/profiles/children/abc-123"),
            "/profiles/children/{child_id}"
        );
    }

    #[test]
    fn static_paths_pass_through() {
        assert_eq!(normalize_path("/profiles/children"), "/profiles/children");
        assert_eq!(
            normalize_path("/profiles/children/link-supervisor"),
            "/profiles/children/link-supervisor"
        );
        assert_eq!(
            normalize_path("/profiles/children/link-supervisor/extra"),
            "/profiles/children/link-supervisor/extra"
        );
        assert_eq!(normalize_path("/health"), "/health");
    }
}
