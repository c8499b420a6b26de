use crate::ShowcaseError;
use crate::cache::ListingCache;
use crate::config::Listener as ListenerConfig;
use crate::resolver::ResolveError;
use crate::types::Listing;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;

pub const PROJECTS_PATH: &str = "/api/github-projects";
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=300, stale-while-revalidate=60";
pub const SOURCE_HEADER: &str = "x-projects-source";
pub const FAILURE_MESSAGE: &str = "Failed to fetch projects.";

pub fn router(cache: ListingCache) -> Router {
    Router::new()
        .route(PROJECTS_PATH, get(handler))
        .with_state(cache)
}

/// Binds the public listener, flags readiness, and serves until the process exits.
pub async fn serve(
    listener: &ListenerConfig,
    cache: ListingCache,
    ready: Arc<AtomicBool>,
) -> Result<(), ShowcaseError> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "serving project listing");
    ready.store(true, Ordering::Relaxed);

    axum::serve(tcp, router(cache)).await?;
    Ok(())
}

struct ProjectsResponse(Listing);

impl IntoResponse for ProjectsResponse {
    fn into_response(self) -> Response {
        let source = HeaderValue::from_static(self.0.source.as_str());
        (
            StatusCode::OK,
            [
                (CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE)),
                (HeaderName::from_static(SOURCE_HEADER), source),
            ],
            Json(self.0.projects.as_slice()),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ApiErrorResponse {
    message: &'static str,
}

async fn handler(State(cache): State<ListingCache>) -> Result<ProjectsResponse, ResolveError> {
    cache.get().await.map(ProjectsResponse)
}

impl IntoResponse for ResolveError {
    fn into_response(self) -> Response {
        // Only the log gets the details.
        tracing::error!(error = %self, "failed to serve project listing");

        let body = Json(ApiErrorResponse {
            message: FAILURE_MESSAGE,
        });
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DEFAULT_TTL;
    use crate::resolver::tests::{StubSource, project};
    use crate::resolver::{ProjectSource, Resolver, SourceError};
    use crate::types::{ProjectRecord, SourceTag};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(sources: Vec<Arc<dyn ProjectSource>>) -> Router {
        router(ListingCache::new(Resolver::new(sources), DEFAULT_TTL))
    }

    async fn get_projects(app: Router) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = app
            .oneshot(Request::get(PROJECTS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_headers_and_body() {
        let local = StubSource::new(SourceTag::Local, Ok(vec![project("a")]));
        let (status, headers, body) = get_projects(app(vec![local])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[CACHE_CONTROL], CACHE_CONTROL_VALUE);
        assert_eq!(headers[SOURCE_HEADER], "local");

        let projects: Vec<ProjectRecord> = serde_json::from_value(body).unwrap();
        assert_eq!(projects, vec![project("a")]);
    }

    #[tokio::test]
    async fn test_failure_hides_cause() {
        let remote = StubSource::new(
            SourceTag::Remote,
            Err(SourceError::Unavailable("secret upstream detail".into())),
        );
        let local = StubSource::new(
            SourceTag::Local,
            Err(SourceError::Unavailable("/srv/projects.json missing".into())),
        );
        let (status, headers, body) = get_projects(app(vec![remote, local])).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(headers.get(SOURCE_HEADER).is_none());
        assert_eq!(body, json!({"message": FAILURE_MESSAGE}));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let response = app(vec![])
            .oneshot(Request::get("/api/other").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
