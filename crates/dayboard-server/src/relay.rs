//! HTTP endpoints of the relay.
//!
//! Reads are served from the cache only. Token submission and forced
//! refresh each run one attempt through the [`Refresher`] and report its
//! outcome in the response body; upstream failures are never surfaced as
//! HTTP errors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::handler::HandlerWithoutStateExt;
use axum::http::{StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dayboard_protocol::{
    EVENTS_PATH, EventsResponse, HEALTH_PATH, REFRESH_PATH, RefreshStatus, RelayResponse,
    STATUS_PATH, TOKEN_PATH, TokenRequest,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::{ServerError, ServerResult};
use crate::refresh::{RefreshTrigger, Refresher};

/// Shared handler state.
pub type RelayState = Arc<Refresher>;

/// Builds the relay router.
///
/// When `static_dir` exists, unknown paths are served from it. Paths
/// without an extension that match no file get `index.html`; a missing
/// asset such as `/app.js` is a 404.
pub fn router(refresher: RelayState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route(EVENTS_PATH, get(get_events))
        .route(TOKEN_PATH, post(submit_token))
        .route(REFRESH_PATH, post(force_refresh))
        .route(STATUS_PATH, get(get_status))
        .route(HEALTH_PATH, get(health))
        .with_state(refresher);

    let app = match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(dir = %dir.display(), "serving static UI");
            let index = dir.join("index.html");
            let spa = move |uri: Uri| spa_index(index, uri);
            api.fallback_service(ServeDir::new(dir).fallback(spa.into_service()))
        }
        Some(dir) => {
            warn!(dir = %dir.display(), "static directory not found, UI disabled");
            api
        }
        None => api,
    };

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn spa_index(index: PathBuf, uri: Uri) -> Response {
    if Path::new(uri.path()).extension().is_some() {
        return StatusCode::NOT_FOUND.into_response();
    }
    match tokio::fs::read(&index).await {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            warn!(path = %index.display(), error = %e, "index.html unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn get_events(State(refresher): State<RelayState>) -> Json<EventsResponse> {
    let record = refresher.cache().snapshot();
    Json(EventsResponse::new(record.events, record.fetched_at))
}

async fn submit_token(
    State(refresher): State<RelayState>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> ServerResult<Json<RelayResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "malformed token submission");
        ServerError::validation(rejection.body_text())
    })?;
    let token = request
        .token()
        .ok_or_else(|| ServerError::validation("No token provided"))?;

    refresher.tokens().store(token)?;

    let outcome = refresher.refresh(RefreshTrigger::TokenSubmitted).await;
    Ok(Json(if outcome.is_success() {
        RelayResponse::ok("Token stored and calendar refreshed")
    } else {
        RelayResponse::failed(
            "Token stored but calendar refresh failed",
            outcome.error_message(),
        )
    }))
}

async fn force_refresh(State(refresher): State<RelayState>) -> Json<RelayResponse> {
    let outcome = refresher.refresh(RefreshTrigger::Forced).await;
    Json(if outcome.is_success() {
        RelayResponse::ok("Calendar refreshed")
    } else {
        RelayResponse::failed("Failed to refresh calendar", outcome.error_message())
    })
}

async fn get_status(State(refresher): State<RelayState>) -> Json<RefreshStatus> {
    Json(refresher.status())
}

async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::fs;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use dayboard_providers::FetchError;
    use tower::ServiceExt;

    use super::*;
    use crate::cache::EventCache;
    use crate::testing::{ScriptedSource, event};
    use crate::tokens::TokenStore;

    struct Fixture {
        dir: tempfile::TempDir,
        source: Arc<ScriptedSource>,
        refresher: Arc<Refresher>,
    }

    impl Fixture {
        fn new(source: ScriptedSource) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let source = Arc::new(source);
            let refresher = Arc::new(Refresher::new(
                Arc::new(TokenStore::open(dir.path())),
                Arc::new(EventCache::open(dir.path())),
                source.clone(),
            ));
            Self {
                dir,
                source,
                refresher,
            }
        }

        fn app(&self) -> Router {
            router(self.refresher.clone(), None)
        }
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, path: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = send(app, Request::get(path).body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post_json(app: Router, path: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn submit_token_then_read_events() {
        let f = Fixture::new(ScriptedSource::ok(vec![event("a1", "Team Sync", 9)]));

        let (status, body) = post_json(f.app(), TOKEN_PATH, r#"{"token":"tok-123"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Token stored and calendar refreshed"})
        );
        assert_eq!(f.source.calls(), 1);
        assert_eq!(f.source.tokens(), vec!["tok-123".to_string()]);

        let (status, body) = get_json(f.app(), EVENTS_PATH).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["events"].as_array().unwrap().len(), 1);
        assert_eq!(body["events"][0]["id"], "a1");
        assert_eq!(body["events"][0]["colorClass"], "bg-cyan-500");
        assert!(!body["lastFetch"].is_null());
    }

    #[tokio::test]
    async fn expired_token_on_submission() {
        let f = Fixture::new(ScriptedSource::failing(FetchError::TokenExpired));

        let (status, body) = post_json(f.app(), TOKEN_PATH, r#"{"token":"stale"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "token expired or revoked");
        assert_eq!(f.source.calls(), 1);

        assert!(!f.refresher.has_token());
        let (_, events) = get_json(f.app(), EVENTS_PATH).await;
        assert_eq!(events, serde_json::json!({"events": [], "lastFetch": null}));
    }

    #[tokio::test]
    async fn missing_token_is_rejected_without_side_effects() {
        let f = Fixture::new(ScriptedSource::ok(Vec::new()));

        for body in [r#"{}"#, r#"{"token":""}"#, r#"{"token":"   "}"#, r#"{"token":null}"#] {
            let (status, json) = post_json(f.app(), TOKEN_PATH, body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
            assert_eq!(
                json,
                serde_json::json!({"success": false, "error": "No token provided"})
            );
        }
        assert_eq!(f.source.calls(), 0);
        assert!(!f.refresher.has_token());
        assert!(!f.dir.path().join("token.json").exists());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let f = Fixture::new(ScriptedSource::ok(Vec::new()));

        let (status, json) = post_json(f.app(), TOKEN_PATH, "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);

        let request = Request::post(TOKEN_PATH)
            .body(Body::from(r#"{"token":"x"}"#))
            .unwrap();
        let (status, _) = send(f.app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(f.source.calls(), 0);
    }

    #[tokio::test]
    async fn force_refresh_without_token() {
        let f = Fixture::new(ScriptedSource::ok(vec![event("a1", "Team Sync", 9)]));

        let (status, body) = post_json(f.app(), REFRESH_PATH, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Failed to refresh calendar");
        assert_eq!(f.source.calls(), 0);

        let (_, events) = get_json(f.app(), EVENTS_PATH).await;
        assert_eq!(events, serde_json::json!({"events": [], "lastFetch": null}));
    }

    #[tokio::test]
    async fn force_refresh_with_token() {
        let f = Fixture::new(ScriptedSource::ok(vec![event("a1", "Team Sync", 9)]));
        f.refresher.tokens().store("tok").unwrap();

        let (_, body) = post_json(f.app(), REFRESH_PATH, "").await;
        assert_eq!(
            body,
            serde_json::json!({"success": true, "message": "Calendar refreshed"})
        );
    }

    #[tokio::test]
    async fn repeated_reads_are_byte_identical() {
        let f = Fixture::new(ScriptedSource::ok(vec![
            event("a1", "Team Sync", 9),
            event("b2", "Client Meeting", 14),
        ]));
        f.refresher.tokens().store("tok").unwrap();
        f.refresher.refresh(RefreshTrigger::Forced).await;

        let read = || send(f.app(), Request::get(EVENTS_PATH).body(Body::empty()).unwrap());
        let (_, first) = read().await;
        let (_, second) = read().await;
        assert_eq!(first, second);
        assert_eq!(f.source.calls(), 1);
    }

    #[tokio::test]
    async fn status_and_health() {
        let f = Fixture::new(ScriptedSource::failing(FetchError::upstream(Some(500), "Backend Error")));
        f.refresher.tokens().store("secret-token").unwrap();
        f.refresher.refresh(RefreshTrigger::Forced).await;

        let (status, body) = get_json(f.app(), STATUS_PATH).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hasToken"], true);
        assert_eq!(body["consecutiveFailures"], 1);
        assert_eq!(body["lastError"], "Backend Error");
        assert!(!body.to_string().contains("secret-token"));

        let (status, body) = send(f.app(), Request::get(HEALTH_PATH).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"ok");
    }

    #[tokio::test]
    async fn cors_is_permissive() {
        let f = Fixture::new(ScriptedSource::ok(Vec::new()));
        let request = Request::get(EVENTS_PATH)
            .header(header::ORIGIN, "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = f.app().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn static_ui_with_spa_fallback() {
        let f = Fixture::new(ScriptedSource::ok(Vec::new()));
        let ui = tempfile::tempdir().unwrap();
        fs::write(ui.path().join("index.html"), "<html>dashboard</html>").unwrap();
        fs::write(ui.path().join("app.js"), "console.log(1)").unwrap();
        let app = router(f.refresher.clone(), Some(ui.path()));

        let (status, body) = send(app.clone(), Request::get("/app.js").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"console.log(1)");

        let (status, body) = send(app.clone(), Request::get("/settings").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>dashboard</html>");

        let (status, body) =
            send(app.clone(), Request::get("/settings/profile").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<html>dashboard</html>");
    }

    #[tokio::test]
    async fn missing_asset_is_not_found() {
        let f = Fixture::new(ScriptedSource::ok(Vec::new()));
        let ui = tempfile::tempdir().unwrap();
        fs::write(ui.path().join("index.html"), "<html>dashboard</html>").unwrap();
        let app = router(f.refresher.clone(), Some(ui.path()));

        for path in ["/app.js", "/assets/logo.png", "/favicon.ico"] {
            let (status, body) = send(app.clone(), Request::get(path).body(Body::empty()).unwrap()).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{path}");
            assert_ne!(body, b"<html>dashboard</html>");
        }

        let (status, _) = get_json(app, EVENTS_PATH).await;
        assert_eq!(status, StatusCode::OK);
    }
}
