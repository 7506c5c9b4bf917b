//! HTTP service
//!
//! ```text
//! POST   /api/generate                      generate a blueprint (never fails on LLM errors)
//! GET    /api/auth/callback                 code exchange, then relative redirect
//! GET    /api/ideas                         dashboard cards (session + persisted)
//! POST   /api/ideas                         save a project
//! GET    /api/ideas/{id}                    project view
//! DELETE /api/ideas/{id}                    delete blueprint, idea, session copy
//! GET    /api/ideas/{id}/tasks              task board
//! PATCH  /api/ideas/{id}/tasks/{task_id}    set a task's status
//! GET    /api/ideas/{id}/chart.svg          pillar radar chart
//! ```

pub mod api;
pub mod auth;
pub mod response;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post};
use tracing::{debug, info};

pub use api::{AppState, RequestContext};
pub use auth::{AuthExchange, AuthSession, HttpAuthExchange, NoAuthExchange, safe_redirect};
pub use response::{ApiError, ApiResponse};

use crate::blueprint::BlueprintGenerator;
use crate::config::Config;
use crate::constants::network::SESSION_HEADER;
use crate::constants::session::SWEEP_INTERVAL_SECS;
use crate::storage::{SessionRegistry, SharedRemote};
use crate::types::{ForgeError, Result, SessionId};

impl AppState {
    pub fn from_config(config: &Config, remote: SharedRemote) -> Result<Self> {
        Ok(Self {
            generator: Arc::new(BlueprintGenerator::from_config(&config.llm)),
            remote,
            sessions: Arc::new(SessionRegistry::with_limits(
                Duration::from_secs(config.server.session_ttl_secs),
                config.server.max_sessions,
            )),
            auth: Arc::from(auth::exchange_from_config(&config.auth)?),
            chart: config.chart.clone(),
            default_redirect: config.auth.default_redirect.clone(),
        })
    }
}

/// Give every request a session id, echoing it on the response.
async fn ensure_session(mut request: Request, next: Next) -> Response {
    let existing = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string);
    let id = existing.unwrap_or_else(|| SessionId::generate().as_str().to_string());

    let Ok(value) = HeaderValue::from_str(&id) else {
        return next.run(request).await;
    };
    request.headers_mut().insert(SESSION_HEADER, value.clone());
    let mut response = next.run(request).await;
    response.headers_mut().insert(SESSION_HEADER, value);
    response
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/generate", post(api::generate))
        .route("/api/auth/callback", get(api::auth_callback))
        .route("/api/ideas", get(api::list_ideas).post(api::save_idea))
        .route("/api/ideas/{id}", get(api::get_idea).delete(api::delete_idea))
        .route("/api/ideas/{id}/tasks", get(api::list_tasks))
        .route("/api/ideas/{id}/tasks/{task_id}", patch(api::update_task))
        .route("/api/ideas/{id}/chart.svg", get(api::chart_svg))
        .layer(middleware::from_fn(ensure_session))
        .with_state(state)
}

/// Drop idle sessions on a fixed tick.
fn spawn_session_sweeper(sessions: Arc<SessionRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let dropped = sessions.sweep_expired();
            if dropped > 0 {
                debug!("Expired {} idle sessions ({} live)", dropped, sessions.len());
            }
        }
    })
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ForgeError::Config(format!("Invalid server address: {}", e)))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "Listening on http://{} (provider: {})",
        listener.local_addr()?,
        state.generator.provider_name()
    );

    let sweeper = spawn_session_sweeper(Arc::clone(&state.sessions));
    let served = axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down");
        })
        .await;
    sweeper.abort();
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, SqliteRemote};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct CountingAuth(AtomicUsize);

    #[async_trait]
    impl AuthExchange for CountingAuth {
        async fn exchange_code(&self, _code: &str) -> Result<Option<AuthSession>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    fn state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        AppState {
            generator: Arc::new(BlueprintGenerator::mock()),
            remote: Arc::new(SqliteRemote::new(Arc::new(db))),
            sessions: Arc::new(SessionRegistry::new()),
            auth: Arc::new(NoAuthExchange),
            chart: Default::default(),
            default_redirect: "/dashboard".to_string(),
        }
    }

    fn request(method: &str, uri: &str, session: &str, user: Option<&str>, body: Option<Value>) -> Request {
        let mut builder = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header(SESSION_HEADER, session);
        if let Some(user) = user {
            builder = builder.header("x-user-id", user);
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn generate(app: &Router, session: &str, user: Option<&str>) -> Value {
        let (status, body) = send(
            app,
            request(
                "POST",
                "/api/generate",
                session,
                user,
                Some(json!({"title": "Task Tracker", "description": "A tool for teams"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    #[tokio::test]
    async fn test_generate_returns_blueprint() {
        let app = router(state());
        let body = generate(&app, "s1", None).await;

        assert_eq!(body["source"], "mock");
        let pillars = body["data"]["validation"]["pillars"].as_object().unwrap();
        assert_eq!(pillars.len(), 6);
        for score in pillars.values() {
            let score = score.as_f64().unwrap();
            assert!((4.0..=8.0).contains(&score));
        }
        assert!(body["data"]["ideaId"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_input() {
        let app = router(state());
        for payload in [
            json!({"title": "  ", "description": "x"}),
            json!({"title": "x"}),
            json!({}),
        ] {
            let (status, body) =
                send(&app, request("POST", "/api/generate", "s1", None, Some(payload))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["error"].as_str().is_some());
        }
    }

    #[tokio::test]
    async fn test_session_header_is_assigned() {
        let app = router(state());
        let req = axum::http::Request::builder()
            .uri("/api/ideas")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SESSION_HEADER).is_some());
    }

    #[tokio::test]
    async fn test_save_list_and_delete_authenticated() {
        let app = router(state());
        let generated = generate(&app, "s1", Some("alice")).await;
        let idea_id = generated["data"]["ideaId"].as_str().unwrap().to_string();

        let (status, saved) = send(&app, request("POST", "/api/ideas", "s1", Some("alice"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["data"]["persisted"], true);
        assert!(saved.get("warnings").is_none());

        // A fresh session still sees the persisted idea
        let (_, listed) = send(&app, request("GET", "/api/ideas", "s2", Some("alice"), None)).await;
        let cards = listed["data"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["id"], idea_id.as_str());
        assert_eq!(cards[0]["saved"], true);

        // Another user does not
        let (_, listed) = send(&app, request("GET", "/api/ideas", "s3", Some("bob"), None)).await;
        assert!(listed["data"].as_array().unwrap().is_empty());

        let uri = format!("/api/ideas/{}", idea_id);
        let (status, deleted) = send(&app, request("DELETE", &uri, "s1", Some("alice"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["data"]["remoteDeleted"], true);
        assert_eq!(deleted["data"]["sessionCleared"], true);

        let (status, _) = send(&app, request("GET", &uri, "s1", Some("alice"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_saving_twice_is_idempotent() {
        let app = router(state());
        let generated = generate(&app, "s1", Some("alice")).await;
        let idea_id = generated["data"]["ideaId"].as_str().unwrap().to_string();

        for _ in 0..2 {
            let (status, saved) =
                send(&app, request("POST", "/api/ideas", "s1", Some("alice"), None)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(saved["data"]["persisted"], true);
        }

        let (_, listed) = send(&app, request("GET", "/api/ideas", "s2", Some("alice"), None)).await;
        let cards = listed["data"].as_array().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0]["id"], idea_id.as_str());

        let uri = format!("/api/ideas/{}/tasks", idea_id);
        let (status, _) = send(&app, request("GET", &uri, "s2", Some("alice"), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reads_without_session_do_not_register_one() {
        let state = state();
        let sessions = Arc::clone(&state.sessions);
        let app = router(state);

        for _ in 0..50 {
            let req = axum::http::Request::builder()
                .uri("/api/ideas")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(req).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
        assert!(sessions.is_empty());

        generate(&app, "s1", None).await;
        send(&app, request("GET", "/api/ideas", "s1", None, None)).await;
        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_foreign_idea_save_is_forbidden() {
        let app = router(state());
        let generated = generate(&app, "s1", Some("alice")).await;
        let idea_id = generated["data"]["ideaId"].as_str().unwrap();
        send(&app, request("POST", "/api/ideas", "s1", Some("alice"), None)).await;

        // Same idea id submitted by another user
        let body = json!({
            "idea": {"id": idea_id, "title": "Task Tracker"},
            "blueprint": generated["data"].clone(),
        });
        let (status, error) = send(&app, request("POST", "/api/ideas", "s2", Some("bob"), Some(body))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(error["code"], "42501");
    }

    #[tokio::test]
    async fn test_task_board_and_update() {
        let app = router(state());
        let generated = generate(&app, "s1", None).await;
        let idea_id = generated["data"]["ideaId"].as_str().unwrap();

        let uri = format!("/api/ideas/{}/tasks", idea_id);
        let (status, board) = send(&app, request("GET", &uri, "s1", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["data"]["columns"].as_array().unwrap().len(), 3);
        assert_eq!(board["data"]["done"], 0);

        let task_uri = format!("/api/ideas/{}/tasks/{}-task-0", idea_id, idea_id);
        let (status, board) = send(
            &app,
            request("PATCH", &task_uri, "s1", None, Some(json!({"status": "Done"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["data"]["done"], 1);

        let (status, _) = send(
            &app,
            request("PATCH", &task_uri, "s1", None, Some(json!({"status": "someday"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chart_svg() {
        let app = router(state());
        let generated = generate(&app, "s1", None).await;
        let idea_id = generated["data"]["ideaId"].as_str().unwrap();

        let uri = format!("/api/ideas/{}/chart.svg?dpr=2", idea_id);
        let response = app.clone().oneshot(request("GET", &uri, "s1", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let svg = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(svg.contains(r#"width="800""#));
        assert!(svg.contains("Market Fit"));
    }

    #[tokio::test]
    async fn test_auth_callback_redirects() {
        let auth = Arc::new(CountingAuth(AtomicUsize::new(0)));
        let mut state = state();
        state.auth = auth.clone();
        let app = router(state);

        let response = app
            .clone()
            .oneshot(request("GET", "/api/auth/callback?code=abc&redirect=/projects", "s1", None, None))
            .await
            .unwrap();
        assert!(response.status().is_redirection());
        assert_eq!(response.headers()[header::LOCATION], "/projects");
        assert_eq!(auth.0.load(Ordering::SeqCst), 1);

        let response = app
            .oneshot(request(
                "GET",
                "/api/auth/callback?code=abc&redirect=https://evil.example",
                "s1",
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.headers()[header::LOCATION], "/dashboard");
    }
}
