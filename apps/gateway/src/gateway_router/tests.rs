use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use agrogate_application::{
    IdentityClient, IdentityLookupError, LoginCredentials, LoginGrant, NavigationService,
    ResolverConfig, RoleResolver, SessionService,
};
use agrogate_core::{AppError, AppResult, SessionToken};
use agrogate_domain::RouteTable;
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::gateway_services::sessions::build_memory_session_layer;
use crate::state::AppState;

use super::build_router;

const FRONTEND: &str = "http://localhost:3000";

#[derive(Default)]
struct StubIdentityClient {
    login_user: Option<Value>,
    lookups: Mutex<VecDeque<Result<Value, IdentityLookupError>>>,
    lookup_calls: AtomicUsize,
}

impl StubIdentityClient {
    fn with_login_user(user: Value) -> Self {
        Self {
            login_user: Some(user),
            ..Self::default()
        }
    }

    fn with_lookups(lookups: Vec<Result<Value, IdentityLookupError>>) -> Self {
        Self {
            lookups: Mutex::new(lookups.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdentityClient for StubIdentityClient {
    async fn fetch_identity(&self, _token: &SessionToken) -> Result<Value, IdentityLookupError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.lookups
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(IdentityLookupError::Status(503)))
    }

    async fn login(&self, credentials: &LoginCredentials) -> AppResult<LoginGrant> {
        if credentials.password != "correct" {
            return Err(AppError::Unauthorized("invalid credentials".to_owned()));
        }

        Ok(LoginGrant {
            token: SessionToken::new("issued-token")?,
            user: self.login_user.clone(),
        })
    }
}

fn app(client: &Arc<StubIdentityClient>) -> Router {
    let identity_client: Arc<dyn IdentityClient> = client.clone();
    let state = AppState {
        navigation_service: NavigationService::new(
            RoleResolver::new(identity_client.clone(), ResolverConfig::default()),
            RouteTable::standard(),
        ),
        session_service: SessionService::new(identity_client),
        frontend_url: FRONTEND.to_owned(),
        redis_client: None,
    };

    build_router(state, FRONTEND, build_memory_session_layer(false))
        .unwrap_or_else(|error| panic!("failed to build router: {error}"))
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone()
        .oneshot(request)
        .await
        .unwrap_or_else(|error| match error {})
}

fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::empty())
        .unwrap_or_else(|error| panic!("invalid request: {error}"))
}

fn post_json(path: &str, body: &Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post(path)
        .header(header::ORIGIN, FRONTEND)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .unwrap_or_else(|error| panic!("invalid request: {error}"))
}

fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn set_cookie(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_else(|| panic!("response did not set a session cookie"))
}

fn session_cookie(response: &Response<Body>) -> String {
    set_cookie(response)
        .split(';')
        .next()
        .map(str::to_owned)
        .unwrap_or_default()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_else(|error| panic!("failed to read body: {error}"));
    String::from_utf8_lossy(&bytes).into_owned()
}

async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await)
        .unwrap_or_else(|error| panic!("body is not json: {error}"))
}

async fn login(app: &Router) -> String {
    let response = send(
        app,
        post_json(
            "/auth/login",
            &json!({"username": "grower", "password": "correct"}),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn session_cookie_has_no_idle_expiry() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);

    let response = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"username": "grower", "password": "correct"}),
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let attributes = set_cookie(&response).to_ascii_lowercase();
    assert!(attributes.contains("httponly"));
    assert!(attributes.contains("samesite=lax"));
    assert!(!attributes.contains("max-age"));
    assert!(!attributes.contains("expires"));
}

#[tokio::test]
async fn guarded_page_without_session_redirects_to_login() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);

    let response = send(&app, get("/agronomist/farms", None)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(client.lookup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn login_page_and_unknown_paths_are_served_without_session() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);

    let login_page = send(&app, get("/login", None)).await;
    let missing = send(&app, get("/greenhouses/7", None)).await;

    assert_eq!(login_page.status(), StatusCode::OK);
    assert!(body_text(login_page).await.contains("data-view=\"login\""));
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_snapshot_routes_agronomist_without_identity_lookup() {
    let client = Arc::new(StubIdentityClient::with_login_user(json!({
        "id": 11,
        "full_name": "Field Agronomist",
        "roles": ["Agronomist"],
    })));
    let app = app(&client);

    let cookie = login(&app).await;

    let page = send(&app, get("/agronomist/farms", Some(&cookie))).await;
    assert_eq!(page.status(), StatusCode::OK);
    let document = body_text(page).await;
    assert!(document.contains("data-layout=\"AgronomistLayout\""));
    assert!(document.contains("data-page=\"farms\""));

    let root = send(&app, get("/", Some(&cookie))).await;
    assert_eq!(location(&root), Some("/agronomist/dashboard"));

    let admin = send(&app, get("/admin/users", Some(&cookie))).await;
    assert_eq!(location(&admin), Some("/login"));

    assert_eq!(client.lookup_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn end_user_route_diverts_admin_resolved_from_identity_endpoint() {
    let client = Arc::new(StubIdentityClient::with_lookups(vec![Ok(json!({
        "id": 2,
        "roles": ["Admin"],
    }))]));
    let app = app(&client);
    let cookie = login(&app).await;

    let response = send(&app, get("/dashboard", Some(&cookie))).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/admin/dashboard"));
    assert_eq!(client.lookup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn navigation_api_reports_decision() {
    let client = Arc::new(StubIdentityClient::with_login_user(json!({
        "roles": ["Support"],
    })));
    let app = app(&client);
    let cookie = login(&app).await;

    let response = send(
        &app,
        get("/api/navigation?path=/analyst/reports", Some(&cookie)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["route"], "page");
    assert_eq!(body["guard"], "analyst");
    assert_eq!(body["result"], "redirect_to_login");
    assert_eq!(body["redirect_to"], "/login");
}

#[tokio::test]
async fn session_api_reports_roles_and_home() {
    let client = Arc::new(StubIdentityClient::with_login_user(json!({
        "roles": ["Support", "Business"],
    })));
    let app = app(&client);
    let cookie = login(&app).await;

    let body = body_json(send(&app, get("/api/session", Some(&cookie))).await).await;

    assert_eq!(body["authenticated"], true);
    assert_eq!(body["home"], "/business/dashboard");
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);

    let response = send(
        &app,
        post_json(
            "/auth/login",
            &json!({"username": "grower", "password": "nope"}),
            None,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cross_origin_login_is_blocked() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);
    let request = Request::post("/auth/login")
        .header(header::ORIGIN, "https://elsewhere.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"username": "grower", "password": "correct"}).to_string(),
        ))
        .unwrap_or_else(|error| panic!("invalid request: {error}"));

    let response = send(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_sends_guarded_pages_back_to_login() {
    let client = Arc::new(StubIdentityClient::with_login_user(json!({
        "roles": ["Developer"],
    })));
    let app = app(&client);
    let cookie = login(&app).await;

    let logout = send(&app, post_json("/auth/logout", &json!({}), Some(&cookie))).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);

    let response = send(&app, get("/developer", Some(&cookie))).await;
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn health_reports_memory_sessions() {
    let client = Arc::new(StubIdentityClient::default());
    let app = app(&client);

    let response = send(&app, get("/health", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sessions"]["status"], "memory");
}

#[tokio::test]
async fn session_api_signs_out_session_without_roles() {
    let client = Arc::new(StubIdentityClient::with_lookups(vec![Ok(json!({
        "id": 5,
        "roles": [],
    }))]));
    let app = app(&client);
    let cookie = login(&app).await;

    let first = body_json(send(&app, get("/api/session", Some(&cookie))).await).await;
    let second = body_json(send(&app, get("/api/session", Some(&cookie))).await).await;

    assert_eq!(first["authenticated"], false);
    assert_eq!(first["roles"], json!([]));
    assert_eq!(second["authenticated"], false);
    assert_eq!(client.lookup_calls.load(Ordering::SeqCst), 1);
}
