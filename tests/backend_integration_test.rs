//! Integration tests against a mock backend.
//!
//! A local axum server stands in for the Dynasty Dairy API. Each test drives
//! the public [`Dashboard`] surface and checks both what reached the server
//! and what the stores ended up holding.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use dynasty_admin::model::{FileUpload, ImageSource, ProductInput, VariantInput};
use dynasty_admin::observability::NoOpMetrics;
use dynasty_admin::storage::InMemoryStore;
use dynasty_admin::{ClientConfig, Dashboard, DataOrigin, Error, Filters, Navigator, Status};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock backend
// ============================================================================

#[derive(Clone, Debug)]
struct Hit {
    method: Method,
    path: String,
    authorization: Option<String>,
    content_type: Option<String>,
    body: String,
}

#[derive(Clone, Default)]
struct Backend {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl Backend {
    fn hits_for(&self, method: Method, path: &str) -> Vec<Hit> {
        self.hits
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.method == method && h.path == path)
            .cloned()
            .collect()
    }
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn route(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let path = uri.path().to_string();
    backend.hits.lock().unwrap().push(Hit {
        method: method.clone(),
        path: path.clone(),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body: String::from_utf8_lossy(&body).into_owned(),
    });

    match (method.as_str(), path.as_str()) {
        ("POST", "/api/auth/login") => reply(
            StatusCode::OK,
            json!({
                "success": true,
                "data": {
                    "token": "tok-xyz",
                    "user": {"_id": "u1", "name": "Owner", "email": "owner@dynastydairy.in"}
                }
            }),
        ),
        ("POST", "/api/auth/logout") => {
            reply(StatusCode::UNAUTHORIZED, json!({"message": "token revoked"}))
        }
        ("GET", "/api/customers") => reply(
            StatusCode::OK,
            json!({
                "success": true,
                "data": {
                    "customers": [
                        {"_id": "C1", "firstName": "Asha", "lastName": "Verma", "status": "Active"},
                        {"_id": "C2", "name": "Rahul Menon", "status": "inactive", "totalOrders": "17"}
                    ],
                    "pagination": {"total": 41}
                }
            }),
        ),
        ("PATCH", "/api/customers/C1/status") => reply(StatusCode::OK, json!({"success": true})),
        ("GET", "/api/delivery-staff") => reply(
            StatusCode::OK,
            json!([
                {"_id": "S1", "name": "Ravi Kumar", "status": "Active", "photo": "/uploads/ravi.jpg"}
            ]),
        ),
        ("PATCH", "/api/delivery-staff/S1/status") => reply(
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"message": "maintenance window"}),
        ),
        ("GET", "/api/orders") => {
            reply(StatusCode::UNAUTHORIZED, json!({"message": "jwt expired"}))
        }
        ("GET", "/api/products") => {
            reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"message": "db down"}))
        }
        ("POST", "/api/products") => reply(
            StatusCode::CREATED,
            json!({"success": true, "message": "Product created"}),
        ),
        ("GET", p) if p.starts_with("/api/reports/") => {
            reply(StatusCode::BAD_GATEWAY, json!({"error": "reporting offline"}))
        }
        _ => reply(StatusCode::NOT_FOUND, json!({"message": "no such route"})),
    }
}

async fn start_backend() -> (Backend, String) {
    let backend = Backend::default();
    let app = Router::new().fallback(route).with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (backend, format!("http://{}", addr))
}

#[derive(Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}

async fn connect() -> (Backend, Dashboard) {
    let _ = env_logger::builder().is_test(true).try_init();
    let (backend, origin) = start_backend().await;
    let config = ClientConfig::new(origin).with_timeout(Duration::from_secs(5));
    let dashboard = Dashboard::with_storage(
        config,
        Arc::new(InMemoryStore::new()),
        Arc::new(NoOpMetrics),
    )
    .unwrap();
    (backend, dashboard)
}

// ============================================================================
// Tests
// ============================================================================

/// Signing in persists the token and every later call carries it.
#[tokio::test]
async fn test_login_attaches_bearer_token() {
    let (backend, dashboard) = connect().await;

    let user = dashboard.login("owner@dynastydairy.in", "secret").await.unwrap();
    assert_eq!(user.id, "u1");
    assert!(dashboard.is_authenticated());

    dashboard.customers.refetch().await;

    let hits = backend.hits_for(Method::GET, "/api/customers");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer tok-xyz"));
    assert_eq!(hits[0].content_type.as_deref(), Some("application/json"));
}

/// Wrapped list responses are unwrapped, names composed and totals kept.
#[tokio::test]
async fn test_enveloped_list_is_decoded() {
    let (_backend, dashboard) = connect().await;

    let state = dashboard.customers.refetch().await;

    assert!(state.error.is_none());
    assert_eq!(state.origin, DataOrigin::Remote);
    assert_eq!(state.total, 41);
    assert_eq!(state.items[0].name, "Asha Verma");
    assert_eq!(state.items[1].total_orders, 17);
    assert_eq!(state.items[1].status, Status::Inactive);
}

/// Status writes use the resource's casing; a failed write rolls back.
#[tokio::test]
async fn test_status_casing_and_rollback() {
    let (backend, dashboard) = connect().await;
    dashboard.customers.refetch().await;
    dashboard.delivery_staff.refetch().await;

    let next = dashboard
        .customers
        .toggle_status(&"C1".to_string())
        .await
        .unwrap();
    assert_eq!(next, Status::Inactive);
    let hit = &backend.hits_for(Method::PATCH, "/api/customers/C1/status")[0];
    assert_eq!(serde_json::from_str::<Value>(&hit.body).unwrap(), json!({"status": "inactive"}));

    let err = dashboard
        .delivery_staff
        .toggle_status(&"S1".to_string())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
    let hit = &backend.hits_for(Method::PATCH, "/api/delivery-staff/S1/status")[0];
    assert_eq!(serde_json::from_str::<Value>(&hit.body).unwrap(), json!({"status": "Inactive"}));

    let staff = dashboard.delivery_staff.find(&"S1".to_string()).await.unwrap();
    assert_eq!(staff.status, Status::Active);
    assert!(staff.avatar.unwrap().ends_with("/uploads/ravi.jpg"));
    let state = dashboard.delivery_staff.snapshot().await;
    assert_eq!(state.error.as_deref(), Some("HTTP 503: maintenance window"));
}

/// A 401 clears the session through the guard and redirects to login.
#[tokio::test]
async fn test_unauthorized_ends_session() {
    let (_backend, dashboard) = connect().await;
    let navigator = Arc::new(RecordingNavigator::default());
    let _guard = dashboard.guard_session(navigator.clone());

    dashboard.login("owner@dynastydairy.in", "secret").await.unwrap();
    let state = dashboard.orders.refetch().await;

    // Reads still fall back to local data.
    assert_eq!(state.origin, DataOrigin::Fallback);
    assert!(!state.items.is_empty());
    assert_eq!(state.error.as_deref(), Some("Unauthenticated: jwt expired"));

    for _ in 0..50 {
        if !navigator.visits.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(*navigator.visits.lock().unwrap(), vec!["/login".to_string()]);
    assert!(!dashboard.is_authenticated());
    assert!(dashboard.current_user().is_none());
}

/// Without an explicit guard a 401 still clears the persisted session.
#[tokio::test]
async fn test_unauthorized_clears_session_without_guard() {
    let (_backend, dashboard) = connect().await;

    dashboard.login("owner@dynastydairy.in", "secret").await.unwrap();
    assert!(dashboard.is_authenticated());
    dashboard.orders.refetch().await;

    for _ in 0..50 {
        if !dashboard.is_authenticated() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(!dashboard.is_authenticated());
    assert!(dashboard.current_user().is_none());
}

/// Logging out against an already-expired session redirects exactly once.
#[tokio::test]
async fn test_logout_with_expired_token_redirects_once() {
    let (backend, dashboard) = connect().await;
    let navigator = Arc::new(RecordingNavigator::default());
    let _guard = dashboard.guard_session(navigator.clone());

    dashboard.login("owner@dynastydairy.in", "secret").await.unwrap();
    dashboard.logout().await;

    assert_eq!(backend.hits_for(Method::POST, "/api/auth/logout").len(), 1);
    assert!(!dashboard.is_authenticated());

    for _ in 0..50 {
        if !navigator.visits.lock().unwrap().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Give a second event time to arrive if one was sent.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(*navigator.visits.lock().unwrap(), vec!["/login".to_string()]);
}

/// Server errors on reads serve local data and keep the message.
#[tokio::test]
async fn test_failed_read_serves_fallback() {
    let (_backend, dashboard) = connect().await;

    let state = dashboard
        .products
        .set_filters(Filters::new().with("category", "all"))
        .await;

    assert_eq!(state.origin, DataOrigin::Fallback);
    assert_eq!(state.items.len(), dynasty_admin::seed::products().len());
    assert_eq!(state.error.as_deref(), Some("HTTP 500: db down"));

    let (overview, origin) = dashboard.overview(&Filters::new()).await;
    assert_eq!(origin, DataOrigin::Fallback);
    assert_eq!(overview, dynasty_admin::seed::overview_report());
}

/// Product writes go out as multipart with the agreed field names.
#[tokio::test]
async fn test_product_create_is_multipart() {
    let (backend, dashboard) = connect().await;

    let mut input = ProductInput::new("Malai Paneer", 95.0);
    input.unit = "200 g".to_string();
    input.image = Some(ImageSource::File(FileUpload::new(
        "paneer.jpg",
        "image/jpeg",
        vec![0xff, 0xd8, 0xff],
    )));
    input.variants.push(VariantInput {
        label: "Family pack".to_string(),
        value: 1.0,
        unit: "kg".to_string(),
        price: 420.0,
        stock: 12,
        image: Some(ImageSource::File(FileUpload::new(
            "family.png",
            "image/png",
            vec![0x89, 0x50],
        ))),
    });

    let created = dashboard.products.create(&input).await.unwrap();
    assert!(created.is_none());

    let hit = &backend.hits_for(Method::POST, "/api/products")[0];
    let content_type = hit.content_type.as_deref().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    assert!(hit.body.contains("name=\"dishName\""));
    assert!(hit.body.contains("Malai Paneer"));
    assert!(hit.body.contains("name=\"image\"; filename=\"paneer.jpg\""));
    assert!(hit.body.contains("name=\"variantImage_0\"; filename=\"family.png\""));
    assert!(hit.body.contains("\"image\":\"variantImage_0\""));
}

/// Validation failures never reach the backend.
#[tokio::test]
async fn test_invalid_product_is_rejected_locally() {
    let (backend, dashboard) = connect().await;

    let err = dashboard
        .products
        .create(&ProductInput::new("  ", 10.0))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(backend.hits_for(Method::POST, "/api/products").is_empty());
}
