use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use spacetix_api::{app, AppState};
use spacetix_core::{
    Booking, BookingRepository, LaunchPad, LaunchRegistry, NewBooking, RegistryError,
    StaticLaunchRegistry, StoreError, StoreResult,
};
use spacetix_store::InMemoryBookingRepository;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const PAD_ID: &str = "4079f070-3e58-4e61-8af7-05c8de8e1fbf";
const DESTINATION_ID: &str = "fbd40165-03c7-47a5-be72-c79f81ebbf67";

/// Registry double that counts how often it was asked.
struct CountingRegistry {
    launches: Option<u64>,
    calls: AtomicUsize,
}

impl CountingRegistry {
    fn new(launches: Option<u64>) -> Arc<Self> {
        Arc::new(Self { launches, calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LaunchRegistry for CountingRegistry {
    async fn count_launches(
        &self,
        _registry_pad_id: &str,
        _day_start: DateTime<Utc>,
        _day_end: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.launches.ok_or(RegistryError::Status(502))
    }
}

/// Registry that answers only after `delay`.
struct SlowRegistry {
    delay: Duration,
}

#[async_trait]
impl LaunchRegistry for SlowRegistry {
    async fn count_launches(
        &self,
        _registry_pad_id: &str,
        _day_start: DateTime<Utc>,
        _day_end: DateTime<Utc>,
    ) -> Result<u64, RegistryError> {
        tokio::time::sleep(self.delay).await;
        Ok(0)
    }
}

/// Repository whose backend is always down.
struct UnavailableRepository;

fn backend_down<T>() -> StoreResult<T> {
    Err(StoreError::Backend("connection reset by peer".to_string()))
}

#[async_trait]
impl BookingRepository for UnavailableRepository {
    async fn list_active(&self) -> StoreResult<Vec<Booking>> {
        backend_down()
    }

    async fn get_by_id(&self, _id: Uuid) -> StoreResult<Booking> {
        backend_down()
    }

    async fn insert(&self, _candidate: NewBooking) -> StoreResult<Booking> {
        backend_down()
    }

    async fn soft_delete(&self, _id: Uuid) -> StoreResult<u64> {
        backend_down()
    }

    async fn get_launch_pad(&self, _id: &str) -> StoreResult<LaunchPad> {
        backend_down()
    }

    async fn has_schedule_entry(&self, _pad: &str, _destination: &str, _weekday: &str) -> StoreResult<bool> {
        backend_down()
    }
}

async fn seeded_repo() -> Arc<InMemoryBookingRepository> {
    let repo = Arc::new(InMemoryBookingRepository::new());
    repo.add_launch_pad(LaunchPad {
        id: PAD_ID.to_string(),
        full_name: "Cape Canaveral".to_string(),
        registry_pad_id: "5e9e4501f509094ba4566f84".to_string(),
    })
    .await;
    repo.add_schedule_entry(PAD_ID, DESTINATION_ID, "Wednesday").await;
    repo
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

fn router(repo: Arc<dyn BookingRepository>, registry: Arc<dyn LaunchRegistry>) -> Router {
    app(AppState::new(repo, registry), REQUEST_TIMEOUT)
}

fn booking_body(birthday: &str, launch_pad_id: &str, launch_date: &str) -> Value {
    json!({
        "first_name": "Ian",
        "last_name": "Thomson",
        "gender": "Male",
        "birthday": birthday,
        "launch_pad_id": launch_pad_id,
        "destination_id": DESTINATION_ID,
        "launch_date": launch_date
    })
}

fn post_booking(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/booking")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

#[tokio::test]
async fn test_create_booking_accepted() {
    let repo = seeded_repo().await;
    let registry = CountingRegistry::new(Some(0));
    let app = router(repo.clone(), registry.clone());

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["id"].as_str().is_some());
    assert_eq!(body["first_name"], "Ian");
    assert_eq!(body["birthday"], "2000-04-12");
    assert_eq!(body["launch_date"], "2022-10-05");
    assert!(body["created_at"].as_str().is_some());
    assert!(body.get("deleted").is_none());
    assert_eq!(registry.calls(), 1);

    let (status, list) = send(&app, request("GET", "/api/v1/bookings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["id"], body["id"]);
}

#[tokio::test]
async fn test_overlap_with_registry_launch_is_rejected() {
    let repo = seeded_repo().await;
    let app = router(repo.clone(), CountingRegistry::new(Some(1)));

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Flight cancelled, overlaps with scheduled launch" }));
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_unscheduled_day_is_rejected() {
    let repo = seeded_repo().await;
    let app = router(repo.clone(), CountingRegistry::new(Some(0)));

    // Thursday, only Wednesday is scheduled
    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-06"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "status": "Flight cancelled, pad does not serve this destination on the requested day" })
    );
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_malformed_birthday_never_reaches_collaborators() {
    let repo = seeded_repo().await;
    let registry = CountingRegistry::new(Some(0));
    let app = router(repo.clone(), registry.clone());

    let (status, body) = send(&app, post_booking(&booking_body("2000/01/02", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
    assert_eq!(registry.calls(), 0);
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_missing_field_is_bad_request() {
    let app = router(seeded_repo().await, CountingRegistry::new(Some(0)));
    let mut body = booking_body("2000-04-12", PAD_ID, "2022-10-05");
    body.as_object_mut().unwrap().remove("destination_id");

    let (status, _) = send(&app, post_booking(&body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_launch_pad_is_internal_error() {
    let repo = seeded_repo().await;
    let registry = CountingRegistry::new(Some(0));
    let app = router(repo.clone(), registry.clone());

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", "no-such-pad", "2022-10-05"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert_eq!(registry.calls(), 0);
}

#[tokio::test]
async fn test_registry_outage_blocks_booking() {
    let repo = seeded_repo().await;
    let app = router(repo.clone(), CountingRegistry::new(None));

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_delete_is_soft_and_idempotent() {
    let repo = seeded_repo().await;
    let app = router(repo.clone(), CountingRegistry::new(Some(0)));

    let (_, created) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/booking/{}", id);

    let (status, body) = send(&app, request("GET", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());

    let (status, body) = send(&app, request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "Record deleted" }));

    let (status, body) = send(&app, request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ID not recognised" }));

    let (_, list) = send(&app, request("GET", "/api/v1/bookings")).await;
    assert_eq!(list, json!([]));

    let (status, _) = send(&app, request("GET", &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // still stored, only flagged
    let rows = repo.all_rows().await;
    assert_eq!(rows.len(), 1);
    assert!(rows[0].deleted);
}

#[tokio::test]
async fn test_delete_unknown_ids() {
    let app = router(seeded_repo().await, Arc::new(StaticLaunchRegistry::empty()));

    let (status, body) = send(&app, request("DELETE", "/api/v1/booking/zero")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ID not recognised" }));

    let uri = format!("/api/v1/booking/{}", uuid::Uuid::new_v4());
    let (status, body) = send(&app, request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ID not recognised" }));
}

#[tokio::test]
async fn test_list_is_empty_initially() {
    let app = router(seeded_repo().await, Arc::new(StaticLaunchRegistry::empty()));

    let (status, body) = send(&app, request("GET", "/api/v1/bookings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_launch_date_without_utc_day_is_bad_request() {
    let repo = seeded_repo().await;
    let registry = CountingRegistry::new(Some(0));
    let app = router(repo.clone(), registry.clone());

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "+262142-12-31"))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());
    assert_eq!(registry.calls(), 0);
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_registry_unavailable_is_internal_error() {
    let repo = seeded_repo().await;
    let app = router(repo.clone(), Arc::new(StaticLaunchRegistry::unavailable()));

    let (status, body) = send(&app, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_slow_registry_times_out_without_booking() {
    let repo = seeded_repo().await;
    let registry = Arc::new(SlowRegistry { delay: Duration::from_secs(30) });
    let impatient = app(AppState::new(repo.clone(), registry), Duration::from_millis(50));

    let (status, _) = send(&impatient, post_booking(&booking_body("2000-04-12", PAD_ID, "2022-10-05"))).await;

    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
    assert!(repo.all_rows().await.is_empty());
}

#[tokio::test]
async fn test_store_failure_hides_details() {
    let app = router(Arc::new(UnavailableRepository), Arc::new(StaticLaunchRegistry::empty()));

    let (status, body) = send(&app, request("GET", "/api/v1/bookings")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));

    let uri = format!("/api/v1/booking/{}", Uuid::new_v4());
    let (status, body) = send(&app, request("DELETE", &uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));

    let (status, _) = send(&app, request("GET", &uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_cors_preflight_lists_served_methods() {
    let app = router(seeded_repo().await, Arc::new(StaticLaunchRegistry::empty()));
    let preflight = Request::builder()
        .method("OPTIONS")
        .uri("/api/v1/booking")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(preflight).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let methods = response
        .headers()
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(methods.contains("DELETE"));
    assert!(methods.contains("POST"));
    assert!(!methods.contains("PUT"));
}
