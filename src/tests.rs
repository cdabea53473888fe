//! Integration tests for the ACM client against an in-process mock backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use chrono::NaiveDate;
use jsonwebtoken::{EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::auth::{AccessDecision, AuthState, Role};
use crate::cache::{QueryKey, QueryResult};
use crate::config::Config;
use crate::errors::ClientError;
use crate::models::{
    AiQaRequest, AiSuggestionParams, DateRangeParams, DocumentRequest, ExpenseListParams,
    ExpenseRequest, FarmCreateRequest, FarmListParams, FieldLogListParams, FieldLogRequest,
    HarvestRequest, Incident, IncidentCreateRequest, ListParams, OnHandParams, Page,
    PlotRequest, ReportListParams, ReportRequest, ResourceKind, SeasonCreateRequest,
    SeasonListParams, SeasonQuery, SeasonStatus, StockMovementRequest, SuggestionPriority, Task,
    TaskListParams, TaskRequest, VarietyRequest,
};
use crate::AcmClient;

const PASSWORD: &str = "correct-horse";

#[derive(Serialize)]
struct MockClaims {
    sub: String,
    user_id: i64,
    exp: i64,
}

/// Mutable state of the mock backend.
#[derive(Default)]
struct Backend {
    farms: Vec<Value>,
    plots: Vec<Value>,
    /// Every other resource, by collection path segment (`tasks`, `field-logs`, ...).
    records: HashMap<String, Vec<Value>>,
    on_hand: HashMap<i64, f64>,
    next_id: i64,
    valid_token: Option<String>,
    token_version: u32,
}

#[derive(Clone, Default)]
struct MockState {
    backend: Arc<Mutex<Backend>>,
    requests: Arc<AtomicUsize>,
    refresh_calls: Arc<AtomicUsize>,
    fail_refresh: Arc<AtomicBool>,
    fail_deletes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
}

impl MockState {
    fn seeded() -> Self {
        let state = MockState::default();
        {
            let mut backend = state.backend.lock().unwrap();
            backend.farms = (1..=3)
                .map(|id| json!({"id": id, "name": format!("Farm {}", id), "active": true}))
                .collect();
            backend.plots = vec![json!({"id": 10, "plotName": "North", "farmId": 1})];
            backend.records.insert(
                "seasons".to_string(),
                vec![json!({
                    "id": 4,
                    "plotId": 10,
                    "cropId": 2,
                    "seasonName": "Spring rice",
                    "startDate": "2024-03-01",
                    "status": "ACTIVE"
                })],
            );
            backend.on_hand.insert(5, 40.0);
            backend.next_id = 100;
        }
        state
    }

    /// Count the request and check its bearer token.
    fn check(&self, headers: &HeaderMap) -> Result<(), Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let presented = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        let backend = self.backend.lock().unwrap();
        match (&backend.valid_token, presented) {
            (Some(valid), Some(presented)) if *valid == presented => Ok(()),
            _ => Err(error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Token expired")),
        }
    }
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({"code": code, "message": message}))).into_response()
}

fn envelope(result: Value) -> Response {
    Json(json!({"status": 200, "code": 1000, "message": "OK", "result": result})).into_response()
}

fn paginate(items: &[Value], params: &HashMap<String, String>) -> (Vec<Value>, u32, u32, u64, u32) {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let size: u32 = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(20);
    let slice = items
        .iter()
        .skip((page * size) as usize)
        .take(size as usize)
        .cloned()
        .collect();
    let total = items.len() as u64;
    (slice, page, size, total, total.div_ceil(size as u64) as u32)
}

fn issue_token(user_id: i64, username: &str, version: u32) -> String {
    let claims = MockClaims {
        sub: format!("{}-{}", username, version),
        user_id,
        exp: chrono::Utc::now().timestamp() + 3600,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"mock-secret"),
    )
    .unwrap()
}

// ==================== MOCK HANDLERS ====================

async fn sign_in(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if body["password"] != PASSWORD {
        return envelope(json!({
            "token": "none",
            "authenticated": false,
            "username": username,
            "roles": ["FARMER"]
        }));
    }

    let (user_id, role) = if username == "admin" { (1, "ADMIN") } else { (7, "FARMER") };
    let mut backend = state.backend.lock().unwrap();
    backend.token_version += 1;
    let token = issue_token(user_id, &username, backend.token_version);
    backend.valid_token = Some(token.clone());

    envelope(json!({
        "token": token,
        "authenticated": true,
        "username": username,
        "roles": [role]
    }))
}

async fn refresh(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(100)).await;

    if state.fail_refresh.load(Ordering::SeqCst) || body["token"].as_str().is_none() {
        return error(StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", "Refresh token invalid");
    }

    let mut backend = state.backend.lock().unwrap();
    backend.token_version += 1;
    let token = issue_token(7, "farmer", backend.token_version);
    backend.valid_token = Some(token.clone());

    Json(json!({"token": token, "refreshToken": token, "expiresIn": 3600})).into_response()
}

async fn sign_out(State(state): State<MockState>) -> StatusCode {
    state.requests.fetch_add(1, Ordering::SeqCst);
    StatusCode::OK
}

async fn list_farms(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    if state.fail_reads.load(Ordering::SeqCst) {
        return error(StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE", "Try again later");
    }

    let backend = state.backend.lock().unwrap();
    let (items, page, size, total, pages) = paginate(&backend.farms, &params);
    envelope(json!({
        "items": items,
        "page": page,
        "size": size,
        "totalElements": total,
        "totalPages": pages
    }))
}

async fn create_farm(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_millis(150)).await;

    let mut backend = state.backend.lock().unwrap();
    backend.next_id += 1;
    let farm = json!({"id": backend.next_id, "name": body["name"], "active": true});
    backend.farms.insert(0, farm.clone());
    (StatusCode::CREATED, Json(farm)).into_response()
}

async fn get_farm(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    let backend = state.backend.lock().unwrap();
    match backend.farms.iter().find(|f| f["id"] == id) {
        // Detail responses come back without the envelope.
        Some(farm) => Json(farm.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "FARM_NOT_FOUND", "Farm not found"),
    }
}

async fn delete_farm(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_millis(150)).await;
    if state.fail_deletes.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", "Database unavailable");
    }
    state
        .backend
        .lock()
        .unwrap()
        .farms
        .retain(|f| f["id"] != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn list_farm_plots(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(farm_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    let backend = state.backend.lock().unwrap();
    let plots: Vec<Value> = backend
        .plots
        .iter()
        .filter(|p| p["farmId"] == farm_id)
        .cloned()
        .collect();
    let (items, page, size, total, pages) = paginate(&plots, &params);
    // Spring-style page field names.
    envelope(json!({
        "content": items,
        "number": page,
        "size": size,
        "totalElements": total,
        "totalPages": pages
    }))
}

async fn create_farm_plot(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(farm_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    tokio::time::sleep(Duration::from_millis(150)).await;

    let mut backend = state.backend.lock().unwrap();
    backend.next_id += 1;
    let plot = json!({
        "id": backend.next_id,
        "plotName": body["plotName"],
        "area": body["area"],
        "farmId": farm_id
    });
    backend.plots.push(plot.clone());
    envelope(plot)
}

/// Store a new record under the next id.
fn insert_record(state: &MockState, collection: &str, mut record: Value) -> Value {
    let mut backend = state.backend.lock().unwrap();
    backend.next_id += 1;
    record["id"] = json!(backend.next_id);
    backend
        .records
        .entry(collection.to_string())
        .or_default()
        .push(record.clone());
    record
}

/// List a collection, optionally filtered by a parent field. Without paging parameters
/// the records come back as a plain array.
fn list_records(
    state: &MockState,
    headers: &HeaderMap,
    collection: &str,
    parent: Option<(&str, i64)>,
    paging: Option<&HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(headers) {
        return response;
    }
    let backend = state.backend.lock().unwrap();
    let records: Vec<Value> = backend
        .records
        .get(collection)
        .into_iter()
        .flatten()
        .filter(|r| parent.map_or(true, |(field, id)| r[field] == id))
        .cloned()
        .collect();

    match paging {
        Some(params) => {
            let (items, page, size, total, pages) = paginate(&records, params);
            envelope(json!({
                "items": items,
                "page": page,
                "size": size,
                "totalElements": total,
                "totalPages": pages
            }))
        }
        None => envelope(json!(records)),
    }
}

async fn create_record(
    state: &MockState,
    headers: &HeaderMap,
    collection: &str,
    mut body: Value,
    parent: Option<(&str, i64)>,
) -> Result<Value, Response> {
    state.check(headers)?;
    tokio::time::sleep(Duration::from_millis(150)).await;
    if let Some((field, id)) = parent {
        body[field] = json!(id);
    }
    Ok(insert_record(state, collection, body))
}

fn created(result: Result<Value, Response>) -> Response {
    result.map_or_else(|response| response, envelope)
}

/// GET `/<collection>/{id}`, answered bare like the farm detail.
fn record_detail(collection: &'static str) -> MethodRouter<MockState> {
    get(
        move |State(state): State<MockState>, headers: HeaderMap, Path(id): Path<i64>| async move {
            if let Err(response) = state.check(&headers) {
                return response;
            }
            let backend = state.backend.lock().unwrap();
            match backend
                .records
                .get(collection)
                .and_then(|records| records.iter().find(|r| r["id"] == id))
            {
                Some(record) => Json(record.clone()).into_response(),
                None => error(StatusCode::NOT_FOUND, "NOT_FOUND", "Record not found"),
            }
        },
    )
}

async fn list_seasons(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    list_records(&state, &headers, "seasons", None, Some(&params))
}

async fn create_season(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    body["status"] = json!("PLANNED");
    match create_record(&state, &headers, "seasons", body, None).await {
        Ok(season) => (StatusCode::CREATED, Json(season)).into_response(),
        Err(response) => response,
    }
}

async fn list_season_records(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((season_id, collection)): Path<(i64, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    // Incidents are the one season list that is not paginated.
    let paging = (collection != "incidents").then_some(&params);
    list_records(
        &state,
        &headers,
        &collection,
        Some(("seasonId", season_id)),
        paging,
    )
}

async fn create_season_record(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path((season_id, collection)): Path<(i64, String)>,
    Json(mut body): Json<Value>,
) -> Response {
    match collection.as_str() {
        "incidents" => body["status"] = json!("OPEN"),
        "expenses" => {
            let total = body["unitPrice"].as_f64().unwrap_or_default()
                * body["quantity"].as_f64().unwrap_or_default();
            body["totalCost"] = json!(total);
        }
        _ => {}
    }
    let parent = Some(("seasonId", season_id));
    created(create_record(&state, &headers, &collection, body, parent).await)
}

async fn list_reports(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    list_records(&state, &headers, "reports", None, Some(&params))
}

async fn create_report(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    created(create_record(&state, &headers, "reports", body, None).await)
}

async fn list_crop_varieties(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(crop_id): Path<i64>,
) -> Response {
    list_records(&state, &headers, "varieties", Some(("cropId", crop_id)), None)
}

async fn create_variety(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    created(create_record(&state, &headers, "varieties", body, None).await)
}

async fn list_documents(State(state): State<MockState>, headers: HeaderMap) -> Response {
    list_records(&state, &headers, "documents", None, None)
}

async fn create_document(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    created(create_record(&state, &headers, "documents", body, None).await)
}

async fn record_movement(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    let lot = body["supplyLotId"].as_i64().unwrap_or_default();
    let quantity = body["quantity"].as_f64().unwrap_or_default();
    let delta = if body["movementType"] == "OUT" { -quantity } else { quantity };
    *state.backend.lock().unwrap().on_hand.entry(lot).or_default() += delta;
    envelope(insert_record(&state, "movements", body))
}

async fn lot_on_hand(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(lot): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    if !params.contains_key("warehouseId") {
        return error(StatusCode::BAD_REQUEST, "BAD_REQUEST", "warehouseId is required");
    }
    let quantity = state
        .backend
        .lock()
        .unwrap()
        .on_hand
        .get(&lot)
        .copied()
        .unwrap_or_default();
    envelope(json!(quantity))
}

fn season_param(params: &HashMap<String, String>) -> i64 {
    params
        .get("seasonId")
        .and_then(|id| id.parse().ok())
        .unwrap_or_default()
}

async fn ai_suggestions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    envelope(json!([{
        "category": "IRRIGATION",
        "title": "Water early",
        "description": format!("Season {} is dry this week", season_param(&params)),
        "priority": "HIGH",
        "actionable": true
    }]))
}

async fn predict_yield(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    envelope(json!({
        "seasonId": season_param(&params),
        "predictedYieldKg": 5400.0,
        "confidencePercent": 82.5
    }))
}

async fn optimize_cost(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    envelope(json!({
        "seasonId": season_param(&params),
        "currentCost": 1200.0,
        "suggestedSavings": 150.0,
        "recommendations": [
            {
                "category": "FERTILIZER",
                "description": "Split applications",
                "potentialSavings": 150.0
            }
        ]
    }))
}

async fn ask(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = state.check(&headers) {
        return response;
    }
    let question = params.get("question").cloned().unwrap_or_default();
    Json(json!({"answer": format!("About \"{}\": early morning.", question), "confidence": 0.7}))
        .into_response()
}

fn mock_router(state: MockState) -> Router {
    let api = Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/refresh", post(refresh))
        .route("/auth/sign-out", post(sign_out))
        .route("/farms", get(list_farms).post(create_farm))
        .route("/farms/{id}", get(get_farm).delete(delete_farm))
        .route("/farms/{id}/plots", get(list_farm_plots).post(create_farm_plot))
        .route("/seasons", get(list_seasons).post(create_season))
        .route("/seasons/{id}", record_detail("seasons"))
        .route(
            "/seasons/{id}/{collection}",
            get(list_season_records).post(create_season_record),
        )
        .route("/tasks/{id}", record_detail("tasks"))
        .route("/harvests/{id}", record_detail("harvests"))
        .route("/expenses/{id}", record_detail("expenses"))
        .route("/field-logs/{id}", record_detail("field-logs"))
        .route("/reports", get(list_reports))
        .route("/reports/{id}", record_detail("reports"))
        .route("/admin/reports", post(create_report))
        .route("/varieties", post(create_variety))
        .route("/varieties/{id}", record_detail("varieties"))
        .route("/varieties/by-crop/{crop_id}", get(list_crop_varieties))
        .route("/documents", get(list_documents))
        .route("/admin/documents", post(create_document))
        .route("/inventory/movements", post(record_movement))
        .route("/inventory/lots/{lot}/on-hand", get(lot_on_hand))
        .route("/farmer/ai/suggestions", get(ai_suggestions))
        .route("/farmer/ai/predict-yield", get(predict_yield))
        .route("/farmer/ai/optimize-cost", get(optimize_cost))
        .route("/ai/qa", get(ask));

    Router::new().nest("/api/v1", api).with_state(state)
}

/// Test fixture for integration tests.
struct TestFixture {
    client: AcmClient,
    config: Config,
    state: MockState,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let state = MockState::seeded();
        let app = mock_router(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = Config {
            api_base_url: format!("http://{}", addr),
            request_timeout: Duration::from_secs(5),
            session_path: temp_dir.path().join("session.json"),
            log_level: "warn".to_string(),
        };
        let client = AcmClient::from_config(&config)
            .await
            .expect("Failed to build client");

        TestFixture {
            client,
            config,
            state,
            _temp_dir: temp_dir,
        }
    }

    async fn signed_in() -> Self {
        let fixture = Self::new().await;
        fixture
            .client
            .sign_in("farmer", PASSWORD)
            .await
            .expect("Sign-in failed");
        fixture
    }

    async fn admin() -> Self {
        let fixture = Self::new().await;
        fixture
            .client
            .sign_in("admin", PASSWORD)
            .await
            .expect("Sign-in failed");
        fixture
    }

    /// Make the backend reject the token the client currently holds.
    fn expire_token(&self) {
        self.state.backend.lock().unwrap().valid_token = Some("rotated".to_string());
    }

    fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

fn guide() -> DocumentRequest {
    DocumentRequest {
        title: "Guide".to_string(),
        content: None,
    }
}

fn march(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn farm_ids(page: &Page<Value>) -> Vec<i64> {
    page.items.iter().filter_map(|f| f["id"].as_i64()).collect()
}

// ==================== SESSION TESTS ====================

#[tokio::test]
async fn test_sign_in_persists_session() {
    let fixture = TestFixture::signed_in().await;

    let user = fixture.client.current_user().await.unwrap();
    assert_eq!(user.username, "farmer");
    assert_eq!(user.role, Role::Farmer);
    assert_eq!(user.id, Some(7));
    assert!(fixture.config.session_path.exists());

    // A new client picks the session up from disk.
    let restored = AcmClient::from_config(&fixture.config).await.unwrap();
    assert_eq!(restored.current_user().await, Some(user));
    assert_eq!(
        restored.authorize(&[Role::Farmer]).await,
        AccessDecision::Allow
    );
    assert_eq!(
        restored.authorize(&[Role::Admin]).await.redirect(),
        Some("/farmer/dashboard".to_string())
    );
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let fixture = TestFixture::new().await;
    let result = fixture.client.sign_in("farmer", "wrong").await;
    assert!(matches!(result, Err(ClientError::Auth(_))));
    assert!(fixture.client.current_user().await.is_none());
    assert!(!fixture.config.session_path.exists());
}

#[tokio::test]
async fn test_sign_out_clears_session_and_cache() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    repo.list_farms(&FarmListParams::default())
        .await
        .into_result()
        .unwrap();

    fixture.client.sign_out().await.unwrap();

    assert!(fixture.client.current_user().await.is_none());
    assert!(!fixture.config.session_path.exists());
    assert!(repo.cache().store().read().await.is_empty());
    assert_eq!(*fixture.client.subscribe().borrow(), AuthState::SignedOut);
}

#[tokio::test]
async fn test_concurrent_rejections_refresh_once() {
    let fixture = TestFixture::signed_in().await;
    fixture.expire_token();

    let mut tasks = tokio::task::JoinSet::new();
    for id in 1..=3 {
        let client = fixture.client.clone();
        tasks.spawn(async move { client.repo().get_farm(id).await.into_result().map(|_| ()) });
    }
    for _ in 0..2 {
        let client = fixture.client.clone();
        tasks.spawn(async move {
            client
                .repo()
                .list_farms(&FarmListParams::default())
                .await
                .into_result()
                .map(|_| ())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.unwrap().unwrap();
    }

    assert_eq!(fixture.state.refresh_calls.load(Ordering::SeqCst), 1);
    assert!(fixture.client.current_user().await.is_some());
}

#[tokio::test]
async fn test_failed_refresh_requires_sign_in() {
    let fixture = TestFixture::signed_in().await;
    let mut states = fixture.client.subscribe();
    fixture.state.fail_refresh.store(true, Ordering::SeqCst);
    fixture.expire_token();

    let result = fixture.client.repo().get_farm(1).await;

    assert!(matches!(result.error(), Some(ClientError::Auth(_))));
    assert!(fixture.client.current_user().await.is_none());
    assert!(!fixture.config.session_path.exists());
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), AuthState::SignInRequired);
}

// ==================== READ TESTS ====================

#[tokio::test]
async fn test_enveloped_list_and_bare_detail() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();

    let page = repo
        .list_farms(&FarmListParams::default())
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total_pages, 1);

    let farm = repo.get_farm(2).await.into_result().unwrap();
    assert_eq!(farm.farm.name, "Farm 2");
}

#[tokio::test]
async fn test_spring_page_fields_accepted() {
    let fixture = TestFixture::signed_in().await;
    let page = fixture
        .client
        .repo()
        .list_farm_plots(1, &ListParams::default())
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.items[0].plot_name, "North");
    assert_eq!(page.total_elements, 1);
}

#[tokio::test]
async fn test_fresh_reads_served_from_cache() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();

    let first = repo.list_farms(&FarmListParams::default()).await;
    let before = fixture.requests();
    let second = repo.list_farms(&FarmListParams::default()).await;

    assert!(matches!(first, QueryResult::Fresh(_)));
    assert!(second.is_cached());
    assert_eq!(fixture.requests(), before);
}

#[tokio::test]
async fn test_missing_farm_is_not_found() {
    let fixture = TestFixture::signed_in().await;
    let result = fixture.client.repo().get_farm(99).await;
    match result {
        QueryResult::Failed { error, last_known } => {
            assert!(matches!(error, ClientError::NotFound(ref m) if m.contains("FARM_NOT_FOUND")));
            assert!(last_known.is_none());
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_refetch_keeps_last_known_data() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    repo.list_farms(&FarmListParams::default())
        .await
        .into_result()
        .unwrap();

    repo.cache().invalidate(&QueryKey::all(ResourceKind::Farm)).await;
    fixture.state.fail_reads.store(true, Ordering::SeqCst);

    let result = repo.list_farms(&FarmListParams::default()).await;
    assert!(matches!(
        result.error(),
        Some(ClientError::Network {
            status: Some(503),
            ..
        })
    ));
    assert_eq!(result.data().unwrap().items.len(), 3);
}

// ==================== MUTATION TESTS ====================

#[tokio::test]
async fn test_create_shows_placeholder_then_server_record() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo().clone();
    let params = FarmListParams::default();
    repo.list_farms(&params).await.into_result().unwrap();
    let key = QueryKey::list(ResourceKind::Farm, &params).unwrap();

    let creating = {
        let repo = repo.clone();
        tokio::spawn(async move {
            repo.create_farm(&FarmCreateRequest {
                name: "New".to_string(),
                province_id: 1,
                ward_id: 2,
                area: None,
            })
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let speculative: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(speculative.items.len(), 4);
    assert_eq!(speculative.items[0]["name"], "New");
    let placeholder = speculative.items[0]["id"].as_i64().unwrap();
    assert!(placeholder > 1_000_000_000_000);

    let created = creating.await.unwrap().unwrap();
    assert_eq!(created.farm.id, 101);

    let page = repo.list_farms(&params).await;
    assert!(matches!(page, QueryResult::Fresh(_)));
    let page = page.into_result().unwrap();
    assert_eq!(page.items[0].id, 101);
    assert!(page.items.iter().all(|f| f.id != placeholder));
}

#[tokio::test]
async fn test_failed_delete_rolls_back() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo().clone();
    let params = FarmListParams::default();
    repo.list_farms(&params).await.into_result().unwrap();
    let key = QueryKey::list(ResourceKind::Farm, &params).unwrap();
    let before: Page<Value> = repo.cache().peek(&key).await.unwrap();

    fixture.state.fail_deletes.store(true, Ordering::SeqCst);
    let deleting = {
        let repo = repo.clone();
        tokio::spawn(async move { repo.delete_farm(2).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let speculative: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(farm_ids(&speculative), vec![1, 3]);
    assert_eq!(speculative.total_elements, 2);

    let result = deleting.await.unwrap();
    assert!(matches!(
        result,
        Err(ClientError::Network {
            status: Some(500),
            ..
        })
    ));
    let after: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(farm_ids(&after), vec![1, 2, 3]);
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_delete_removes_from_lists() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = FarmListParams::default();
    repo.list_farms(&params).await.into_result().unwrap();

    repo.delete_farm(2).await.unwrap();

    let page = repo.list_farms(&params).await.into_result().unwrap();
    assert_eq!(page.items.iter().map(|f| f.id).collect::<Vec<_>>(), vec![1, 3]);
}

#[tokio::test]
async fn test_invalid_create_sends_nothing() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = FarmListParams::default();
    repo.list_farms(&params).await.into_result().unwrap();
    let key = QueryKey::list(ResourceKind::Farm, &params).unwrap();
    let before = fixture.requests();

    let result = repo
        .create_farm(&FarmCreateRequest {
            name: String::new(),
            province_id: 1,
            ward_id: 1,
            area: None,
        })
        .await;

    assert!(matches!(result, Err(ClientError::Validation(_))));
    assert_eq!(fixture.requests(), before);
    let page: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(page.items.len(), 3);
}

#[tokio::test]
async fn test_scoped_plot_create_then_list() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo().clone();
    let params = ListParams::default();
    let empty = repo.list_farm_plots(2, &params).await.into_result().unwrap();
    assert!(empty.items.is_empty());
    let key = QueryKey::scoped_list(ResourceKind::Plot, ResourceKind::Farm, 2, &params).unwrap();

    let creating = {
        let repo = repo.clone();
        tokio::spawn(async move {
            let request = PlotRequest {
                area: Some(2.5),
                ..PlotRequest::named("North Field")
            };
            repo.create_farm_plot(2, &request).await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let speculative: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(speculative.items.len(), 1);
    assert_eq!(speculative.items[0]["plotName"], "North Field");
    assert_eq!(speculative.items[0]["area"], 2.5);
    assert_eq!(speculative.items[0]["farmId"], 2);
    let placeholder = speculative.items[0]["id"].as_i64().unwrap();

    let plot = creating.await.unwrap().unwrap();
    assert_eq!(plot.farm_id, Some(2));

    let page = repo.list_farm_plots(2, &params).await.into_result().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, plot.id);
    assert_ne!(page.items[0].id, placeholder);
    assert_eq!(page.items[0].plot_name, "North Field");
}

#[tokio::test]
async fn test_admin_writes_rejected_for_farmer() {
    let fixture = TestFixture::signed_in().await;
    let before = fixture.requests();

    let result = fixture
        .client
        .repo()
        .create_document(&guide())
        .await;

    assert!(matches!(result, Err(ClientError::Forbidden(_))));
    assert_eq!(fixture.requests(), before);
}

#[tokio::test]
async fn test_admin_writes_allowed_for_admin() {
    let fixture = TestFixture::new().await;
    fixture.client.sign_in("admin", PASSWORD).await.unwrap();

    let document = fixture
        .client
        .repo()
        .create_document(&guide())
        .await
        .unwrap();
    assert_eq!(document.title, "Guide");
}

// ==================== SEASON TESTS ====================

#[tokio::test]
async fn test_season_create_then_get() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = SeasonListParams::default();
    let before = repo.list_seasons(&params).await.into_result().unwrap();
    assert_eq!(before.items.len(), 1);

    let created = repo
        .create_season(&SeasonCreateRequest {
            plot_id: 10,
            crop_id: 2,
            variety_id: None,
            season_name: "Summer maize".to_string(),
            start_date: march(15),
            planned_harvest_date: None,
            end_date: None,
            initial_plant_count: 500,
            expected_yield_kg: None,
            notes: None,
        })
        .await
        .unwrap();
    assert_eq!(created.season.id, 101);
    assert_eq!(created.season.status, Some(SeasonStatus::Planned));

    let page = repo.list_seasons(&params).await.into_result().unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().any(|s| s.id == 101));

    let season = repo.get_season(101).await.into_result().unwrap();
    assert_eq!(season.season.season_name, "Summer maize");
    assert_eq!(season.season.start_date, "2024-03-15");
}

#[tokio::test]
async fn test_task_placeholder_then_server_record() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo().clone();
    let params = TaskListParams::default();
    let empty = repo.list_tasks(4, &params).await.into_result().unwrap();
    assert!(empty.items.is_empty());
    let key = QueryKey::scoped_lists(ResourceKind::Task, ResourceKind::Season, 4)
        .with_params(&params)
        .unwrap();

    let creating = {
        let repo = repo.clone();
        tokio::spawn(async move {
            let request = TaskRequest {
                title: "Weeding".to_string(),
                description: None,
                planned_date: march(2),
                due_date: march(5),
            };
            repo.create_task(4, &request).await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let speculative: Page<Value> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(speculative.items.len(), 1);
    assert_eq!(speculative.items[0]["title"], "Weeding");
    assert_eq!(speculative.items[0]["seasonId"], 4);
    let placeholder: Task = serde_json::from_value(speculative.items[0].clone()).unwrap();

    let task = creating.await.unwrap().unwrap();
    assert_eq!(task.season_id, Some(4));
    assert_ne!(task.id, placeholder.id);

    let page = repo.list_tasks(4, &params).await.into_result().unwrap();
    assert_eq!(page.items, vec![task.clone()]);
    let fetched = repo.get_task(task.id).await.into_result().unwrap();
    assert_eq!(fetched.title, "Weeding");
    assert_eq!(fetched.due_date, Some(march(5)));
}

#[tokio::test]
async fn test_harvest_create_refreshes_season_detail() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    repo.get_season(4).await.into_result().unwrap();
    let params = DateRangeParams::default();
    assert!(repo
        .list_harvests(4, &params)
        .await
        .into_result()
        .unwrap()
        .items
        .is_empty());

    let harvest = repo
        .create_harvest(
            4,
            &HarvestRequest {
                harvest_date: march(30),
                quantity: 320.5,
                unit: 1.0,
                note: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(harvest.season_id, Some(4));
    assert_eq!(harvest.quantity, 320.5);

    let detail_key = QueryKey::detail(ResourceKind::Season, 4);
    assert!(repo.cache().store().read().await.get(&detail_key).unwrap().invalidated);

    let page = repo.list_harvests(4, &params).await.into_result().unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, harvest.id);
    let fetched = repo.get_harvest(harvest.id).await.into_result().unwrap();
    assert_eq!(fetched.harvest_date, march(30));
}

#[tokio::test]
async fn test_expense_create_then_list() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = ExpenseListParams::default();
    repo.list_expenses(4, &params).await.into_result().unwrap();

    let expense = repo
        .create_expense(
            4,
            &ExpenseRequest {
                item_name: "Urea".to_string(),
                unit_price: 12.5,
                quantity: 4,
                expense_date: march(10),
            },
        )
        .await
        .unwrap();
    assert_eq!(expense.total_cost, Some(50.0));

    let page = repo.list_expenses(4, &params).await.into_result().unwrap();
    assert_eq!(page.items, vec![expense.clone()]);
    let fetched = repo.get_expense(expense.id).await.into_result().unwrap();
    assert_eq!(fetched.item_name, "Urea");

    // Lists of other seasons never saw the placeholder.
    let other = repo.list_expenses(9, &params).await.into_result().unwrap();
    assert!(other.items.is_empty());
}

#[tokio::test]
async fn test_field_log_create_then_get() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();

    let log = repo
        .create_field_log(
            4,
            &FieldLogRequest {
                log_date: march(3),
                log_type: "IRRIGATION".to_string(),
                notes: Some("Flooded the paddies".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(log.season_id, Some(4));

    let fetched = repo.get_field_log(log.id).await.into_result().unwrap();
    assert_eq!(fetched, log);
    let page = repo
        .list_field_logs(4, &FieldLogListParams::default())
        .await
        .into_result()
        .unwrap();
    assert_eq!(page.items[0].log_type, "IRRIGATION");
}

#[tokio::test]
async fn test_incident_placeholder_carries_season() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo().clone();
    assert!(repo.list_incidents(4).await.into_result().unwrap().is_empty());
    let key = QueryKey::scoped_lists(ResourceKind::Incident, ResourceKind::Season, 4).push("all");

    let creating = {
        let repo = repo.clone();
        tokio::spawn(async move {
            let request = IncidentCreateRequest {
                incident_type: "PEST".to_string(),
                severity: "HIGH".to_string(),
                description: "Brown planthopper".to_string(),
                deadline: Some(march(20)),
            };
            repo.create_incident(4, &request).await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let speculative: Vec<Incident> = repo.cache().peek(&key).await.unwrap();
    assert_eq!(speculative.len(), 1);
    assert_eq!(speculative[0].season_id, 4);
    assert_eq!(speculative[0].status, None);
    let placeholder = speculative[0].id;

    let incident = creating.await.unwrap().unwrap();
    assert_eq!(incident.status.as_deref(), Some("OPEN"));
    assert_ne!(incident.id, placeholder);

    let incidents = repo.list_incidents(4).await.into_result().unwrap();
    assert_eq!(incidents, vec![incident]);
}

// ==================== CATALOG TESTS ====================

#[tokio::test]
async fn test_report_create_then_get() {
    let fixture = TestFixture::admin().await;
    let repo = fixture.client.repo();
    let params = ReportListParams::default();
    repo.list_reports(&params).await.into_result().unwrap();

    let report = repo
        .create_report(&ReportRequest {
            title: "March costs".to_string(),
            report_type: "COST".to_string(),
            description: None,
            content: Some("Fertilizer dominated".to_string()),
            data: None,
        })
        .await
        .unwrap();

    let fetched = repo.get_report(report.report.id).await.into_result().unwrap();
    assert_eq!(fetched.content.as_deref(), Some("Fertilizer dominated"));
    let page = repo.list_reports(&params).await.into_result().unwrap();
    assert_eq!(page.items, vec![report.report]);
}

#[tokio::test]
async fn test_variety_listed_under_its_crop() {
    let fixture = TestFixture::admin().await;
    let repo = fixture.client.repo();
    assert!(repo.list_varieties(2).await.into_result().unwrap().is_empty());
    assert!(repo.list_varieties(3).await.into_result().unwrap().is_empty());

    let variety = repo
        .create_variety(&VarietyRequest {
            crop_id: 2,
            name: "IR64".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(variety.crop_id, 2);

    let rice = repo.list_varieties(2).await.into_result().unwrap();
    assert_eq!(rice, vec![variety.clone()]);
    assert!(repo.list_varieties(3).await.into_result().unwrap().is_empty());
    assert_eq!(
        repo.get_variety(variety.id).await.into_result().unwrap().name,
        "IR64"
    );
}

#[tokio::test]
async fn test_document_create_then_list() {
    let fixture = TestFixture::admin().await;
    let repo = fixture.client.repo();
    assert!(repo.list_documents().await.into_result().unwrap().is_empty());

    let document = repo.create_document(&guide()).await.unwrap();

    let documents = repo.list_documents().await.into_result().unwrap();
    assert_eq!(documents, vec![document]);
}

// ==================== INVENTORY AND AI TESTS ====================

#[tokio::test]
async fn test_movement_refreshes_on_hand() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = OnHandParams {
        warehouse_id: 1,
        location_id: None,
    };
    assert_eq!(repo.on_hand(5, &params).await.into_result().unwrap(), 40.0);
    assert!(repo.on_hand(5, &params).await.is_cached());

    let mut request = StockMovementRequest {
        supply_lot_id: 5,
        warehouse_id: 1,
        location_id: None,
        movement_type: "IN".to_string(),
        quantity: 10.0,
        season_id: Some(4),
        task_id: None,
        note: None,
    };
    let movement = repo.record_movement(&request).await.unwrap();
    assert_eq!(movement.supply_lot_id, 5);

    let after = repo.on_hand(5, &params).await;
    assert!(matches!(after, QueryResult::Fresh(_)));
    assert_eq!(after.into_result().unwrap(), 50.0);

    request.quantity = 0.0;
    let before = fixture.requests();
    let result = repo.record_movement(&request).await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
    assert_eq!(fixture.requests(), before);
}

#[tokio::test]
async fn test_ai_reads_cached_questions_sent() {
    let fixture = TestFixture::signed_in().await;
    let repo = fixture.client.repo();
    let params = AiSuggestionParams {
        season_id: 4,
        context: None,
    };
    let query = SeasonQuery { season_id: 4 };

    let suggestions = repo.ai_suggestions(&params).await.into_result().unwrap();
    assert_eq!(suggestions[0].priority, Some(SuggestionPriority::High));
    assert!(suggestions[0].description.contains("Season 4"));
    let prediction = repo.predict_yield(&query).await.into_result().unwrap();
    assert_eq!(prediction.season_id, 4);
    let cost = repo.optimize_cost(&query).await.into_result().unwrap();
    assert_eq!(cost.recommendations.len(), 1);

    let before = fixture.requests();
    assert!(repo.ai_suggestions(&params).await.is_cached());
    assert!(repo.predict_yield(&query).await.is_cached());
    assert!(repo.optimize_cost(&query).await.is_cached());
    assert_eq!(fixture.requests(), before);

    let question = AiQaRequest {
        question: "When to irrigate?".to_string(),
        context: None,
    };
    let answer = repo.ask(&question).await.unwrap();
    assert!(answer.answer.contains("When to irrigate?"));
    repo.ask(&question).await.unwrap();
    assert_eq!(fixture.requests(), before + 2);
}
