use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::models::{CatalogFilter, DrinkField, EditField, EntryKind, MealField, Notification};
use crate::services::{CatalogSnapshot, MenuCatalogStore, MenuDashboard, Notifier};

/// Shared application state for the catalog endpoints
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<MenuCatalogStore>,
}

/// Collects the notifications raised while serving one request. Delete
/// confirmation is answered up front by the request's `confirm` flag.
pub struct RequestNotifier {
    notifications: Mutex<Vec<Notification>>,
    confirmed: bool,
}

impl RequestNotifier {
    pub fn new(confirmed: bool) -> Self {
        Self {
            notifications: Mutex::new(Vec::new()),
            confirmed,
        }
    }

    pub async fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.notifications.lock().await)
    }
}

#[async_trait]
impl Notifier for RequestNotifier {
    async fn notify(&self, notification: Notification) {
        self.notifications.lock().await.push(notification);
    }

    async fn confirm(&self, _prompt: &str) -> bool {
        self.confirmed
    }
}

/// Body for writing one field of a draft or of the edit session
#[derive(Debug, Deserialize)]
pub struct DraftFieldRequest {
    pub field: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct BeginEditRequest {
    pub kind: EntryKind,
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub confirm: Option<bool>,
}

/// Response for every mutating endpoint
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub notifications: Vec<Notification>,
    pub catalog: CatalogSnapshot,
}

type ApiResult = Result<Json<DashboardResponse>, (StatusCode, Json<Value>)>;

/// Create API router with the catalog endpoints
pub fn create_api_router(store: Arc<MenuCatalogStore>) -> Router {
    let state = ApiState { store };

    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/meals", post(add_meal))
        .route("/api/drinks", post(add_drink))
        .route("/api/meals/load", post(load_meals))
        .route("/api/drinks/load", post(load_drinks))
        .route("/api/meals/filter", put(filter_meals))
        .route("/api/drinks/filter", put(filter_drinks))
        .route("/api/meals/:id/save", post(save_meal))
        .route("/api/drinks/:id/save", post(save_drink))
        .route("/api/meals/:id", delete(delete_meal))
        .route("/api/drinks/:id", delete(delete_drink))
        .route("/api/drafts/meal", put(set_meal_draft))
        .route("/api/drafts/drink", put(set_drink_draft))
        .route(
            "/api/edit",
            post(begin_edit).patch(update_edit_field).delete(cancel_edit),
        )
        .with_state(state)
}

fn dashboard(state: &ApiState, confirmed: bool) -> (MenuDashboard, Arc<RequestNotifier>) {
    let notifier = Arc::new(RequestNotifier::new(confirmed));
    let dashboard = MenuDashboard::new(state.store.clone(), notifier.clone());
    (dashboard, notifier)
}

async fn respond(
    dashboard: &MenuDashboard,
    notifier: &RequestNotifier,
) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        notifications: notifier.take().await,
        catalog: dashboard.snapshot().await,
    })
}

fn bad_field(message: String) -> (StatusCode, Json<Value>) {
    warn!("Rejected field name: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "Invalid field",
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        })),
    )
}

/// Current catalog state for the view
#[instrument(name = "get_catalog", skip(state))]
pub async fn get_catalog(State(state): State<ApiState>) -> Json<CatalogSnapshot> {
    Json(state.store.snapshot().await)
}

#[instrument(name = "load_meals", skip(state))]
pub async fn load_meals(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.load_meals().await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "load_drinks", skip(state))]
pub async fn load_drinks(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.load_drinks().await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "set_meal_draft", skip(state, request), fields(field = %request.field))]
pub async fn set_meal_draft(
    State(state): State<ApiState>,
    Json(request): Json<DraftFieldRequest>,
) -> ApiResult {
    let field: MealField = request.field.parse().map_err(bad_field)?;

    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.set_meal_draft(field, request.value).await;
    Ok(respond(&dashboard, &notifier).await)
}

#[instrument(name = "set_drink_draft", skip(state, request), fields(field = %request.field))]
pub async fn set_drink_draft(
    State(state): State<ApiState>,
    Json(request): Json<DraftFieldRequest>,
) -> ApiResult {
    let field: DrinkField = request.field.parse().map_err(bad_field)?;

    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.set_drink_draft(field, request.value).await;
    Ok(respond(&dashboard, &notifier).await)
}

#[instrument(name = "add_meal", skip(state))]
pub async fn add_meal(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    if let Some(entry) = dashboard.add_meal().await {
        info!(id = %entry.id, "Meal created through API");
    }
    respond(&dashboard, &notifier).await
}

#[instrument(name = "add_drink", skip(state))]
pub async fn add_drink(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    if let Some(entry) = dashboard.add_drink().await {
        info!(id = %entry.id, "Drink created through API");
    }
    respond(&dashboard, &notifier).await
}

#[instrument(name = "begin_edit", skip(state, request), fields(kind = %request.kind, id = %request.id))]
pub async fn begin_edit(
    State(state): State<ApiState>,
    Json(request): Json<BeginEditRequest>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.begin_edit_by_id(request.kind, &request.id).await;
    respond(&dashboard, &notifier).await
}

/// Write one field of the open edit session. Without a session this is a no-op.
#[instrument(name = "update_edit_field", skip(state, request), fields(field = %request.field))]
pub async fn update_edit_field(
    State(state): State<ApiState>,
    Json(request): Json<DraftFieldRequest>,
) -> ApiResult {
    let (dashboard, notifier) = dashboard(&state, false);

    if let Some(session) = state.store.edit_session().await {
        let field = EditField::parse(session.kind(), &request.field).map_err(bad_field)?;
        dashboard.update_edit_field(field, request.value).await;
    }

    Ok(respond(&dashboard, &notifier).await)
}

#[instrument(name = "cancel_edit", skip(state))]
pub async fn cancel_edit(State(state): State<ApiState>) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.cancel_edit().await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "save_meal", skip(state))]
pub async fn save_meal(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.save_meal(&id).await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "save_drink", skip(state))]
pub async fn save_drink(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.save_drink(&id).await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "delete_meal", skip(state, query))]
pub async fn delete_meal(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, query.confirm.unwrap_or(false));
    dashboard.delete_meal(&id).await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "delete_drink", skip(state, query))]
pub async fn delete_drink(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, query.confirm.unwrap_or(false));
    dashboard.delete_drink(&id).await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "filter_meals", skip(state))]
pub async fn filter_meals(
    State(state): State<ApiState>,
    Json(filter): Json<CatalogFilter>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.apply_meal_filter(filter).await;
    respond(&dashboard, &notifier).await
}

#[instrument(name = "filter_drinks", skip(state))]
pub async fn filter_drinks(
    State(state): State<ApiState>,
    Json(filter): Json<CatalogFilter>,
) -> Json<DashboardResponse> {
    let (dashboard, notifier) = dashboard(&state, false);
    dashboard.apply_drink_filter(filter).await;
    respond(&dashboard, &notifier).await
}
