//! HTTP routes for dashboard layouts.
//!
//! ```text
//! GET    /api/dashboard-layout   -> { "id": "...", "layout": "[{\"i\":..}]" } | 404
//! POST   /api/dashboard-layout   <- { "layout": "[...]" }
//! DELETE /api/dashboard-layout   -> 204
//! GET    /api/dashboard-widgets  -> { "grid": {..}, "widgets": [..] }
//! ```
//!
//! Requests are scoped by the `x-tenant-id` and `x-user-id` headers, which
//! the authenticating proxy in front of this service sets.

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use dashgrid_core::{
    DashboardLayout, GridConfig, LayoutCodecError, LayoutOwner, LayoutStore, StorageError,
    StoredLayout, WidgetCatalog, WidgetDefinition,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn LayoutStore>,
    pub catalog: Arc<WidgetCatalog>,
    pub grid: GridConfig,
}

/// Request failures, mapped onto status codes
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing {0} header")]
    MissingIdentity(&'static str),
    #[error("No layout stored")]
    NotFound,
    #[error("Malformed layout: {0}")]
    BadLayout(#[from] LayoutCodecError),
    #[error("Storage failure: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage(other),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::MissingIdentity(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::BadLayout(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) => {
                error!("Storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ErrorBody { message: self.to_string() })).into_response()
    }
}

/// The caller's tenant and user, taken from request headers
pub struct Owner(pub LayoutOwner);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant = header(parts, TENANT_HEADER)?;
        let user = header(parts, USER_HEADER)?;
        Ok(Owner(LayoutOwner::new(tenant, user)))
    }
}

fn header(parts: &Parts, name: &'static str) -> Result<String, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingIdentity(name))
}

/// Body of a layout write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPayload {
    pub layout: String,
}

/// Catalog listing for the widget picker
#[derive(Debug, Clone, Serialize)]
pub struct CatalogResponse {
    pub grid: GridConfig,
    pub widgets: Vec<WidgetDefinition>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/dashboard-layout",
            get(get_layout).post(save_layout).delete(reset_layout),
        )
        .route("/api/dashboard-widgets", get(list_widgets))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check
async fn health() -> &'static str {
    "ok"
}

/// Return the stored record verbatim.
///
/// A record file that cannot be parsed at all is reported as missing so the
/// client falls back to its default arrangement.
async fn get_layout(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<Json<StoredLayout>, ApiError> {
    match state.store.read(&owner).await {
        Ok(record) => Ok(Json(record)),
        Err(StorageError::Serialization(e)) => {
            warn!("Unreadable layout record for {}: {}", owner, e);
            Err(ApiError::NotFound)
        }
        Err(e) => Err(e.into()),
    }
}

/// Store a layout string after checking it decodes to an item list.
async fn save_layout(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Json(payload): Json<LayoutPayload>,
) -> Result<Json<StoredLayout>, ApiError> {
    let layout = DashboardLayout::from_wire(&payload.layout)?;

    let existing_id = match state.store.read(&owner).await {
        Ok(record) => record.id,
        Err(StorageError::NotFound(_)) => None,
        Err(StorageError::Serialization(e)) => {
            warn!("Replacing unreadable layout record for {}: {}", owner, e);
            None
        }
        Err(e) => return Err(ApiError::Storage(e)),
    };
    let mut record = StoredLayout::new(payload.layout);
    if existing_id.is_some() {
        record.id = existing_id;
    }

    state.store.write(&owner, &record).await?;
    info!("Saved layout for {} ({} widgets)", owner, layout.len());
    Ok(Json(record))
}

/// Drop the stored layout; the user sees the default arrangement again.
async fn reset_layout(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&owner).await?;
    info!("Reset layout for {}", owner);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_widgets(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        grid: state.grid,
        widgets: state.catalog.iter().cloned().collect(),
    })
}
