//! HTTP API handlers.
//!
//! Every handler reloads the whole profile collection from the store, works
//! on it in memory and, for writes, saves the whole collection back.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::matcher;
use crate::metrics::{self, Operation};
use crate::profile::types::{find, find_mut};
use crate::profile::{FaceData, Profile, ProfileStore};

use super::error::{ApiError, MessageResponse};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Profile storage backend.
    store: Arc<dyn ProfileStore>,
    /// Held by register and update for their whole load/mutate/save cycle.
    write_gate: Arc<Mutex<()>>,
    /// Prometheus render handle, when a recorder is installed.
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state backed by `store`.
    pub fn new(store: impl ProfileStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
            write_gate: Arc::new(Mutex::new(())),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    async fn load(&self, operation: Operation) -> Result<Vec<Profile>, ApiError> {
        self.store
            .load()
            .await
            .map_err(|e| ApiError::storage(operation, e))
    }

    async fn save(&self, operation: Operation, profiles: &[Profile]) -> Result<(), ApiError> {
        self.store
            .save(profiles)
            .await
            .map_err(|e| ApiError::storage(operation, e))
    }
}

/// Body of `POST /api/register-face`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// Identifier to enroll.
    pub user_id: String,
    /// Landmarks to enroll.
    pub face_data: FaceData,
}

/// Body of `PUT /api/update-face/:userId`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    /// Replacement landmarks.
    pub face_data: FaceData,
}

/// Body of `POST /api/authenticate-face`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateRequest {
    /// Identifier to verify.
    pub user_id: String,
    /// Landmarks captured for this attempt.
    pub face_data: FaceData,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

fn require_user_id(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ApiError::Validation("userId must not be empty".to_string()));
    }
    Ok(())
}

fn finish<T: IntoResponse>(operation: Operation, result: Result<T, ApiError>) -> Response {
    let response = result.into_response();
    metrics::record_request(operation, response.status().as_u16());
    response
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus exposition of the service metrics.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, String::new()),
    }
}

/// Enroll a new profile. Rejects ids that are already enrolled.
pub async fn register_face(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => register(&state, request).await,
        Err(rejection) => Err(rejection.into()),
    };
    finish(Operation::Register, result)
}

#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn register(state: &AppState, request: RegisterRequest) -> Result<Json<MessageResponse>, ApiError> {
    require_user_id(&request.user_id)?;

    let _gate = state.write_gate.lock().await;
    let mut profiles = state.load(Operation::Register).await?;

    if find(&profiles, &request.user_id).is_some() {
        warn!("User already registered");
        return Err(ApiError::DuplicateUser(request.user_id));
    }

    profiles.push(Profile::new(request.user_id, request.face_data));
    state.save(Operation::Register, &profiles).await?;

    metrics::inc_profiles_registered();
    info!(total = profiles.len(), "Face data registered");
    Ok(Json(MessageResponse::new("face data registered")))
}

/// List every enrolled profile in insertion order.
pub async fn list_faces(State(state): State<AppState>) -> Response {
    let result = state.load(Operation::List).await.map(|profiles| {
        debug!(count = profiles.len(), "Listing face data");
        Json(profiles)
    });
    finish(Operation::List, result)
}

/// Replace the landmarks of an enrolled profile.
pub async fn update_face(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => update(&state, user_id, request).await,
        Err(rejection) => Err(rejection.into()),
    };
    finish(Operation::Update, result)
}

#[instrument(skip(state, request))]
async fn update(
    state: &AppState,
    user_id: String,
    request: UpdateRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    require_user_id(&user_id)?;

    let _gate = state.write_gate.lock().await;
    let mut profiles = state.load(Operation::Update).await?;

    let Some(profile) = find_mut(&mut profiles, &user_id) else {
        warn!("Update for unknown user");
        return Err(ApiError::UserNotFound(user_id));
    };
    profile.face_data = request.face_data;

    state.save(Operation::Update, &profiles).await?;

    metrics::inc_profiles_updated();
    info!("Face data updated");
    Ok(Json(MessageResponse::new("face data updated")))
}

/// Compare submitted landmarks against the enrolled profile.
pub async fn authenticate_face(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Response {
    let result = match payload {
        Ok(Json(request)) => authenticate(&state, request).await,
        Err(rejection) => Err(rejection.into()),
    };
    finish(Operation::Authenticate, result)
}

#[instrument(skip(state, request), fields(user_id = %request.user_id))]
async fn authenticate(
    state: &AppState,
    request: AuthenticateRequest,
) -> Result<Json<MessageResponse>, ApiError> {
    require_user_id(&request.user_id)?;

    let profiles = state.load(Operation::Authenticate).await?;

    let Some(stored) = find(&profiles, &request.user_id) else {
        warn!("Authentication for unknown user");
        return Err(ApiError::UserNotFound(request.user_id));
    };

    let outcome = matcher::verify(&stored.face_data.landmarks, &request.face_data.landmarks)
        .inspect_err(|e| warn!(error = %e, "Landmarks not comparable"))?;
    debug!(distance = outcome.distance, "Compared landmarks");

    if outcome.matched {
        metrics::inc_auth_success();
        info!("Authentication succeeded");
        Ok(Json(MessageResponse::new("authentication succeeded")))
    } else {
        metrics::inc_auth_failure();
        info!(distance = outcome.distance, "Authentication failed");
        Err(ApiError::AuthenticationFailed(request.user_id))
    }
}
