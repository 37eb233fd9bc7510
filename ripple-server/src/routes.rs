//! `/api/v1/workspace` handlers: one `ripple::Engine` behind a
//! single `tokio::sync::Mutex` — every handler that touches the engine
//! holds the lock for its whole body, so a concurrent render never
//! observes a torn write.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

use ripple::loader;
use ripple_engine::{EffectModule, ExecutionResult};

use crate::error::ApiError;

pub struct AppState {
    pub engine: Mutex<ripple::Engine>,
}

pub type SharedState = Arc<AppState>;

pub fn new_state() -> SharedState {
    Arc::new(AppState {
        engine: Mutex::new(ripple::Engine::new()),
    })
}

#[derive(Debug, Deserialize)]
pub struct LoadQuery {
    sample: Option<String>,
    #[serde(default)]
    effects: Option<String>,
}

/// Resolves the `effects`/`action_file` convention name to a statically
/// linked `EffectModule`. Unknown names are a logged warning, not a load
/// failure.
fn resolve_effect_module(name: &str) -> Option<&'static dyn EffectModule> {
    match name {
        "private_banking" | "private-banking-effects" => Some(&private_banking_effects::PrivateBankingEffects),
        _ => None,
    }
}

/// `POST /api/v1/workspace/load` - multipart `file` or `?sample=<name>`,
/// optional `?effects=<name>` (or an uploaded `action_file` field) to
/// register a custom effect module after built-ins.
pub async fn load(State(state): State<SharedState>, Query(query): Query<LoadQuery>, multipart: Option<Multipart>) -> Result<impl IntoResponse, ApiError> {
    let mut uploaded_json: Option<String> = None;
    let mut uploaded_action_file: Option<String> = None;

    if let Some(mut multipart) = multipart {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("invalid multipart field '{name}': {e}")))?;
            match name.as_str() {
                "file" => uploaded_json = Some(text),
                "action_file" => uploaded_action_file = Some(text),
                _ => {}
            }
        }
    }

    let config = match (uploaded_json, &query.sample) {
        (Some(raw), _) => loader::parse_workspace_json(&raw).map_err(|e| ApiError::bad_request(e.to_string()))?,
        (None, Some(sample)) => loader::load_sample(sample).map_err(|e| ApiError::bad_request(e.to_string()))?,
        (None, None) => return Err(ApiError::bad_request("either a multipart 'file' or a '?sample=' query parameter is required")),
    };

    let effect_name = uploaded_action_file.as_deref().or(query.effects.as_deref());
    let mut custom_modules: Vec<&dyn EffectModule> = Vec::new();
    if let Some(name) = effect_name {
        match resolve_effect_module(name) {
            Some(module) => custom_modules.push(module),
            None => tracing::warn!(effects = name, "requested custom effect module is not statically linked, ignoring"),
        }
    }

    let mut engine = state.engine.lock().await;
    let summary = engine
        .load_workspace(config, &custom_modules)
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    action_id: String,
    node_id: String,
}

/// `POST /api/v1/workspace/simulate`
pub async fn simulate(State(state): State<SharedState>, Json(body): Json<SimulateRequest>) -> Result<impl IntoResponse, ApiError> {
    let mut engine = state.engine.lock().await;
    let result = engine.execute_action(&body.action_id, &body.node_id)?;
    if let ExecutionResult::Error { message } = &result {
        return Err(ApiError::bad_request(message.clone()));
    }
    let updated_graph_data = engine.get_graph_for_render().ok();
    Ok(Json(json!({
        "result": result,
        "updated_graph_data": updated_graph_data,
    })))
}

/// `POST /api/v1/workspace/reset`
pub async fn reset(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let mut engine = state.engine.lock().await;
    let graph = engine.reset()?;
    Ok(Json(graph))
}

/// `GET /api/v1/workspace/history`
pub async fn history(State(state): State<SharedState>) -> impl IntoResponse {
    let engine = state.engine.lock().await;
    Json(engine.history())
}

/// `GET /api/v1/workspace/samples`
pub async fn samples() -> impl IntoResponse {
    Json(loader::list_samples())
}

/// `GET /api/v1/workspace/health`
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
