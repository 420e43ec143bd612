use std::collections::BTreeMap;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use crate::admin::AdminState;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub database_id: String,
    pub collection_id: String,
    pub active_keys: usize,
    pub default_keys: usize,
    pub serving_defaults: bool,
    pub cache_valid: bool,
    pub last_fetch_ms: Option<i64>,
}

#[derive(Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    /// "remote" when served from the active snapshot, "default" otherwise.
    pub source: &'static str,
}

#[derive(Serialize)]
pub struct RefreshResult {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub keys: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    let engine = &state.engine;
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        database_id: engine.scope().database_id.clone(),
        collection_id: engine.scope().collection_id.clone(),
        active_keys: engine.store().active().len(),
        default_keys: engine.store().defaults().len(),
        serving_defaults: engine.serving_defaults(),
        cache_valid: engine.is_cache_valid().await,
        last_fetch_ms: engine.last_fetch().await,
    })
}

pub async fn list_config(State(state): State<AdminState>) -> Json<BTreeMap<String, String>> {
    Json(state.engine.all().into_iter().collect())
}

pub async fn get_config(
    State(state): State<AdminState>,
    Path(key): Path<String>,
) -> Result<Json<ConfigEntry>, StatusCode> {
    let engine = &state.engine;
    let store = engine.store();
    let source = if !engine.serving_defaults() && store.active().contains_key(&key) {
        "remote"
    } else {
        "default"
    };
    let value = store.get(&key).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(ConfigEntry { key, value, source }))
}

pub async fn refresh(State(state): State<AdminState>) -> Json<RefreshResult> {
    let outcome = state.engine.fetch_and_activate().await;
    Json(RefreshResult {
        outcome: outcome.tag(),
        error: outcome.cause().map(|e| e.to_string()),
        keys: state.engine.store().active().len(),
    })
}
