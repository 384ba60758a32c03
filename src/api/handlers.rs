//! API Handlers
//!
//! HTTP request handlers for the diagnostics endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheRegistry, CacheStats};
use crate::config::{default_domains, Config};
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, ClearResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry of domain caches holding JSON documents
    pub registry: Arc<CacheRegistry<Value>>,
    /// Reject unknown domains with 404 instead of degrading silently
    pub strict_domains: bool,
}

impl AppState {
    pub fn new(registry: Arc<CacheRegistry<Value>>, strict_domains: bool) -> Self {
        Self {
            registry,
            strict_domains,
        }
    }

    /// Creates the state from configuration over the default domain table.
    pub fn from_config(config: &Config) -> Result<Self> {
        let registry = CacheRegistry::new(&default_domains())?;
        Ok(Self::new(Arc::new(registry), config.strict_domains))
    }

    fn check_domain(&self, domain: &str) -> Result<()> {
        if self.strict_domains {
            self.registry.cache(domain)?;
        }
        Ok(())
    }
}

/// Handler for PUT /cache/:domain/:key
pub async fn set_handler(
    State(state): State<AppState>,
    Path((domain, key)): Path<(String, String)>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }
    state.check_domain(&domain)?;

    state.registry.set(&domain, key.as_str(), req.value);

    Ok(Json(SetResponse::new(domain, key)))
}

/// Handler for GET /cache/:domain/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((domain, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    state.check_domain(&domain)?;

    let value = state
        .registry
        .get(&domain, &key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(domain, key, value)))
}

/// Handler for DELETE /cache
pub async fn clear_all_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.registry.clear(None);
    Json(ClearResponse::all())
}

/// Handler for DELETE /cache/:domain
pub async fn clear_domain_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<ClearResponse>> {
    state.check_domain(&domain)?;

    state.registry.clear(Some(&domain));
    Ok(Json(ClearResponse::domain(domain)))
}

/// Handler for GET /stats
///
/// Read-only view of every domain's counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.registry.stats_all()))
}

/// Handler for GET /stats/:domain
///
/// Always 404s for an unknown domain; there is nothing lenient to report.
pub async fn domain_stats_handler(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<CacheStats>> {
    let cache = state.registry.cache(&domain)?;
    Ok(Json(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
