//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for a cache read (GET /cache/:domain/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub domain: String,
    pub key: String,
    pub value: Value,
}

impl GetResponse {
    pub fn new(domain: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        Self {
            domain: domain.into(),
            key: key.into(),
            value,
        }
    }
}

/// Response body for a cache write (PUT /cache/:domain/:key)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    pub domain: String,
    pub key: String,
}

impl SetResponse {
    pub fn new(domain: impl Into<String>, key: impl Into<String>) -> Self {
        let domain = domain.into();
        let key = key.into();
        Self {
            message: format!("Key '{}' set in '{}'", key, domain),
            domain,
            key,
        }
    }
}

/// Response body for clearing caches (DELETE /cache, DELETE /cache/:domain)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// Cleared domain, absent when every domain was cleared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl ClearResponse {
    pub fn domain(domain: impl Into<String>) -> Self {
        let domain = domain.into();
        Self {
            message: format!("Domain '{}' cleared", domain),
            domain: Some(domain),
        }
    }

    pub fn all() -> Self {
        Self {
            message: "All domains cleared".to_string(),
            domain: None,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
///
/// Serializes as a plain object keyed by domain name.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct StatsResponse {
    pub domains: BTreeMap<String, CacheStats>,
}

impl StatsResponse {
    pub fn new(domains: BTreeMap<String, CacheStats>) -> Self {
        Self { domains }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
