//! API Module
//!
//! HTTP diagnostics surface over a cache registry.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /stats` - Stats for every domain
//! - `GET /stats/:domain` - Stats for one domain
//! - `GET /cache/:domain/:key` - Read a value
//! - `PUT /cache/:domain/:key` - Store a value
//! - `DELETE /cache` - Clear every domain
//! - `DELETE /cache/:domain` - Clear one domain

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
