//! Storefront Backend
//!
//! JSON-over-HTTP backend for a clothing storefront.
//!
//! ## Features
//! - Product catalog with free-text search, filters and pagination
//! - Per-user shopping cart with variant merging
//! - Orders with a guarded cancel / return lifecycle
//! - Address book and customer support queries
//! - Payment gateway order creation and signature verification
//! - Order lifecycle events on NATS

// =============================================================================
// Core
// =============================================================================

pub mod domain;
pub mod storage;

// =============================================================================
// Application
// =============================================================================

pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod payment;
pub mod publisher;
pub mod routes;
pub mod services;
pub mod state;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use routes::router;
pub use state::AppState;

#[cfg(test)]
mod test_support;
