// FitStream - fitness video sharing backend

// Core types - category taxonomy
pub mod core;

// Domain records
pub mod models;

// Infrastructure - data store, media storage, viewer context and middleware
pub mod infrastructure;

// Application services
pub mod services;

// HTTP API
pub mod api;

// Common utilities
pub mod app_state;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
