//! Lectern API Library
//!
//! This crate provides the HTTP API handlers and application setup.

mod api_doc;
mod auth;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use error::ErrorResponse;
