//! Decision core of an OAuth2 / OIDC authorize endpoint.
//!
//! Validates inbound authorize requests through a pluggable validator and,
//! on failure, produces a localized error page model with a safe return URI
//! plus exactly one locale-independent audit event.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
