//! # zonealarm-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept protocol requests over HTTP (`POST /api/command`) and hand them
//!   to the dispatcher, one at a time
//! - Offer read-only shortcuts (`GET /api/alarms`, `GET /api/time`)
//! - Stream firings as server-sent events (`GET /api/firings/stream`)
//! - Map dispatcher outcomes onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `zonealarm-app` (for port traits and the dispatcher) and
//! `zonealarm-domain` (for domain types used in responses). Never leaks axum
//! types into the domain.

pub mod api;
pub mod reply;
pub mod router;
pub mod state;
