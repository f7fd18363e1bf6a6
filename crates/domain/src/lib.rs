//! Domain layer for the service desk backend.
//!
//! This crate contains:
//! - Domain models (ServiceRequest, HistoryEntry, RequestState, Actor)
//! - Lifecycle decision services
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
