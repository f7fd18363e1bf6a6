//! HTTP route handlers.

pub mod dashboard;
pub mod directory;
pub mod health;
pub mod requests;
