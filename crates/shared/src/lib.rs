//! Shared utilities and common types for the service desk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT bearer token payload contract and verification
//! - Common validation logic

pub mod jwt;
pub mod validation;
