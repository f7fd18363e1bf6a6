//! Repository implementations for database operations.

pub mod client;
pub mod history;
pub mod service_request;
pub mod state_column;
pub mod user;

pub use client::ClientRepository;
pub use history::HistoryRepository;
pub use service_request::ServiceRequestRepository;
pub use state_column::{resolve_state_column, state_column_cell, StateColumn, StateColumnCell};
pub use user::UserRepository;
