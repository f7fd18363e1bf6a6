//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod client;
pub mod dashboard;
pub mod history;
pub mod service_request;
pub mod user;

pub use client::ClientEntity;
pub use dashboard::{DailyCountEntity, StateCountEntity, TechnicianPerformanceEntity};
pub use history::HistoryEntity;
pub use service_request::{
    PriorityDb, ServiceRequestDetailsEntity, ServiceRequestEntity, ServiceTypeDb,
};
pub use user::UserEntity;
