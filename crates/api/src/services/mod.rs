//! Application services coordinating repositories and domain decisions.

pub mod lifecycle;

pub use lifecycle::{LifecycleOutcome, LifecycleService, LifecycleServiceError};
