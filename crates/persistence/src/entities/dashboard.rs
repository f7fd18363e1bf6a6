//! Aggregate rows behind the administrator dashboard.

use chrono::NaiveDate;
use domain::models::{DailyCount, TechnicianPerformance};
use sqlx::FromRow;

/// Request count for one stored state spelling.
#[derive(Debug, Clone, FromRow)]
pub struct StateCountEntity {
    pub state: String,
    pub total: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DailyCountEntity {
    pub day: NaiveDate,
    pub total: i64,
}

impl From<DailyCountEntity> for DailyCount {
    fn from(entity: DailyCountEntity) -> Self {
        Self {
            day: entity.day,
            total: entity.total,
        }
    }
}

/// Per-technician counters, already bucketed by canonical state in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct TechnicianPerformanceEntity {
    pub technician_id: i64,
    pub name: String,
    pub email: String,
    pub assigned_total: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub avg_completion_hours: Option<f64>,
}

impl From<TechnicianPerformanceEntity> for TechnicianPerformance {
    fn from(entity: TechnicianPerformanceEntity) -> Self {
        Self {
            technician_id: entity.technician_id,
            name: entity.name,
            email: entity.email,
            assigned_total: entity.assigned_total,
            in_progress: entity.in_progress,
            completed: entity.completed,
            cancelled: entity.cancelled,
            avg_completion_hours: entity.avg_completion_hours,
        }
    }
}
