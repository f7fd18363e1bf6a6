//! Service request entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{
    Priority, RequestState, ServiceRequest, ServiceRequestDetails, ServiceType, UnknownState,
};
use sqlx::FromRow;

/// Database enum for service_type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "service_type", rename_all = "lowercase")]
pub enum ServiceTypeDb {
    Installation,
    Maintenance,
    Repair,
    Consulting,
}

impl From<ServiceTypeDb> for ServiceType {
    fn from(db: ServiceTypeDb) -> Self {
        match db {
            ServiceTypeDb::Installation => Self::Installation,
            ServiceTypeDb::Maintenance => Self::Maintenance,
            ServiceTypeDb::Repair => Self::Repair,
            ServiceTypeDb::Consulting => Self::Consulting,
        }
    }
}

impl From<ServiceType> for ServiceTypeDb {
    fn from(domain: ServiceType) -> Self {
        match domain {
            ServiceType::Installation => Self::Installation,
            ServiceType::Maintenance => Self::Maintenance,
            ServiceType::Repair => Self::Repair,
            ServiceType::Consulting => Self::Consulting,
        }
    }
}

/// Database enum for request_priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "request_priority", rename_all = "lowercase")]
pub enum PriorityDb {
    Low,
    Medium,
    High,
}

impl From<PriorityDb> for Priority {
    fn from(db: PriorityDb) -> Self {
        match db {
            PriorityDb::Low => Self::Low,
            PriorityDb::Medium => Self::Medium,
            PriorityDb::High => Self::High,
        }
    }
}

impl From<Priority> for PriorityDb {
    fn from(domain: Priority) -> Self {
        match domain {
            Priority::Low => Self::Low,
            Priority::Medium => Self::Medium,
            Priority::High => Self::High,
        }
    }
}

/// Database row mapping for the service_requests table.
///
/// `state` carries the stored spelling; whichever physical column holds it is
/// selected under this alias.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestEntity {
    pub id: i64,
    pub client_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub service_address: String,
    pub comuna: String,
    pub region: String,
    pub service_type: ServiceTypeDb,
    pub priority: PriorityDb,
    pub requested_equipment: Option<String>,
    pub final_comments: Option<String>,
    pub state: String,
    pub technician_id: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRequestEntity {
    /// Converts to the domain model, translating the stored state.
    pub fn into_domain(self) -> Result<ServiceRequest, UnknownState> {
        Ok(ServiceRequest {
            id: self.id,
            client_id: self.client_id,
            title: self.title,
            description: self.description,
            service_address: self.service_address,
            comuna: self.comuna,
            region: self.region,
            service_type: self.service_type.into(),
            priority: self.priority.into(),
            requested_equipment: self.requested_equipment,
            final_comments: self.final_comments,
            state: RequestState::from_stored(&self.state)?,
            technician_id: self.technician_id,
            submitted_at: self.submitted_at,
            assigned_at: self.assigned_at,
            closed_at: self.closed_at,
            updated_at: self.updated_at,
        })
    }
}

impl TryFrom<ServiceRequestEntity> for ServiceRequest {
    type Error = UnknownState;

    fn try_from(entity: ServiceRequestEntity) -> Result<Self, Self::Error> {
        entity.into_domain()
    }
}

/// Service request joined with client and technician display data.
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRequestDetailsEntity {
    pub id: i64,
    pub client_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub service_address: String,
    pub comuna: String,
    pub region: String,
    pub service_type: ServiceTypeDb,
    pub priority: PriorityDb,
    pub requested_equipment: Option<String>,
    pub final_comments: Option<String>,
    pub state: String,
    pub technician_id: Option<i64>,
    pub submitted_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub technician_name: Option<String>,
}

impl ServiceRequestDetailsEntity {
    pub fn into_domain(self) -> Result<ServiceRequestDetails, UnknownState> {
        let request = ServiceRequestEntity {
            id: self.id,
            client_id: self.client_id,
            title: self.title,
            description: self.description,
            service_address: self.service_address,
            comuna: self.comuna,
            region: self.region,
            service_type: self.service_type,
            priority: self.priority,
            requested_equipment: self.requested_equipment,
            final_comments: self.final_comments,
            state: self.state,
            technician_id: self.technician_id,
            submitted_at: self.submitted_at,
            assigned_at: self.assigned_at,
            closed_at: self.closed_at,
            updated_at: self.updated_at,
        }
        .into_domain()?;

        Ok(ServiceRequestDetails {
            request,
            client_name: self.client_name,
            client_email: self.client_email,
            technician_name: self.technician_name,
        })
    }
}
