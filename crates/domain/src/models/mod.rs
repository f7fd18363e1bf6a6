//! Domain models for the service desk.

pub mod actor;
pub mod dashboard;
pub mod directory;
pub mod history;
pub mod service_request;
pub mod state;

pub use actor::{Actor, Role, UnknownRole};
pub use dashboard::{DailyCount, DashboardResponse, StateTotals, TechnicianPerformance};
pub use directory::{ClientSummary, ListClientsResponse, ListTechniciansResponse, TechnicianSummary};
pub use history::{HistoryEntry, ListHistoryResponse, NewHistoryEntry};
pub use service_request::{
    AssignTechnicianRequest, CreateServiceRequestRequest, ListServiceRequestsResponse,
    NewServiceRequest, Priority, ProposedChange, ReopenRequest, ServiceRequest,
    ServiceRequestDetails, ServiceRequestResponse, ServiceType, TechnicianChange,
    UpdateServiceRequestRequest,
};
pub use state::{RequestState, UnknownState};
