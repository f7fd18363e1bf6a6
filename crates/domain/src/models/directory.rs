//! Technician and client directory listings for administrators.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// An assignable technician.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A registered client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// Response for the technician listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTechniciansResponse {
    pub technicians: Vec<TechnicianSummary>,
}

/// Response for the client listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListClientsResponse {
    pub clients: Vec<ClientSummary>,
}
