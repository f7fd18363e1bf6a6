//! Administrator dashboard aggregates.
//!
//! Counts arrive from storage keyed by stored state spelling and are folded
//! into canonical states here, so `en_progreso` rows land in `in_progress`.

use chrono::NaiveDate;
use serde::Serialize;

use super::service_request::ServiceRequestDetails;
use super::state::RequestState;

/// Number of requests in each lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTotals {
    pub total: i64,
    /// Requests in a non-terminal state.
    pub open: i64,
    pub pending: i64,
    pub under_review: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
}

impl StateTotals {
    /// Sums per-state counts. Repeated states accumulate.
    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (RequestState, i64)>,
    {
        let mut totals = Self::default();
        for (state, count) in counts {
            totals.add(state, count);
        }
        totals
    }

    fn add(&mut self, state: RequestState, count: i64) {
        let slot = match state {
            RequestState::Pending => &mut self.pending,
            RequestState::UnderReview => &mut self.under_review,
            RequestState::Assigned => &mut self.assigned,
            RequestState::InProgress => &mut self.in_progress,
            RequestState::Completed => &mut self.completed,
            RequestState::Cancelled => &mut self.cancelled,
        };
        *slot += count;
        self.total += count;
        if !state.is_terminal() {
            self.open += count;
        }
    }
}

/// Requests submitted on one calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub day: NaiveDate,
    pub total: i64,
}

/// Workload and throughput of one active technician.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianPerformance {
    pub technician_id: i64,
    pub name: String,
    pub email: String,
    pub assigned_total: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    /// Mean hours from assignment to closure over completed requests.
    pub avg_completion_hours: Option<f64>,
}

/// Dashboard payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub totals: StateTotals,
    pub requests_per_day: Vec<DailyCount>,
    pub technician_performance: Vec<TechnicianPerformance>,
    pub recent_requests: Vec<ServiceRequestDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_fold_counts() {
        let totals = StateTotals::from_counts([
            (RequestState::Pending, 3),
            (RequestState::InProgress, 2),
            (RequestState::Completed, 5),
            (RequestState::Cancelled, 1),
        ]);
        assert_eq!(totals.total, 11);
        assert_eq!(totals.pending, 3);
        assert_eq!(totals.in_progress, 2);
        assert_eq!(totals.under_review, 0);
        assert_eq!(totals.open, 5);
    }

    #[test]
    fn test_legacy_and_canonical_spellings_share_a_bucket() {
        // A table holding both spellings reports one in-progress figure
        let counts = [("en_progreso", 4), ("in_progress", 1), ("assigned", 2)]
            .into_iter()
            .map(|(stored, n)| (RequestState::from_stored(stored).unwrap(), n));
        let totals = StateTotals::from_counts(counts);
        assert_eq!(totals.in_progress, 5);
        assert_eq!(totals.assigned, 2);
        assert_eq!(totals.total, 7);
    }

    #[test]
    fn test_totals_serialize_camel_case() {
        let json = serde_json::to_value(StateTotals::from_counts([(
            RequestState::UnderReview,
            1,
        )]))
        .unwrap();
        assert_eq!(json["underReview"], 1);
        assert_eq!(json["inProgress"], 0);
    }

    #[test]
    fn test_open_excludes_terminal_states() {
        let totals = StateTotals::from_counts([
            (RequestState::Assigned, 2),
            (RequestState::Completed, 1),
            (RequestState::Cancelled, 4),
        ]);
        assert_eq!(totals.open, 2);
        assert_eq!(totals.total, 7);
    }
}
