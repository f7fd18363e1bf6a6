//! Resolution of the column that stores a request's state.
//!
//! The column was renamed from `state` to `current_state`; deployments may
//! carry either. The choice is made once per process and reused.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::info;

use crate::metrics::QueryTimer;

/// Physical column holding the request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateColumn {
    /// Current name.
    CurrentState,
    /// Name used before the rename.
    State,
}

impl StateColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateColumn::CurrentState => "current_state",
            StateColumn::State => "state",
        }
    }

    /// Picks the column from the names present on `service_requests`.
    ///
    /// Prefers the current name and falls back to it when neither exists.
    pub fn choose<S: AsRef<str>>(present: &[S]) -> Self {
        let has = |name: &str| present.iter().any(|c| c.as_ref() == name);
        if has(StateColumn::CurrentState.as_str()) {
            StateColumn::CurrentState
        } else if has(StateColumn::State.as_str()) {
            StateColumn::State
        } else {
            StateColumn::CurrentState
        }
    }
}

/// Process-wide memo for the resolved column, owned by the composition root.
pub type StateColumnCell = Arc<OnceCell<StateColumn>>;

/// Creates an unresolved memo.
pub fn state_column_cell() -> StateColumnCell {
    Arc::new(OnceCell::new())
}

/// Inspects the live schema for the state column.
pub async fn resolve_state_column(pool: &PgPool) -> Result<StateColumn, sqlx::Error> {
    let timer = QueryTimer::new("resolve_state_column");
    let result = sqlx::query_scalar::<_, String>(
        r#"
        SELECT column_name::text
        FROM information_schema.columns
        WHERE table_schema = current_schema()
          AND table_name = 'service_requests'
          AND column_name IN ('current_state', 'state')
        "#,
    )
    .fetch_all(pool)
    .await;
    timer.finish(&result);

    let column = StateColumn::choose(&result?);
    info!(column = column.as_str(), "Resolved service request state column");
    Ok(column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_current_state() {
        assert_eq!(
            StateColumn::choose(&["state", "current_state"]),
            StateColumn::CurrentState
        );
    }

    #[test]
    fn test_falls_back_to_state() {
        assert_eq!(StateColumn::choose(&["state"]), StateColumn::State);
    }

    #[test]
    fn test_defaults_when_missing() {
        let none: [&str; 0] = [];
        assert_eq!(StateColumn::choose(&none), StateColumn::CurrentState);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(StateColumn::CurrentState.as_str(), "current_state");
        assert_eq!(StateColumn::State.as_str(), "state");
    }

    #[tokio::test]
    async fn test_cell_starts_unresolved() {
        let cell = state_column_cell();
        assert!(cell.get().is_none());
        let resolved = cell
            .get_or_init(|| async { StateColumn::State })
            .await;
        assert_eq!(*resolved, StateColumn::State);
    }
}
