mod inmemory;

use callward_domain::ID;
pub use inmemory::InMemoryCallDispatchRepo;

/// Ledger entry recording that a reminder call was successfully dispatched
/// for a `(user, provider event)` pair. Entries only live as long as the
/// pair can still show up inside the lookahead window, so the ledger stays
/// small and duplicate calls are suppressed while failed dispatches are
/// still retried on the next cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CallDispatch {
    pub user_id: ID,
    pub google_event_id: String,
    pub dispatched_at: i64,
}

#[async_trait::async_trait]
pub trait ICallDispatchRepo: Send + Sync {
    async fn insert(&self, dispatch: &CallDispatch) -> anyhow::Result<()>;
    async fn find(&self, user_id: &ID, google_event_id: &str) -> Option<CallDispatch>;
    /// Removes and returns every entry dispatched before the given
    /// timestamp
    async fn delete_all_before(&self, timestamp: i64) -> Vec<CallDispatch>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup_context_inmemory;

    #[tokio::test]
    async fn purges_entries_older_than_timestamp() {
        let ctx = setup_context_inmemory();
        let user_id: ID = Default::default();

        for (gid, ts) in &[("g1", 100), ("g2", 200), ("g3", 300)] {
            ctx.repos
                .call_dispatches
                .insert(&CallDispatch {
                    user_id: user_id.clone(),
                    google_event_id: (*gid).into(),
                    dispatched_at: *ts,
                })
                .await
                .expect("To insert dispatch");
        }

        let purged = ctx.repos.call_dispatches.delete_all_before(250).await;
        assert_eq!(purged.len(), 2);

        assert!(ctx
            .repos
            .call_dispatches
            .find(&user_id, "g1")
            .await
            .is_none());
        assert!(ctx
            .repos
            .call_dispatches
            .find(&user_id, "g3")
            .await
            .is_some());
    }
}
