use super::{CallDispatch, ICallDispatchRepo};
use crate::repos::shared::inmemory_repo::{find_and_delete_by, find_by, insert};
use callward_domain::ID;

pub struct InMemoryCallDispatchRepo {
    dispatches: std::sync::Mutex<Vec<CallDispatch>>,
}

impl InMemoryCallDispatchRepo {
    pub fn new() -> Self {
        Self {
            dispatches: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl ICallDispatchRepo for InMemoryCallDispatchRepo {
    async fn insert(&self, dispatch: &CallDispatch) -> anyhow::Result<()> {
        insert(dispatch, &self.dispatches);
        Ok(())
    }

    async fn find(&self, user_id: &ID, google_event_id: &str) -> Option<CallDispatch> {
        let mut dispatches = find_by(&self.dispatches, |d| {
            d.user_id == *user_id && d.google_event_id == google_event_id
        });
        if dispatches.is_empty() {
            return None;
        }
        Some(dispatches.remove(0))
    }

    async fn delete_all_before(&self, timestamp: i64) -> Vec<CallDispatch> {
        find_and_delete_by(&self.dispatches, |d| d.dispatched_at < timestamp)
    }
}
