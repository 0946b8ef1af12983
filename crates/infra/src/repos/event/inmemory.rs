use super::IScheduledEventRepo;
use crate::repos::shared::inmemory_repo::*;
use callward_domain::{ScheduledEvent, ID};

pub struct InMemoryScheduledEventRepo {
    events: std::sync::Mutex<Vec<ScheduledEvent>>,
}

impl InMemoryScheduledEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IScheduledEventRepo for InMemoryScheduledEventRepo {
    async fn insert(&self, event: &ScheduledEvent) -> anyhow::Result<()> {
        insert(event, &self.events);
        Ok(())
    }

    async fn save(&self, event: &ScheduledEvent) -> anyhow::Result<()> {
        save(event, &self.events);
        Ok(())
    }

    async fn delete(&self, event_id: &ID) -> Option<ScheduledEvent> {
        delete(event_id, &self.events)
    }

    async fn find(&self, event_id: &ID) -> Option<ScheduledEvent> {
        find(event_id, &self.events)
    }

    async fn find_by_google_event_id(
        &self,
        google_event_id: &str,
        user_id: &ID,
    ) -> Option<ScheduledEvent> {
        let mut events = find_by(&self.events, |e| {
            e.google_event_id == google_event_id && e.user_id == *user_id
        });
        if events.is_empty() {
            return None;
        }
        Some(events.remove(0))
    }

    async fn find_by_user(&self, user_id: &ID, skip: usize, limit: usize) -> Vec<ScheduledEvent> {
        let mut events = find_by(&self.events, |e| e.user_id == *user_id);
        events.sort_by_key(|e| std::cmp::Reverse(e.start_ts));
        events.into_iter().skip(skip).take(limit).collect()
    }

    async fn count_by_user(&self, user_id: &ID) -> usize {
        find_by(&self.events, |e| e.user_id == *user_id).len()
    }
}
