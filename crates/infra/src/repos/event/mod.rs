mod inmemory;

use callward_domain::{ScheduledEvent, ID};
pub use inmemory::InMemoryScheduledEventRepo;

#[async_trait::async_trait]
pub trait IScheduledEventRepo: Send + Sync {
    async fn insert(&self, event: &ScheduledEvent) -> anyhow::Result<()>;
    async fn save(&self, event: &ScheduledEvent) -> anyhow::Result<()>;
    async fn delete(&self, event_id: &ID) -> Option<ScheduledEvent>;
    async fn find(&self, event_id: &ID) -> Option<ScheduledEvent>;
    /// The event mirrored by the given provider event id, scoped to one
    /// user so that another user's poll can never match it
    async fn find_by_google_event_id(
        &self,
        google_event_id: &str,
        user_id: &ID,
    ) -> Option<ScheduledEvent>;
    /// Page of the user's events, newest start first
    async fn find_by_user(&self, user_id: &ID, skip: usize, limit: usize) -> Vec<ScheduledEvent>;
    async fn count_by_user(&self, user_id: &ID) -> usize;
}

#[cfg(test)]
mod tests {
    use crate::setup_context_inmemory;
    use callward_domain::ScheduledEvent;

    fn event_factory(user_id: &callward_domain::ID, google_event_id: &str) -> ScheduledEvent {
        ScheduledEvent {
            id: Default::default(),
            user_id: user_id.clone(),
            name: "Dentist".into(),
            description: None,
            start_ts: 1000 * 60,
            end_ts: 1000 * 60 * 31,
            phone_number: "+15551234567".into(),
            email: "ada@example.com".into(),
            google_event_id: google_event_id.into(),
            created: 0,
            updated: 0,
        }
    }

    #[tokio::test]
    async fn matches_google_event_id_per_user() {
        let ctx = setup_context_inmemory();

        let owner = Default::default();
        let other = Default::default();
        let event = event_factory(&owner, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");

        let found = ctx
            .repos
            .events
            .find_by_google_event_id("g1", &owner)
            .await
            .expect("To find event");
        assert_eq!(found.id, event.id);

        // Same provider event id under a different user must not match
        assert!(ctx
            .repos
            .events
            .find_by_google_event_id("g1", &other)
            .await
            .is_none());
        assert!(ctx
            .repos
            .events
            .find_by_google_event_id("g2", &owner)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn pages_user_events_newest_first() {
        let ctx = setup_context_inmemory();

        let user_id = Default::default();
        for i in 0..5 {
            let mut event = event_factory(&user_id, &format!("g{}", i));
            event.start_ts = i * 1000;
            ctx.repos
                .events
                .insert(&event)
                .await
                .expect("To insert event");
        }

        assert_eq!(ctx.repos.events.count_by_user(&user_id).await, 5);

        let page = ctx.repos.events.find_by_user(&user_id, 0, 2).await;
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].google_event_id, "g4");
        assert_eq!(page[1].google_event_id, "g3");

        let page = ctx.repos.events.find_by_user(&user_id, 4, 2).await;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].google_event_id, "g0");
    }
}
