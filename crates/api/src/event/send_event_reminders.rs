use crate::shared::usecase::UseCase;
use callward_domain::{ReminderResult, ID};
use callward_infra::{CallDispatch, Context};
use std::time::Duration;
use tracing::{error, warn};

/// The reminder core. Polls the calendar provider for every eligible user,
/// matches upcoming provider events against locally stored events and
/// dispatches one reminder call per fresh match. Driven once per minute by
/// the job scheduler; the complete result list of a run is published as a
/// single snapshot.
#[derive(Debug)]
pub struct SendEventRemindersUseCase;

// Only a failure to acquire the eligibility set itself could abort a cycle,
// and the broadcaster derives it in-process. Every per-user error is
// contained as a failed `ReminderResult` instead.
#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for SendEventRemindersUseCase {
    type Response = Vec<ReminderResult>;

    type Error = UseCaseError;

    const NAME: &'static str = "SendEventReminders";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let eligible_users = ctx.broadcaster.eligible_user_ids();
        if eligible_users.is_empty() {
            // Nobody is watching: skip the whole cycle without a single
            // provider call
            return Ok(Vec::new());
        }

        // Ledger entries only matter while their occurrence can still be
        // inside the lookahead window of a later cycle
        let now = ctx.sys.get_timestamp_millis();
        ctx.repos
            .call_dispatches
            .delete_all_before(now - 2 * ctx.config.reminder_lookahead_millis)
            .await;

        let deadline = Duration::from_millis(ctx.config.poll_user_deadline_millis);
        let mut results = Vec::new();
        for user_id in eligible_users {
            // A stalled provider call must not hold up the users after this
            // one for the rest of the cycle
            match tokio::time::timeout(deadline, poll_user(&user_id, ctx)).await {
                Ok(user_results) => results.extend(user_results),
                Err(_) => {
                    warn!("Reminder polling timed out for user {}", user_id);
                    let user_email = ctx
                        .repos
                        .users
                        .find(&user_id)
                        .await
                        .map(|u| u.email)
                        .unwrap_or_default();
                    results.push(ReminderResult::user_failed(
                        user_id,
                        user_email,
                        format!(
                            "polling timed out after {}ms",
                            ctx.config.poll_user_deadline_millis
                        ),
                        ctx.sys.get_timestamp_millis(),
                    ));
                }
            }
        }

        Ok(results)
    }
}

/// Handles one user's polling pipeline. Every failure in here is contained
/// as a failed result so the cycle always continues with the next user.
async fn poll_user(user_id: &ID, ctx: &Context) -> Vec<ReminderResult> {
    let now = ctx.sys.get_timestamp_millis();
    let user = match ctx.repos.users.find(user_id).await {
        Some(user) => user,
        None => {
            return vec![ReminderResult::user_failed(
                user_id.clone(),
                String::new(),
                "User was not found".into(),
                now,
            )]
        }
    };

    let provider_events = match ctx.gateways.calendar.list_upcoming(&user.id).await {
        Ok(provider_events) => provider_events,
        Err(e) => {
            error!(
                "Unable to fetch upcoming events for user {}. Error: {}",
                user.email, e
            );
            return vec![ReminderResult::user_failed(
                user.id.clone(),
                user.email.clone(),
                e.to_string(),
                now,
            )];
        }
    };

    let mut results = Vec::new();
    for provider_event in provider_events {
        // Without an id the occurrence cannot be correlated with anything
        if provider_event.id.is_empty() {
            continue;
        }

        let event = match ctx
            .repos
            .events
            .find_by_google_event_id(&provider_event.id, &user.id)
            .await
        {
            Some(event) => event,
            // Not an event this system tracks
            None => continue,
        };

        if ctx
            .repos
            .call_dispatches
            .find(&user.id, &provider_event.id)
            .await
            .is_some()
        {
            // Already called for this occurrence on an earlier cycle
            continue;
        }

        let timestamp = ctx.sys.get_timestamp_millis();
        match ctx
            .gateways
            .voice
            .place_call(&event.phone_number, &event.reminder_message())
            .await
        {
            Ok(handle) => {
                if let Err(e) = ctx
                    .repos
                    .call_dispatches
                    .insert(&CallDispatch {
                        user_id: user.id.clone(),
                        google_event_id: provider_event.id.clone(),
                        dispatched_at: timestamp,
                    })
                    .await
                {
                    warn!("Unable to record dispatched call: {:?}", e);
                }
                results.push(ReminderResult::dispatched(
                    &user,
                    &event,
                    handle.sid,
                    timestamp,
                ));
            }
            Err(e) => {
                error!(
                    "Unable to dispatch reminder call for user {}. Error: {}",
                    user.email, e
                );
                // Not recorded in the ledger, so the next cycle retries
                // while the occurrence stays inside the lookahead window
                results.push(ReminderResult::dispatch_failed(
                    &user,
                    &event,
                    e.to_string(),
                    timestamp,
                ));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::usecase::execute;
    use callward_domain::{ScheduledEvent, User};
    use callward_infra::{
        setup_context_inmemory, Gateways, InMemoryCalendarGateway, InMemoryVoiceGateway,
        ObserverEvent, ProviderEvent,
    };
    use std::sync::Arc;
    use tokio::sync::mpsc::unbounded_channel;

    struct TestContext {
        ctx: Context,
        calendar: Arc<InMemoryCalendarGateway>,
        voice: Arc<InMemoryVoiceGateway>,
    }

    fn setup() -> TestContext {
        let mut ctx = setup_context_inmemory();
        let calendar = Arc::new(InMemoryCalendarGateway::new());
        let voice = Arc::new(InMemoryVoiceGateway::new());
        ctx.gateways = Gateways {
            calendar: calendar.clone(),
            voice: voice.clone(),
        };
        TestContext {
            ctx,
            calendar,
            voice,
        }
    }

    async fn observed_user(ctx: &Context, email: &str) -> User {
        let user = User::new(email.into(), "Test".into(), 0);
        ctx.repos.users.insert(&user).await.expect("To insert user");
        let (tx, rx) = unbounded_channel();
        ctx.broadcaster.register(user.id.clone(), None, tx);
        // The receiver is dropped on purpose: observer delivery is fire and
        // forget and must not influence the poll loop
        drop(rx);
        user
    }

    fn stored_event(user: &User, google_event_id: &str) -> ScheduledEvent {
        ScheduledEvent {
            id: Default::default(),
            user_id: user.id.clone(),
            name: "Dentist".into(),
            description: None,
            // 2021-03-01T10:30:00Z
            start_ts: 1614594600000,
            end_ts: 1614596400000,
            phone_number: "+15551234567".into(),
            email: user.email.clone(),
            google_event_id: google_event_id.into(),
            created: 0,
            updated: 0,
        }
    }

    fn provider_event(id: &str) -> ProviderEvent {
        ProviderEvent {
            id: id.into(),
            summary: "Dentist".into(),
            start_ts: 1614594600000,
            end_ts: 1614596400000,
        }
    }

    #[actix_web::main]
    #[test]
    async fn skips_cycle_when_no_users_are_eligible() {
        let TestContext {
            ctx,
            calendar,
            voice,
        } = setup();

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        assert!(results.is_empty());
        assert_eq!(calendar.list_call_count(), 0);
        assert!(voice.calls().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn dispatches_call_for_matched_event() {
        let TestContext {
            ctx,
            calendar,
            voice,
        } = setup();
        let user = observed_user(&ctx, "ada@example.com").await;
        let event = stored_event(&user, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(user.id.clone(), vec![provider_event("g1")]);

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(results[0].user_id, user.id);
        assert_eq!(results[0].event_name, Some("Dentist".into()));
        assert_eq!(results[0].phone_number, Some("+15551234567".into()));
        assert!(results[0].call_sid.is_some());

        let calls = voice.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].to, "+15551234567");
        assert_eq!(calls[0].message, "Reminder: Dentist at 2021-03-01 10:30 UTC");
    }

    #[actix_web::main]
    #[test]
    async fn silently_skips_untracked_provider_events() {
        let TestContext { ctx, calendar, voice } = setup();
        let user = observed_user(&ctx, "ada@example.com").await;
        calendar.set_upcoming(user.id.clone(), vec![provider_event("g2")]);

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        assert!(results.is_empty());
        assert!(voice.calls().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn skips_provider_events_without_an_id() {
        let TestContext { ctx, calendar, voice } = setup();
        let user = observed_user(&ctx, "ada@example.com").await;
        let event = stored_event(&user, "");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(user.id.clone(), vec![provider_event("")]);

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        assert!(results.is_empty());
        assert!(voice.calls().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn contains_credential_failure_to_the_affected_user() {
        let TestContext {
            ctx,
            calendar,
            voice,
        } = setup();
        let broken = observed_user(&ctx, "broken@example.com").await;
        let healthy = observed_user(&ctx, "healthy@example.com").await;

        calendar.break_credentials(broken.id.clone());
        let event = stored_event(&healthy, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(healthy.id.clone(), vec![provider_event("g1")]);

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        // Results follow the eligibility enumeration order
        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert_eq!(results[0].user_id, broken.id);
        assert!(results[0].error.is_some());
        assert!(results[1].success);
        assert_eq!(results[1].user_id, healthy.id);
        assert_eq!(voice.calls().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn does_not_redispatch_a_successful_call_on_later_cycles() {
        let TestContext { ctx, calendar, voice } = setup();
        let user = observed_user(&ctx, "ada@example.com").await;
        let event = stored_event(&user, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(user.id.clone(), vec![provider_event("g1")]);

        // The occurrence stays inside the sliding lookahead window for
        // several consecutive cycles
        for _ in 0..5 {
            execute(SendEventRemindersUseCase, &ctx)
                .await
                .expect("Cycle to complete");
        }

        assert_eq!(voice.calls().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn retries_a_failed_dispatch_on_the_next_cycle() {
        let TestContext { ctx, calendar, voice } = setup();
        let user = observed_user(&ctx, "ada@example.com").await;
        let event = stored_event(&user, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(user.id.clone(), vec![provider_event("g1")]);

        voice.fail_dispatch(true);
        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert_eq!(results[0].event_name, Some("Dentist".into()));

        voice.fail_dispatch(false);
        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");
        assert_eq!(results.len(), 1);
        assert!(results[0].success);
        assert_eq!(voice.calls().len(), 1);
    }

    #[actix_web::main]
    #[test]
    async fn never_matches_another_users_stored_event() {
        let TestContext { ctx, calendar, voice } = setup();
        let owner = User::new("owner@example.com".into(), "Owner".into(), 0);
        ctx.repos
            .users
            .insert(&owner)
            .await
            .expect("To insert user");
        let observer = observed_user(&ctx, "other@example.com").await;

        // The stored event belongs to `owner`, but only `observer` is
        // eligible and their provider feed carries the same event id
        let event = stored_event(&owner, "g1");
        ctx.repos
            .events
            .insert(&event)
            .await
            .expect("To insert event");
        calendar.set_upcoming(observer.id.clone(), vec![provider_event("g1")]);

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");

        assert!(results.is_empty());
        assert!(voice.calls().is_empty());
    }

    #[actix_web::main]
    #[test]
    async fn observers_receive_the_published_snapshot() {
        let TestContext { ctx, calendar, .. } = setup();
        let user = User::new("ada@example.com".into(), "Ada".into(), 0);
        ctx.repos.users.insert(&user).await.expect("To insert user");
        let (tx, mut rx) = unbounded_channel();
        ctx.broadcaster.register(user.id.clone(), None, tx);
        rx.try_recv().expect("Snapshot on connect");

        calendar.break_credentials(user.id.clone());

        let results = execute(SendEventRemindersUseCase, &ctx)
            .await
            .expect("Cycle to complete");
        ctx.broadcaster.publish(results);

        match rx.try_recv().expect("Published snapshot") {
            ObserverEvent::JobResult(results) => {
                assert_eq!(results.len(), 1);
                assert!(!results[0].success);
                assert_eq!(results[0].user_email, "ada@example.com");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }
}
