use crate::shared::entity::ID;
use crate::{ScheduledEvent, User};

/// The outcome of one `(user, matched event)` pair, or of a user level
/// failure, during a single polling cycle. A full list of these is published
/// to live observers after every cycle and cached for late joiners.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderResult {
    pub user_id: ID,
    pub user_email: String,
    pub event_id: Option<ID>,
    pub event_name: Option<String>,
    pub phone_number: Option<String>,
    /// Provider call id, set when the dispatch was accepted
    pub call_sid: Option<String>,
    pub timestamp: i64,
    pub success: bool,
    pub error: Option<String>,
}

impl ReminderResult {
    pub fn dispatched(user: &User, event: &ScheduledEvent, call_sid: String, now: i64) -> Self {
        Self {
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            event_id: Some(event.id.clone()),
            event_name: Some(event.name.clone()),
            phone_number: Some(event.phone_number.clone()),
            call_sid: Some(call_sid),
            timestamp: now,
            success: true,
            error: None,
        }
    }

    pub fn dispatch_failed(user: &User, event: &ScheduledEvent, error: String, now: i64) -> Self {
        Self {
            user_id: user.id.clone(),
            user_email: user.email.clone(),
            event_id: Some(event.id.clone()),
            event_name: Some(event.name.clone()),
            phone_number: Some(event.phone_number.clone()),
            call_sid: None,
            timestamp: now,
            success: false,
            error: Some(error),
        }
    }

    pub fn user_failed(user_id: ID, user_email: String, error: String, now: i64) -> Self {
        Self {
            user_id,
            user_email,
            event_id: None,
            event_name: None,
            phone_number: None,
            call_sid: None,
            timestamp: now,
            success: false,
            error: Some(error),
        }
    }
}

/// Progress report for a dispatched call, delivered by the telephony
/// provider to the status callback endpoint and forwarded to observers
/// registered for the destination phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatusUpdate {
    pub call_sid: String,
    pub call_status: String,
    pub from: String,
    pub to: String,
    pub timestamp: i64,
}
