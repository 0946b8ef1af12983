use crate::shared::entity::{Entity, ID};
use chrono::{TimeZone, Utc};

/// A locally stored event that should trigger an outbound reminder call
/// shortly before `start_ts`. Created by the event creation endpoint after
/// the event has been inserted into the owner's Google Calendar, and only
/// read by the reminder job.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub start_ts: i64,
    pub end_ts: i64,
    /// Destination for the reminder call
    pub phone_number: String,
    /// Contact email, copied from the owning user at creation time
    pub email: String,
    /// Id of the mirrored event in the owner's Google Calendar.
    /// Unique per user.
    pub google_event_id: String,
    pub created: i64,
    pub updated: i64,
}

impl ScheduledEvent {
    /// The message spoken by the outbound reminder call.
    pub fn reminder_message(&self) -> String {
        let start = Utc
            .timestamp_millis_opt(self.start_ts)
            .single()
            .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| self.start_ts.to_string());
        format!("Reminder: {} at {}", self.name, start)
    }
}

impl Entity for ScheduledEvent {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_factory(name: &str, start_ts: i64) -> ScheduledEvent {
        ScheduledEvent {
            id: Default::default(),
            user_id: Default::default(),
            name: name.into(),
            description: None,
            start_ts,
            end_ts: start_ts + 1000 * 60 * 30,
            phone_number: "+15551234567".into(),
            email: "dentist@example.com".into(),
            google_event_id: "g1".into(),
            created: 0,
            updated: 0,
        }
    }

    #[test]
    fn reminder_message_contains_name_and_start() {
        // 2021-03-01T10:30:00Z
        let event = event_factory("Dentist", 1614594600000);
        assert_eq!(
            event.reminder_message(),
            "Reminder: Dentist at 2021-03-01 10:30 UTC"
        );
    }
}
