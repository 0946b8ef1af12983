use callward_domain::{ScheduledEvent, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEventDTO {
    pub id: ID,
    pub user_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub start_ts: i64,
    pub end_ts: i64,
    pub phone_number: String,
    pub email: String,
    pub google_event_id: String,
    pub created: i64,
    pub updated: i64,
}

impl ScheduledEventDTO {
    pub fn new(event: ScheduledEvent) -> Self {
        Self {
            id: event.id,
            user_id: event.user_id,
            name: event.name,
            description: event.description,
            start_ts: event.start_ts,
            end_ts: event.end_ts,
            phone_number: event.phone_number,
            email: event.email,
            google_event_id: event.google_event_id,
            created: event.created,
            updated: event.updated,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaginationDTO {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}
