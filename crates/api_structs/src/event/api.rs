use crate::dtos::{PaginationDTO, ScheduledEventDTO};
use callward_domain::{ScheduledEvent, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledEventResponse {
    pub event: ScheduledEventDTO,
}

impl ScheduledEventResponse {
    pub fn new(event: ScheduledEvent) -> Self {
        Self {
            event: ScheduledEventDTO::new(event),
        }
    }
}

pub mod create_event {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub user_id: ID,
        pub name: String,
        pub description: Option<String>,
        pub start_ts: i64,
        pub end_ts: i64,
        pub phone_number: String,
    }

    pub type APIResponse = ScheduledEventResponse;
}

pub mod list_events {
    use super::*;

    #[derive(Serialize, Deserialize, Debug)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub user_id: ID,
        pub page: Option<usize>,
        pub limit: Option<usize>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub events: Vec<ScheduledEventDTO>,
        pub pagination: PaginationDTO,
    }

    impl APIResponse {
        pub fn new(events: Vec<ScheduledEvent>, pagination: PaginationDTO) -> Self {
            Self {
                events: events.into_iter().map(ScheduledEventDTO::new).collect(),
                pagination,
            }
        }
    }
}
