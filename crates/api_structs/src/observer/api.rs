use crate::dtos::{CallStatusUpdateDTO, ReminderResultDTO};
use serde::{Deserialize, Serialize};

pub mod connect_observer {
    use super::*;
    use callward_domain::ID;

    /// Supplied by the observer when opening the socket; the user id picks
    /// which user's reminders it wants to follow, the phone number
    /// additionally subscribes it to call status updates for that number
    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct QueryParams {
        pub user_id: ID,
        pub phone_number: Option<String>,
    }
}

/// Messages the server pushes to a connected observer, serialized as
/// `{"event": …, "data": …}` frames
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum ObserverMessage {
    /// Full replacement snapshot after a completed polling cycle, and the
    /// first message delivered on connect
    #[serde(rename = "newJobResult")]
    NewJobResult(Vec<ReminderResultDTO>),
    #[serde(rename = "call-status-update")]
    CallStatusUpdate(CallStatusUpdateDTO),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_job_result_frames() {
        let json = serde_json::to_string(&ObserverMessage::NewJobResult(vec![]))
            .expect("To serialize frame");
        assert_eq!(json, r#"{"event":"newJobResult","data":[]}"#);
    }
}
