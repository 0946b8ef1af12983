use callward_domain::{CallStatusUpdate, ReminderResult, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResultDTO {
    pub user_id: ID,
    pub user_email: String,
    pub event_id: Option<ID>,
    pub event_name: Option<String>,
    pub phone_number: Option<String>,
    pub call_sid: Option<String>,
    pub timestamp: i64,
    pub success: bool,
    pub error: Option<String>,
}

impl ReminderResultDTO {
    pub fn new(result: ReminderResult) -> Self {
        Self {
            user_id: result.user_id,
            user_email: result.user_email,
            event_id: result.event_id,
            event_name: result.event_name,
            phone_number: result.phone_number,
            call_sid: result.call_sid,
            timestamp: result.timestamp,
            success: result.success,
            error: result.error,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CallStatusUpdateDTO {
    pub call_sid: String,
    pub call_status: String,
    pub from: String,
    pub to: String,
    pub timestamp: i64,
}

impl CallStatusUpdateDTO {
    pub fn new(update: CallStatusUpdate) -> Self {
        Self {
            call_sid: update.call_sid,
            call_status: update.call_status,
            from: update.from,
            to: update.to,
            timestamp: update.timestamp,
        }
    }
}
