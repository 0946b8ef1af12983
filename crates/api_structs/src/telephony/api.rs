use serde::{Deserialize, Serialize};

pub mod status_callback {
    use super::*;

    /// Form payload Twilio POSTs on every call status transition
    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "PascalCase")]
    pub struct RequestBody {
        pub call_sid: String,
        pub call_status: String,
        pub from: String,
        pub to: String,
    }
}
