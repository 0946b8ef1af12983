use serde::{Deserialize, Serialize};

pub mod google_callback {
    use super::*;
    use callward_domain::ID;

    #[derive(Debug, Deserialize)]
    pub struct QueryParams {
        pub code: Option<String>,
    }

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        pub user_id: ID,
        pub email: String,
        pub name: String,
    }
}
