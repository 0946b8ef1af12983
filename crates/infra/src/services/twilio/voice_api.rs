use reqwest::Client;
use serde::Deserialize;
use tracing::error;

pub const TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct CreateCallRequest {
    pub to: String,
    pub from: String,
    pub twiml: String,
    pub status_callback: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateCallResponse {
    pub sid: String,
    pub status: String,
}

pub struct TwilioRestApi {
    client: Client,
    account_sid: String,
    auth_token: String,
    base_url: String,
}

impl TwilioRestApi {
    pub fn new(account_sid: String, auth_token: String, base_url: String) -> Self {
        let client = Client::new();

        Self {
            client,
            account_sid,
            auth_token,
            base_url,
        }
    }

    /// Enqueues an outbound call. Twilio answers as soon as the call is
    /// accepted; ringing, answer and completion arrive later on the status
    /// callback url.
    pub async fn create_call(&self, req: &CreateCallRequest) -> anyhow::Result<CreateCallResponse> {
        let params = [
            ("To", req.to.as_str()),
            ("From", req.from.as_str()),
            ("Twiml", req.twiml.as_str()),
            ("StatusCallback", req.status_callback.as_str()),
            ("StatusCallbackEvent", "initiated"),
            ("StatusCallbackEvent", "ringing"),
            ("StatusCallbackEvent", "answered"),
            ("StatusCallbackEvent", "completed"),
            ("StatusCallbackMethod", "POST"),
        ];
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.base_url, self.account_sid
        );

        let res = match self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => {
                error!("[Network Error] Twilio API POST error. Error message: {:?}", e);
                return Err(anyhow::Error::new(e));
            }
        };

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            error!(
                "[Unexpected Response] Twilio API returned {}. Body: {}",
                status, body
            );
            anyhow::bail!("twilio returned {}: {}", status, body);
        }

        res.json::<CreateCallResponse>().await.map_err(|e| {
            error!(
                "[Unexpected Response] Twilio API POST error. Error message: {:?}",
                e
            );
            anyhow::Error::new(e)
        })
    }
}
