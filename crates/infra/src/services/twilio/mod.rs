mod voice_api;

use crate::services::{CallHandle, IVoiceGateway, VoiceError};
use crate::TwilioConfig;
use voice_api::{CreateCallRequest, TwilioRestApi, TWILIO_API_BASE_URL};

// https://www.twilio.com/docs/voice/api/call-resource

pub struct TwilioVoiceGateway {
    config: TwilioConfig,
    base_url: String,
}

impl TwilioVoiceGateway {
    pub fn new(config: TwilioConfig) -> Self {
        Self::with_base_url(config, TWILIO_API_BASE_URL.to_string())
    }

    pub fn with_base_url(config: TwilioConfig, base_url: String) -> Self {
        Self { config, base_url }
    }
}

/// Minimal escaping for text interpolated into the `<Say>` verb
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[async_trait::async_trait]
impl IVoiceGateway for TwilioVoiceGateway {
    async fn place_call(&self, to: &str, message: &str) -> Result<CallHandle, VoiceError> {
        let (account_sid, auth_token, from_number) = match (
            &self.config.account_sid,
            &self.config.auth_token,
            &self.config.from_number,
        ) {
            (Some(sid), Some(token), Some(from)) => (sid.clone(), token.clone(), from.clone()),
            _ => {
                return Err(VoiceError::ConfigMissing(
                    "Twilio account sid, auth token and phone number must be set".into(),
                ))
            }
        };

        let api = TwilioRestApi::new(account_sid, auth_token, self.base_url.clone());
        let req = CreateCallRequest {
            to: to.to_string(),
            from: from_number,
            twiml: format!("<Response><Say>{}</Say></Response>", escape_xml(message)),
            status_callback: self.config.status_callback_url.clone(),
        };

        let res = api
            .create_call(&req)
            .await
            .map_err(|e| VoiceError::DispatchFailed(e.to_string()))?;

        Ok(CallHandle {
            sid: res.sid,
            status: res.status,
        })
    }
}
