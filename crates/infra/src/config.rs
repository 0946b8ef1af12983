use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Google OAuth client used both for the consent flow and for
    /// refreshing user access tokens. `None` disables everything that
    /// talks to Google.
    pub google: Option<GoogleOAuthConfig>,
    pub twilio: TwilioConfig,
    /// How far ahead of "now" the reminder job asks the calendar provider
    /// for upcoming events
    pub reminder_lookahead_millis: i64,
    /// Wall-clock seconds between reminder job runs
    pub reminder_interval_secs: u64,
    /// Deadline for a single user's polling pipeline within one run, so a
    /// stalled provider call cannot block the users after it forever
    pub poll_user_deadline_millis: u64,
}

#[derive(Debug, Clone)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    /// The caller id reminder calls are placed from
    pub from_number: Option<String>,
    /// Where Twilio should POST call status updates
    pub status_callback_url: String,
}

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let google = match (
            std::env::var("GOOGLE_CLIENT_ID"),
            std::env::var("GOOGLE_CLIENT_SECRET"),
        ) {
            (Ok(client_id), Ok(client_secret)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_uri: std::env::var("GOOGLE_REDIRECT_URI").unwrap_or_else(|_| {
                    format!("http://localhost:{}/auth/google/callback", port)
                }),
            }),
            _ => {
                info!("Did not find GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET environment variables. Google integration is disabled.");
                None
            }
        };

        let twilio = TwilioConfig {
            account_sid: std::env::var("TWILIO_ACCOUNT_SID").ok(),
            auth_token: std::env::var("TWILIO_AUTH_TOKEN").ok(),
            from_number: std::env::var("TWILIO_PHONE_NUMBER").ok(),
            status_callback_url: std::env::var("STATUS_CALLBACK_URL").unwrap_or_else(|_| {
                format!("http://localhost:{}/twilio/status-callback", port)
            }),
        };

        Self {
            port,
            google,
            twilio,
            reminder_lookahead_millis: 1000 * 60 * 5,
            reminder_interval_secs: 60,
            poll_user_deadline_millis: 1000 * 30,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
