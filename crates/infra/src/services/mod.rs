pub mod google_calendar;
mod inmemory;
pub mod twilio;

pub use inmemory::{InMemoryCalendarGateway, InMemoryVoiceGateway, PlacedCall};

use crate::repos::Repos;
use crate::system::ISys;
use crate::Config;
use callward_domain::ID;
use google_calendar::GoogleCalendarGateway;
use std::sync::Arc;
use thiserror::Error;
use twilio::TwilioVoiceGateway;

/// An upcoming occurrence as returned by the calendar provider. Not
/// persisted; lives only for the duration of one polling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEvent {
    /// Provider event id, may be empty for malformed provider payloads
    pub id: String,
    pub summary: String,
    pub start_ts: i64,
    pub end_ts: i64,
}

/// Attributes for an event to be created with the calendar provider
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEventSpec {
    pub summary: String,
    pub description: String,
    pub start_ts: i64,
    pub end_ts: i64,
}

/// Provider call id and initial status returned when an outbound call was
/// accepted. Call completion arrives later through the status callback
/// webhook, never through this handle.
#[derive(Debug, Clone, PartialEq)]
pub struct CallHandle {
    pub sid: String,
    pub status: String,
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("User was not found")]
    UserNotFound,
    #[error("User has not connected a Google account")]
    NoCredential,
    #[error("Unable to refresh access token: {0}")]
    RefreshFailed(String),
}

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("Unable to fetch upcoming events from the calendar provider: {0}")]
    FetchFailed(String),
    #[error("The calendar provider rejected the event: {0}")]
    WriteFailed(String),
}

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Telephony is not configured: {0}")]
    ConfigMissing(String),
    #[error("The telephony provider rejected the call: {0}")]
    DispatchFailed(String),
}

/// Capability contract over the external calendar provider. Every call
/// obtains a fresh access token for the user first; a credential failure is
/// reported without the provider API being contacted at all.
#[async_trait::async_trait]
pub trait ICalendarGateway: Send + Sync {
    /// Single, time-ordered occurrences starting within the lookahead
    /// window `[now, now + lookahead)` of the user's primary calendar.
    /// An empty list is a valid, non-error result.
    async fn list_upcoming(&self, user_id: &ID) -> Result<Vec<ProviderEvent>, CalendarError>;
    /// Creates an event in the user's primary calendar
    async fn insert(
        &self,
        user_id: &ID,
        spec: &ProviderEventSpec,
    ) -> Result<ProviderEvent, CalendarError>;
}

/// Capability contract over the external voice provider. `place_call`
/// enqueues the call and returns as soon as the provider accepts it.
#[async_trait::async_trait]
pub trait IVoiceGateway: Send + Sync {
    async fn place_call(&self, to: &str, message: &str) -> Result<CallHandle, VoiceError>;
}

#[derive(Clone)]
pub struct Gateways {
    pub calendar: Arc<dyn ICalendarGateway>,
    pub voice: Arc<dyn IVoiceGateway>,
}

impl Gateways {
    pub fn create_live(config: &Config, repos: Repos, sys: Arc<dyn ISys>) -> Self {
        Self {
            calendar: Arc::new(GoogleCalendarGateway::new(config.clone(), repos, sys)),
            voice: Arc::new(TwilioVoiceGateway::new(config.twilio.clone())),
        }
    }

    pub fn create_inmemory() -> Self {
        Self {
            calendar: Arc::new(InMemoryCalendarGateway::new()),
            voice: Arc::new(InMemoryVoiceGateway::new()),
        }
    }
}
