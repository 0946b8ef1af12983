pub mod auth_provider;
mod calendar_api;

use crate::repos::Repos;
use crate::services::{CalendarError, ICalendarGateway, ProviderEvent, ProviderEventSpec};
use crate::system::ISys;
use crate::Config;
use callward_domain::ID;
use calendar_api::{
    GoogleCalendarEvent, GoogleCalendarEventAttributes, GoogleCalendarEventDateTime,
    GoogleCalendarRestApi, GOOGLE_API_BASE_URL,
};
use std::sync::Arc;

// https://developers.google.com/calendar/v3/reference/events

pub struct GoogleCalendarGateway {
    config: Config,
    repos: Repos,
    sys: Arc<dyn ISys>,
    api_base_url: String,
    token_endpoint: String,
}

impl GoogleCalendarGateway {
    pub fn new(config: Config, repos: Repos, sys: Arc<dyn ISys>) -> Self {
        Self::with_endpoints(
            config,
            repos,
            sys,
            GOOGLE_API_BASE_URL.to_string(),
            auth_provider::TOKEN_ENDPOINT.to_string(),
        )
    }

    /// Endpoints are injectable so the REST wrappers can be exercised
    /// against a local mock server
    pub fn with_endpoints(
        config: Config,
        repos: Repos,
        sys: Arc<dyn ISys>,
        api_base_url: String,
        token_endpoint: String,
    ) -> Self {
        Self {
            config,
            repos,
            sys,
            api_base_url,
            token_endpoint,
        }
    }

    async fn fresh_api(&self, user_id: &ID) -> Result<GoogleCalendarRestApi, CalendarError> {
        let access_token = auth_provider::get_valid_access_token(
            user_id,
            &self.repos,
            &self.config,
            &self.token_endpoint,
        )
        .await?;
        Ok(GoogleCalendarRestApi::new(
            access_token,
            self.api_base_url.clone(),
        ))
    }
}

fn into_provider_event(event: GoogleCalendarEvent) -> ProviderEvent {
    ProviderEvent {
        start_ts: event.start.get_timestamp_millis(),
        end_ts: event.end.get_timestamp_millis(),
        id: event.id,
        summary: event.summary,
    }
}

#[async_trait::async_trait]
impl ICalendarGateway for GoogleCalendarGateway {
    async fn list_upcoming(&self, user_id: &ID) -> Result<Vec<ProviderEvent>, CalendarError> {
        let api = self.fresh_api(user_id).await?;

        let time_min = self.sys.get_timestamp_millis();
        let time_max = time_min + self.config.reminder_lookahead_millis;
        let res = api
            .list_events(time_min, time_max)
            .await
            .map_err(|e| CalendarError::FetchFailed(e.to_string()))?;

        Ok(res.items.into_iter().map(into_provider_event).collect())
    }

    async fn insert(
        &self,
        user_id: &ID,
        spec: &ProviderEventSpec,
    ) -> Result<ProviderEvent, CalendarError> {
        let api = self.fresh_api(user_id).await?;

        let body = GoogleCalendarEventAttributes {
            start: GoogleCalendarEventDateTime::new(spec.start_ts),
            end: GoogleCalendarEventDateTime::new(spec.end_ts),
            summary: spec.summary.clone(),
            description: spec.description.clone(),
        };
        let created = api
            .insert(&body)
            .await
            .map_err(|e| CalendarError::WriteFailed(e.to_string()))?;

        Ok(into_provider_event(created))
    }
}
