use crate::error::CallwardError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use callward_api_structs::create_event::*;
use callward_domain::{ScheduledEvent, ID};
use callward_infra::{Context, ProviderEventSpec};

pub async fn create_event_controller(
    body: web::Json<RequestBody>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, CallwardError> {
    let body = body.0;
    let usecase = CreateEventUseCase {
        user_id: body.user_id,
        name: body.name,
        description: body.description,
        start_ts: body.start_ts,
        end_ts: body.end_ts,
        phone_number: body.phone_number,
    };

    execute(usecase, &ctx)
        .await
        .map(|event| HttpResponse::Created().json(APIResponse::new(event)))
        .map_err(CallwardError::from)
}

/// Mirrors the event into the owner's Google Calendar first and only then
/// stores the local record, so a stored event always carries the provider
/// event id the reminder job matches on.
#[derive(Debug)]
pub struct CreateEventUseCase {
    pub user_id: ID,
    pub name: String,
    pub description: Option<String>,
    pub start_ts: i64,
    pub end_ts: i64,
    pub phone_number: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidTimespan,
    MissingFields,
    UserNotFound(ID),
    CalendarWrite(String),
    StorageError,
}

impl From<UseCaseError> for CallwardError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidTimespan => {
                Self::BadClientData("The event has to end after it starts".into())
            }
            UseCaseError::MissingFields => {
                Self::BadClientData("Both a name and a phone number must be provided".into())
            }
            UseCaseError::UserNotFound(user_id) => {
                Self::NotFound(format!("The user with id: {}, was not found.", user_id))
            }
            UseCaseError::CalendarWrite(e) => {
                Self::Conflict(format!("Unable to create the calendar event: {}", e))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateEventUseCase {
    type Response = ScheduledEvent;

    type Error = UseCaseError;

    const NAME: &'static str = "CreateEvent";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        if self.name.trim().is_empty() || self.phone_number.trim().is_empty() {
            return Err(UseCaseError::MissingFields);
        }
        if self.end_ts <= self.start_ts {
            return Err(UseCaseError::InvalidTimespan);
        }

        let user = match ctx.repos.users.find(&self.user_id).await {
            Some(user) => user,
            None => return Err(UseCaseError::UserNotFound(self.user_id.clone())),
        };

        let spec = ProviderEventSpec {
            summary: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
        };
        let provider_event = ctx
            .gateways
            .calendar
            .insert(&user.id, &spec)
            .await
            .map_err(|e| UseCaseError::CalendarWrite(e.to_string()))?;
        if provider_event.id.is_empty() {
            return Err(UseCaseError::CalendarWrite(
                "the provider returned an event without an id".into(),
            ));
        }

        let event = ScheduledEvent {
            id: Default::default(),
            user_id: user.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            start_ts: self.start_ts,
            end_ts: self.end_ts,
            phone_number: self.phone_number.clone(),
            email: user.email,
            google_event_id: provider_event.id,
            created: ctx.sys.get_timestamp_millis(),
            updated: ctx.sys.get_timestamp_millis(),
        };
        ctx.repos
            .events
            .insert(&event)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(event)
    }
}
