use crate::error::CallwardError;
use crate::shared::usecase::{execute, UseCase};
use actix_web::{web, HttpResponse};
use callward_api_structs::dtos::PaginationDTO;
use callward_api_structs::list_events::*;
use callward_domain::{ScheduledEvent, ID};
use callward_infra::Context;

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

pub async fn list_events_controller(
    query: web::Query<QueryParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, CallwardError> {
    let query = query.into_inner();
    let usecase = ListEventsUseCase {
        user_id: query.user_id,
        page: query.page.unwrap_or(1).max(1),
        limit: query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE),
    };

    execute(usecase, &ctx)
        .await
        .map(|res| HttpResponse::Ok().json(APIResponse::new(res.events, res.pagination)))
        .map_err(|_| CallwardError::InternalError)
}

#[derive(Debug)]
pub struct ListEventsUseCase {
    pub user_id: ID,
    pub page: usize,
    pub limit: usize,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub events: Vec<ScheduledEvent>,
    pub pagination: PaginationDTO,
}

#[derive(Debug)]
pub enum UseCaseError {}

#[async_trait::async_trait(?Send)]
impl UseCase for ListEventsUseCase {
    type Response = UseCaseRes;

    type Error = UseCaseError;

    const NAME: &'static str = "ListEvents";

    async fn execute(&mut self, ctx: &Context) -> Result<Self::Response, Self::Error> {
        let total_count = ctx.repos.events.count_by_user(&self.user_id).await;
        let total_pages = (total_count + self.limit - 1) / self.limit;

        let skip = (self.page - 1) * self.limit;
        let events = ctx
            .repos
            .events
            .find_by_user(&self.user_id, skip, self.limit)
            .await;

        Ok(UseCaseRes {
            events,
            pagination: PaginationDTO {
                current_page: self.page,
                total_pages,
                total_count,
                has_next_page: self.page < total_pages,
                has_prev_page: self.page > 1,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callward_infra::setup_context_inmemory;

    fn event_factory(user_id: &ID, google_event_id: &str, start_ts: i64) -> ScheduledEvent {
        ScheduledEvent {
            id: Default::default(),
            user_id: user_id.clone(),
            name: "Dentist".into(),
            description: None,
            start_ts,
            end_ts: start_ts + 1000,
            phone_number: "+15551234567".into(),
            email: "ada@example.com".into(),
            google_event_id: google_event_id.into(),
            created: 0,
            updated: 0,
        }
    }

    #[actix_web::main]
    #[test]
    async fn pages_events_with_envelope() {
        let ctx = setup_context_inmemory();
        let user_id: ID = Default::default();
        for i in 0..13 {
            ctx.repos
                .events
                .insert(&event_factory(&user_id, &format!("g{}", i), i * 1000))
                .await
                .expect("To insert event");
        }

        let res = execute(
            ListEventsUseCase {
                user_id: user_id.clone(),
                page: 2,
                limit: 5,
            },
            &ctx,
        )
        .await
        .expect("To list events");

        assert_eq!(res.events.len(), 5);
        assert_eq!(res.pagination.current_page, 2);
        assert_eq!(res.pagination.total_pages, 3);
        assert_eq!(res.pagination.total_count, 13);
        assert!(res.pagination.has_next_page);
        assert!(res.pagination.has_prev_page);

        let res = execute(
            ListEventsUseCase {
                user_id,
                page: 3,
                limit: 5,
            },
            &ctx,
        )
        .await
        .expect("To list events");
        assert_eq!(res.events.len(), 3);
        assert!(!res.pagination.has_next_page);
    }
}
