use actix_web::{web, HttpResponse};
use callward_api_structs::status_callback;
use callward_domain::CallStatusUpdate;
use callward_infra::Context;
use tracing::info;

/// Inbound webhook Twilio POSTs call progress to. The update is forwarded
/// to every observer registered for the destination phone number; nothing
/// is stored.
async fn status_callback_controller(
    body: web::Form<status_callback::RequestBody>,
    ctx: web::Data<Context>,
) -> HttpResponse {
    let body = body.0;
    info!(
        "Twilio callback received: CallSid={}, Status={}",
        body.call_sid, body.call_status
    );

    let notified = ctx.broadcaster.notify_call_status(CallStatusUpdate {
        call_sid: body.call_sid,
        call_status: body.call_status,
        from: body.from,
        to: body.to,
        timestamp: ctx.sys.get_timestamp_millis(),
    });
    info!("Sent call status to {} observer(s)", notified);

    // Twilio only cares that the callback was accepted
    HttpResponse::Ok().finish()
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/twilio/status-callback",
        web::post().to(status_callback_controller),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use callward_domain::ID;
    use callward_infra::{setup_context_inmemory, ObserverEvent};
    use tokio::sync::mpsc::unbounded_channel;

    #[actix_web::test]
    async fn forwards_status_updates_to_matching_observers() {
        let ctx = setup_context_inmemory();
        let user_id = ID::new();
        let (tx, mut rx) = unbounded_channel();
        ctx.broadcaster
            .register(user_id, Some("+15551234567".into()), tx);
        rx.try_recv().expect("Snapshot on connect");

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx))
                .configure(super::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/twilio/status-callback")
            .set_form(&status_callback::RequestBody {
                call_sid: "CA1".into(),
                call_status: "completed".into(),
                from: "+15550001111".into(),
                to: "+15551234567".into(),
            })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        match rx.try_recv().expect("Status update") {
            ObserverEvent::CallStatus(update) => {
                assert_eq!(update.call_sid, "CA1");
                assert_eq!(update.call_status, "completed");
            }
            other => panic!("Unexpected event: {:?}", other),
        }
    }
}
