mod create_event;
mod list_events;
pub mod send_event_reminders;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/events", web::post().to(create_event::create_event_controller));
    cfg.route("/events", web::get().to(list_events::list_events_controller));
}
