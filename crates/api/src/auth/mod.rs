mod oauth_google;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/auth/google",
        web::get().to(oauth_google::google_auth_controller),
    );
    cfg.route(
        "/auth/google/callback",
        web::get().to(oauth_google::google_callback_controller),
    );
}
