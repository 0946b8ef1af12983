mod telemetry;

use callward_api::Application;
use callward_infra::setup_context;
use telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("callward_server".into(), "info".into());
    init_subscriber(subscriber);

    let context = setup_context();

    let app = Application::new(context).await?;
    app.start().await
}
