use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use callward_api_structs::connect_observer;
use callward_api_structs::dtos::{CallStatusUpdateDTO, ReminderResultDTO};
use callward_api_structs::ObserverMessage;
use callward_domain::ID;
use callward_infra::{Context, ObserverEvent};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One live observer connection. While the socket is open the session is
/// registered with the broadcaster; everything the broadcaster pushes for
/// it is forwarded as a json text frame.
struct ObserverSession {
    context: Context,
    user_id: ID,
    phone_number: Option<String>,
    connection_id: Option<u64>,
    heartbeat: Instant,
}

impl ObserverSession {
    fn new(context: Context, user_id: ID, phone_number: Option<String>) -> Self {
        Self {
            context,
            user_id,
            phone_number,
            connection_id: None,
            heartbeat: Instant::now(),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.heartbeat) > CLIENT_TIMEOUT {
                warn!("Observer heartbeat timed out, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for ObserverSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!("New observer connected for user {}", self.user_id);
        self.start_heartbeat(ctx);

        // Registering delivers the current snapshot right away, so the
        // first frame a late joiner sees is the latest state
        let (tx, rx) = unbounded_channel();
        self.connection_id = Some(self.context.broadcaster.register(
            self.user_id.clone(),
            self.phone_number.clone(),
            tx,
        ));
        ctx.add_stream(UnboundedReceiverStream::new(rx));
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(connection_id) = self.connection_id.take() {
            self.context.broadcaster.unregister(connection_id);
        }
        info!("Observer disconnected for user {}", self.user_id);
    }
}

impl StreamHandler<ObserverEvent> for ObserverSession {
    fn handle(&mut self, event: ObserverEvent, ctx: &mut Self::Context) {
        let message = match event {
            ObserverEvent::JobResult(results) => ObserverMessage::NewJobResult(
                results.into_iter().map(ReminderResultDTO::new).collect(),
            ),
            ObserverEvent::CallStatus(update) => {
                ObserverMessage::CallStatusUpdate(CallStatusUpdateDTO::new(update))
            }
        };
        match serde_json::to_string(&message) {
            Ok(json) => ctx.text(json),
            Err(e) => warn!("Unable to serialize observer message: {:?}", e),
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ObserverSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            // Observers only listen; inbound frames are ignored
            Ok(_) => {}
            Err(_) => ctx.stop(),
        }
    }
}

async fn connect_observer_controller(
    req: HttpRequest,
    stream: web::Payload,
    query: web::Query<connect_observer::QueryParams>,
    ctx: web::Data<Context>,
) -> Result<HttpResponse, actix_web::Error> {
    let query = query.into_inner();
    ws::start(
        ObserverSession::new(ctx.get_ref().clone(), query.user_id, query.phone_number),
        &req,
        stream,
    )
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(connect_observer_controller));
}
