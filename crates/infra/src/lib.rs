mod broadcaster;
mod config;
mod repos;
mod services;
mod system;

pub use broadcaster::{Broadcaster, ObserverEvent};
pub use config::{Config, GoogleOAuthConfig, TwilioConfig};
pub use repos::{CallDispatch, ICallDispatchRepo, IScheduledEventRepo, IUserRepo, Repos};
pub use services::*;
use std::sync::Arc;
pub use system::ISys;
use system::RealSys;

#[derive(Clone)]
pub struct Context {
    pub repos: Repos,
    pub gateways: Gateways,
    pub broadcaster: Broadcaster,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> Context {
    let config = Config::new();
    let repos = Repos::create_inmemory();
    let sys: Arc<dyn ISys> = Arc::new(RealSys {});
    let gateways = Gateways::create_live(&config, repos.clone(), sys.clone());

    Context {
        repos,
        gateways,
        broadcaster: Broadcaster::new(),
        config,
        sys,
    }
}

/// Context with inmemory storage and inmemory provider gateways, used by
/// tests
pub fn setup_context_inmemory() -> Context {
    Context {
        repos: Repos::create_inmemory(),
        gateways: Gateways::create_inmemory(),
        broadcaster: Broadcaster::new(),
        config: Config::new(),
        sys: Arc::new(RealSys {}),
    }
}
