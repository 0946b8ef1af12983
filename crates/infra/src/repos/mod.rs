mod call_dispatch;
mod event;
mod shared;
mod user;

pub use call_dispatch::{CallDispatch, ICallDispatchRepo};
pub use event::IScheduledEventRepo;
pub use user::IUserRepo;

use call_dispatch::InMemoryCallDispatchRepo;
use event::InMemoryScheduledEventRepo;
use std::sync::Arc;
use user::InMemoryUserRepo;

#[derive(Clone)]
pub struct Repos {
    pub users: Arc<dyn IUserRepo>,
    pub events: Arc<dyn IScheduledEventRepo>,
    pub call_dispatches: Arc<dyn ICallDispatchRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepo::new()),
            events: Arc::new(InMemoryScheduledEventRepo::new()),
            call_dispatches: Arc::new(InMemoryCallDispatchRepo::new()),
        }
    }
}
