mod event;
mod reminder;
mod shared;
mod user;

pub use event::ScheduledEvent;
pub use reminder::{CallStatusUpdate, ReminderResult};
pub use shared::entity::{Entity, ID};
pub use user::{GoogleCredentials, User};
