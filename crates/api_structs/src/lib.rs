mod auth;
mod event;
mod observer;
mod reminder;
mod status;
mod telephony;

pub mod dtos {
    pub use crate::event::dtos::*;
    pub use crate::reminder::dtos::*;
}

pub use crate::auth::api::*;
pub use crate::event::api::*;
pub use crate::observer::api::*;
pub use crate::status::api::*;
pub use crate::telephony::api::*;
