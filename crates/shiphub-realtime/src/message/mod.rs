//! Wire frames, event payloads and inbound validation.

pub mod types;
pub mod validator;

pub use types::{InboundFrame, OutboundFrame};
