//! Connection lifecycle: state, listeners, transport and the manager.

pub mod manager;
pub mod registry;
pub mod state;
pub mod transport;
pub mod ws;
