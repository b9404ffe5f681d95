//! # shiphub-entity
//!
//! Domain records for the ShipHub client. Every struct in this crate is a
//! plain value object exchanged with the REST API, the realtime transport,
//! or durable client storage. All records derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod notification;
pub mod session;
pub mod user;
