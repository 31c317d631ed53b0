//! Quizhub gateway: the realtime websocket channel and the thin HTTP
//! surface in front of the room coordinator.
//!
//! The gateway translates inbound client events into exactly one
//! coordinator operation each and relays the coordinator's outputs to the
//! right audience. It never touches room state directly — every mutation
//! goes through a room actor handle.

pub mod config;
mod error;
pub mod http;
mod handler;
mod server;

pub use config::Config;
pub use error::GatewayError;
pub use server::{GatewayServer, GatewayState, SharedState, spawn_sweeper};
