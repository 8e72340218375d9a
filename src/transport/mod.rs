//! The `transport` module is the network edge of the relay.
//!
//! It defines the JSON envelope protocol spoken with clients and implements
//! the combined HTTP/WebSocket server: upgrades become relay connections
//! with their own writer task and liveness ticker, plain requests get the
//! health answer.

pub mod message;
pub mod websocket;
