//! # signalrelay
//!
//! `signalrelay` is a topic-based signaling relay over WebSockets. Clients
//! subscribe to named topics and publish JSON envelopes that are relayed
//! verbatim to every other subscriber of the topic; the relay never looks
//! past the envelope's `type` and `topic` fields. Its typical job is
//! carrying connection-setup traffic between peers that want to establish
//! a direct link.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `relay`: The core registry of connections and topics, and the publish fan-out.
//! - `client`: Represents one connected client and its close state.
//! - `transport`: The combined HTTP/WebSocket surface and the envelope protocol.
//! - `liveness`: Heartbeat and sliding-TTL policies for reclaiming dead connections.
//! - `lifecycle`: Persistent versus idle-shutdown operation and the max-lifetime cap.
//! - `config`: Handles loading and managing server configuration.
//! - `utils`: Contains shared utilities, such as error types and log setup.

pub mod client;
pub mod config;
pub mod lifecycle;
pub mod liveness;
pub mod relay;
pub mod transport;
pub mod utils;
