//! The `client` module defines the relay-side view of one connected peer.
//!
//! It provides the `Client` struct, which holds the connection's unique
//! identifier, the channel feeding its writer task, and the close flag owned
//! by the relay core.

pub mod client;
pub use client::{Client, ClientId};

#[cfg(test)]
mod tests;
