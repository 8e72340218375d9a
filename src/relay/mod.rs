//! The relay core: connection registry, topic index, and publish fan-out.
//!
//! All state lives in the `Relay` struct behind one mutex. Each operation
//! runs start to finish under that lock, so the registry and the topic index
//! always agree: a client sits in a topic's subscriber set exactly when the
//! topic sits in the client's subscription set, and a topic entry exists
//! exactly while it has at least one subscriber.

pub mod engine;
pub mod topic;

pub use engine::Relay;
