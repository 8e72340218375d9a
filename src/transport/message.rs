//! Wire protocol spoken over each connection.
//!
//! Inbound envelopes are JSON objects distinguished by a `type` field.
//! Parsing is deliberately lenient about content: unknown or missing types
//! are ignored, extra fields ride along untouched, and a publish keeps the
//! raw envelope text so subscribers receive exactly what the publisher
//! sent. Only broken framing is an error, and an error closes just the
//! connection that produced it.

use serde::Serialize;
use serde_json::Value;

use crate::utils::error::ProtocolError;

/// A parsed inbound envelope, reduced to the action it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Subscribe the sender to each named topic.
    Subscribe { topics: Vec<String> },
    /// Unsubscribe the sender from each named topic.
    Unsubscribe { topics: Vec<String> },
    /// Relay `raw`, the untouched envelope text, to the topic's other
    /// subscribers.
    Publish { topic: String, raw: String },
    /// Application-level ping, answered with [`ServerMessage::Pong`].
    Ping,
    /// Application-level pong, accepted and discarded.
    Pong,
    /// Well-formed but not actionable.
    Ignore,
}

impl Command {
    /// Parses one text frame into a command.
    ///
    /// `Err` means the frame is not a JSON object at all; the caller closes
    /// the connection. Everything else maps to an action or to
    /// [`Command::Ignore`].
    pub fn parse(text: &str) -> Result<Command, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;
        let Some(envelope) = value.as_object() else {
            return Err(ProtocolError::NotAnObject);
        };
        let Some(kind) = envelope.get("type").and_then(Value::as_str) else {
            return Ok(Command::Ignore);
        };
        let command = match kind {
            "subscribe" => Command::Subscribe {
                topics: topic_list(envelope.get("topics")),
            },
            "unsubscribe" => Command::Unsubscribe {
                topics: topic_list(envelope.get("topics")),
            },
            "publish" => match envelope.get("topic").and_then(Value::as_str) {
                Some(topic) if !topic.is_empty() => Command::Publish {
                    topic: topic.to_string(),
                    raw: text.to_string(),
                },
                // a publish with no usable topic goes nowhere
                _ => Command::Ignore,
            },
            "ping" => Command::Ping,
            "pong" => Command::Pong,
            _ => Command::Ignore,
        };
        Ok(command)
    }

    /// Whether this envelope counts as activity for the sliding-TTL policy.
    pub fn refreshes_liveness(&self) -> bool {
        matches!(
            self,
            Command::Subscribe { .. } | Command::Unsubscribe { .. } | Command::Publish { .. }
        )
    }
}

/// Extracts the string entries of a `topics` array. Non-string entries and
/// non-array values contribute nothing.
fn topic_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Envelopes originated by the relay itself.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Pong,
}
