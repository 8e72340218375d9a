use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes};
use tracing::{debug, warn};

use crate::client::{Client, ClientId};
use crate::relay::topic::Topic;

/// One registered connection: the shared handle plus the reverse index of
/// the topics it is subscribed to. The reverse index makes close-time
/// cleanup proportional to the client's own subscriptions.
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) client: Arc<Client>,
    pub(crate) topics: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct Relay {
    pub(crate) topics: HashMap<String, Topic>,
    pub(crate) clients: HashMap<ClientId, Registration>,
}

impl Relay {
    pub fn new() -> Self {
        Self {
            topics: HashMap::new(),
            clients: HashMap::new(),
        }
    }

    /// Registers a newly accepted connection.
    pub fn register_client(&mut self, client: Arc<Client>) {
        self.clients.insert(
            client.id.clone(),
            Registration {
                client,
                topics: HashSet::new(),
            },
        );
    }

    /// Number of currently registered connections.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Subscribes a client to a topic, creating the topic entry on first
    /// use. Unknown or closed clients are ignored.
    pub fn subscribe(&mut self, id: &ClientId, topic_name: &str) {
        let Some(registration) = self.clients.get_mut(id) else {
            return;
        };
        if registration.client.is_closed() {
            return;
        }
        self.topics
            .entry(topic_name.to_string())
            .or_insert_with(|| Topic::new(topic_name))
            .subscribe(id.clone());
        registration.topics.insert(topic_name.to_string());
    }

    /// Unsubscribes a client from a topic, dropping the topic entry if it
    /// was the last subscriber. Unknown topics and non-subscribers are a
    /// no-op.
    pub fn unsubscribe(&mut self, id: &ClientId, topic_name: &str) {
        if let Some(topic) = self.topics.get_mut(topic_name) {
            topic.unsubscribe(id);
            if topic.is_empty() {
                self.topics.remove(topic_name);
            }
        }
        if let Some(registration) = self.clients.get_mut(id) {
            registration.topics.remove(topic_name);
        }
    }

    /// Relays `raw`, the publisher's envelope exactly as received, to every
    /// open subscriber of `topic_name` except the publisher. Returns the
    /// number of deliveries.
    ///
    /// A receiver whose send fails is closed and cleaned up on the spot;
    /// the remaining receivers still get the message. A topic nobody
    /// subscribes to does not exist, so publishing to it delivers nothing
    /// and creates nothing.
    pub fn publish(&mut self, topic_name: &str, raw: &str, publisher: &ClientId) -> usize {
        let Some(topic) = self.topics.get(topic_name) else {
            return 0;
        };
        let receivers: Vec<Arc<Client>> = topic
            .subscribers
            .iter()
            .filter(|id| *id != publisher)
            .filter_map(|id| self.clients.get(id))
            .map(|registration| registration.client.clone())
            .filter(|client| !client.is_closed())
            .collect();

        let frame = Message::Text(Utf8Bytes::from(raw.to_string()));
        let mut delivered = 0;
        for client in receivers {
            if client.send(frame.clone()) {
                delivered += 1;
            } else {
                warn!("failed to relay to {}, closing", client.id);
                self.close_client(&client.id);
            }
        }
        delivered
    }

    /// Removes a connection from the registry and from every topic it was
    /// subscribed to, dropping topics that become empty, and marks the
    /// handle closed. Calling it again for the same id does nothing, which
    /// is what lets the read loop and the writer task share one cleanup
    /// path.
    pub fn close_client(&mut self, id: &ClientId) {
        let Some(registration) = self.clients.remove(id) else {
            return;
        };
        for name in &registration.topics {
            if let Some(topic) = self.topics.get_mut(name) {
                topic.unsubscribe(id);
                if topic.is_empty() {
                    self.topics.remove(name);
                }
            }
        }
        registration.client.close();
        debug!("cleaned up client {id}");
    }

    /// Closes every connection and clears both indices. Used for forced
    /// teardown.
    pub fn close_all(&mut self) {
        for registration in self.clients.values() {
            registration.client.close();
        }
        self.clients.clear();
        self.topics.clear();
    }
}
