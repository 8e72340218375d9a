use std::collections::HashSet;

use crate::client::ClientId;

/// A named broadcast channel.
///
/// Topics are not created or deleted explicitly: the relay makes the entry
/// on first subscribe and drops it the moment the subscriber set empties.
#[derive(Debug, Default)]
pub struct Topic {
    pub name: String,
    pub subscribers: HashSet<ClientId>,
}

impl Topic {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subscribers: HashSet::new(),
        }
    }

    /// Adds a subscriber. Subscribing twice has no effect beyond the first.
    pub fn subscribe(&mut self, id: ClientId) {
        self.subscribers.insert(id);
    }

    /// Removes a subscriber. Unknown ids are a no-op.
    pub fn unsubscribe(&mut self, id: &ClientId) {
        self.subscribers.remove(id);
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
