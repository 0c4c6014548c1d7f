//! MessageBus implementation

use crate::core::sync::recover_poison;
use crate::notifications::event::Payload;
use crate::notifications::traits::{same_callback, Callback, MessageManager};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

/// Topic-keyed synchronous publish/subscribe bus
///
/// Delivery happens on the caller's thread. The subscriber list for a topic
/// is copied before delivery, so callbacks may subscribe or unsubscribe
/// (even themselves) while a notification is in progress.
#[derive(Default)]
pub struct MessageBus {
    subscribers: RwLock<HashMap<String, Vec<Callback>>>,
}

impl std::fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let subscribers = recover_poison(self.subscribers.read(), "message bus");
        let counts: HashMap<&str, usize> = subscribers
            .iter()
            .map(|(topic, callbacks)| (topic.as_str(), callbacks.len()))
            .collect();
        f.debug_struct("MessageBus")
            .field("subscribers", &counts)
            .finish()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a closure and return the handle needed to unsubscribe it
    pub fn subscribe_fn<F>(&self, topic: &str, callback: F) -> Callback
    where
        F: Fn(&Payload) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(callback);
        self.subscribe(topic, callback.clone());
        callback
    }

    /// Forward every payload on `topic` into a channel
    ///
    /// Once the receiver is dropped, deliveries to it are discarded.
    pub fn subscribe_channel(&self, topic: &str) -> UnboundedReceiver<Payload> {
        let (sender, receiver) = unbounded_channel();
        let channel_topic = topic.to_string();
        self.subscribe_fn(topic, move |payload| {
            if sender.send(payload.clone()).is_err() {
                log::trace!("Channel subscriber for '{}' is closed", channel_topic);
            }
        });
        receiver
    }

    /// Number of callbacks registered for `topic`
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let subscribers = recover_poison(self.subscribers.read(), "message bus");
        subscribers.get(topic).map_or(0, Vec::len)
    }

    /// Number of topics with at least one subscriber
    pub fn topic_count(&self) -> usize {
        recover_poison(self.subscribers.read(), "message bus").len()
    }

    fn snapshot(&self, topic: &str) -> Vec<Callback> {
        let subscribers = recover_poison(self.subscribers.read(), "message bus");
        subscribers.get(topic).cloned().unwrap_or_default()
    }

    fn deliver(topic: &str, callback: &Callback, payload: &Payload) {
        if catch_unwind(AssertUnwindSafe(|| callback(payload))).is_err() {
            log::error!("Subscriber for topic '{}' panicked; continuing", topic);
        }
    }
}

impl MessageManager for MessageBus {
    fn subscribe(&self, topic: &str, callback: Callback) {
        let mut subscribers = recover_poison(self.subscribers.write(), "message bus");
        subscribers
            .entry(topic.to_string())
            .or_default()
            .push(callback);
        log::trace!("Subscribed to '{}'", topic);
    }

    fn unsubscribe(&self, topic: &str, callback: &Callback) {
        let mut subscribers = recover_poison(self.subscribers.write(), "message bus");
        if let Some(callbacks) = subscribers.get_mut(topic) {
            if let Some(index) = callbacks.iter().position(|c| same_callback(c, callback)) {
                callbacks.remove(index);
                log::trace!("Unsubscribed from '{}'", topic);
            }
            if callbacks.is_empty() {
                subscribers.remove(topic);
            }
        }
    }

    fn clear_subscriptions(&self) {
        recover_poison(self.subscribers.write(), "message bus").clear();
    }

    fn notify_all(&self, topic: &str, payload: Payload) {
        for callback in self.snapshot(topic) {
            Self::deliver(topic, &callback, &payload);
        }
    }

    fn notify_one(&self, topic: &str, payload: Payload) {
        if let Some(callback) = self.snapshot(topic).first() {
            Self::deliver(topic, callback, &payload);
        }
    }
}
