//! Traits for the notification system

use crate::notifications::event::Payload;
use std::sync::Arc;

/// A subscriber callback
///
/// Identity is the allocation: unsubscribing needs a clone of the same `Arc`
/// that was subscribed.
pub type Callback = Arc<dyn Fn(&Payload) + Send + Sync>;

/// Publish/subscribe surface shared by the host and plugins
pub trait MessageManager: Send + Sync {
    /// Register `callback` for `topic`; identical callbacks are not de-duplicated
    fn subscribe(&self, topic: &str, callback: Callback);

    /// Remove one registration of `callback` for `topic`, if any
    fn unsubscribe(&self, topic: &str, callback: &Callback);

    /// Remove every subscription on every topic
    fn clear_subscriptions(&self);

    /// Deliver to every subscriber of `topic`, in registration order
    fn notify_all(&self, topic: &str, payload: Payload);

    /// Deliver to the first-registered subscriber of `topic` only
    fn notify_one(&self, topic: &str, payload: Payload);
}

/// Same allocation, ignoring vtable identity
pub(crate) fn same_callback(a: &Callback, b: &Callback) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}
