//! Public API for the notification system
//!
//! External modules should import from here rather than directly from
//! internal modules.
//!
//! # Examples
//! ```
//! # use wim::notifications::api::{MessageBus, MessageManager, Payload, topics};
//! let bus = MessageBus::new();
//! let callback = bus.subscribe_fn(topics::WARNING, |payload| {
//!     println!("warning: {}", payload);
//! });
//! bus.notify_all(topics::WARNING, Payload::from("Plugin 'echo' is already loaded."));
//! bus.unsubscribe(topics::WARNING, &callback);
//! assert_eq!(bus.topic_count(), 0);
//! ```

// Topics and payloads
pub use crate::notifications::event::{topics, MethodRequest, Payload};

// Bus and subscriber surface
pub use crate::notifications::manager::MessageBus;
pub use crate::notifications::traits::{Callback, MessageManager};
