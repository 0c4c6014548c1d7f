//! Bridges notification bus topics onto the log
//!
//! Error → error, Warning → warn, LoadPlugin and UnloadPlugin → info,
//! RequestMethod → debug.

use crate::notifications::api::{topics, Callback, MessageBus, MessageManager};

const LOG_TARGET: &str = "wim::events";

/// Subscribe the log bridge; returns the handles for unsubscribing
pub fn bridge_to_log(bus: &MessageBus) -> Vec<(&'static str, Callback)> {
    let routes: [(&'static str, log::Level); 5] = [
        (topics::ERROR, log::Level::Error),
        (topics::WARNING, log::Level::Warn),
        (topics::LOAD_PLUGIN, log::Level::Info),
        (topics::UNLOAD_PLUGIN, log::Level::Info),
        (topics::REQUEST_METHOD, log::Level::Debug),
    ];

    routes
        .into_iter()
        .map(|(topic, level)| {
            let callback = bus.subscribe_fn(topic, move |payload| match topic {
                topics::LOAD_PLUGIN => log::log!(target: LOG_TARGET, level, "Loaded plugin {}", payload),
                topics::UNLOAD_PLUGIN => {
                    log::log!(target: LOG_TARGET, level, "Unloaded plugin {}", payload)
                }
                topics::REQUEST_METHOD => log::log!(target: LOG_TARGET, level, "Request {}", payload),
                _ => log::log!(target: LOG_TARGET, level, "{}", payload),
            });
            (topic, callback)
        })
        .collect()
}

/// Remove the subscriptions made by [`bridge_to_log`]
pub fn unbridge(bus: &MessageBus, handles: &[(&'static str, Callback)]) {
    for (topic, callback) in handles {
        bus.unsubscribe(topic, callback);
    }
}
