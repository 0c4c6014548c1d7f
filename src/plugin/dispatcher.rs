//! Invocation Dispatcher
//!
//! Resolves (author, name, version range, method) to a registered plugin
//! and calls it. Every request is announced on `"RequestMethod"` before any
//! check; every failure is published on `"Error"` and returned.

use crate::notifications::api::{topics, MessageManager, MethodRequest, Payload};
use crate::plugin::error::{panic_message, PluginError, PluginResult};
use crate::plugin::registry::SharedPluginRegistry;
use crate::plugin::types::PluginValue;
use crate::versioning::api::{contains, parse_range, parse_version};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub struct InvocationDispatcher {
    registry: SharedPluginRegistry,
    messages: Arc<dyn MessageManager>,
}

impl InvocationDispatcher {
    pub fn new(registry: SharedPluginRegistry, messages: Arc<dyn MessageManager>) -> Self {
        Self { registry, messages }
    }

    pub fn invoke(
        &self,
        author: &str,
        name: &str,
        version_range: &str,
        method: &str,
        args: &[PluginValue],
    ) -> PluginResult<PluginValue> {
        self.messages.notify_all(
            topics::REQUEST_METHOD,
            Payload::from(MethodRequest::new(author, name, version_range, method)),
        );

        self.dispatch(author, name, version_range, method, args)
            .inspect_err(|err| {
                log::debug!("{}", err);
                self.messages
                    .notify_all(topics::ERROR, Payload::from(err.to_string()));
            })
    }

    fn dispatch(
        &self,
        author: &str,
        name: &str,
        version_range: &str,
        method: &str,
        args: &[PluginValue],
    ) -> PluginResult<PluginValue> {
        let entry = self
            .registry
            .lookup(author, name)?
            .ok_or_else(|| PluginError::PluginNotFound {
                author: author.to_string(),
                name: name.to_string(),
            })?;

        let range =
            parse_range(version_range).map_err(|e| PluginError::invalid_range(version_range, &e))?;

        let invocation_failed = |cause: String| PluginError::PluginInvocationFailed {
            author: author.to_string(),
            name: name.to_string(),
            method: method.to_string(),
            cause,
        };

        // The registry lock is already released; only this instance is held.
        // Every call into the plugin below is guarded so the lock is never poisoned.
        let mut plugin = entry.lock()?;

        let version_text = catch_unwind(AssertUnwindSafe(|| plugin.version().to_string()))
            .map_err(|payload| {
                invocation_failed(format!("version query {}", panic_message(payload.as_ref())))
            })?;
        let version = parse_version(&version_text).map_err(|e| PluginError::InvalidPluginVersion {
            author: author.to_string(),
            name: name.to_string(),
            version: version_text.clone(),
            cause: e.cause().to_string(),
        })?;

        if !contains(&range, &version) {
            return Err(PluginError::VersionMismatch {
                author: author.to_string(),
                name: name.to_string(),
                version: version_text,
                range: version_range.to_string(),
            });
        }

        let known = catch_unwind(AssertUnwindSafe(|| plugin.has_method(method))).map_err(
            |payload| invocation_failed(format!("method lookup {}", panic_message(payload.as_ref()))),
        )?;
        if !known {
            return Err(PluginError::MethodNotFound {
                author: author.to_string(),
                name: name.to_string(),
                method: method.to_string(),
            });
        }

        log::trace!("Calling {}.{}::{} with {} argument(s)", author, name, method, args.len());
        match catch_unwind(AssertUnwindSafe(|| plugin.call(method, args))) {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(fault)) => Err(invocation_failed(fault.to_string())),
            Err(payload) => Err(invocation_failed(panic_message(payload.as_ref()))),
        }
    }
}
