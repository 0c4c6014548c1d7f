//! Lock poisoning policy
//!
//! The plugin registry turns a poisoned lock into a domain error. The
//! notification bus and the path list, whose operations cannot fail, take
//! the guard back and log instead.

use std::sync::LockResult;

/// Map a poisoned lock to an error built by `error`
///
/// `lock` names the lock and access mode in the message.
///
/// # Examples
/// ```
/// use std::sync::RwLock;
/// use wim::core::sync::poisoned_as_error;
/// use wim::plugin::api::PluginError;
///
/// let table = RwLock::new(vec![1, 2]);
/// let guard = poisoned_as_error(table.read(), "table read", |message| {
///     PluginError::Synchronisation { message }
/// })
/// .unwrap();
/// assert_eq!(guard.len(), 2);
/// ```
pub fn poisoned_as_error<G, E>(
    result: LockResult<G>,
    lock: &str,
    error: impl FnOnce(String) -> E,
) -> Result<G, E> {
    result.map_err(|_| error(format!("{} lock poisoned by a panicking holder", lock)))
}

/// Take the guard even if a previous holder panicked
///
/// Only for structures whose every mutation is a single, complete step, so
/// the data behind a poisoned lock is still consistent.
pub fn recover_poison<G>(result: LockResult<G>, what: &str) -> G {
    result.unwrap_or_else(|poisoned| {
        log::warn!("Recovering poisoned lock for {}", what);
        poisoned.into_inner()
    })
}
