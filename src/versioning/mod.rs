//! Version Matcher
//!
//! Semantic versions and npm-style range expressions used to gate plugin
//! method invocation.

// Internal modules - all access should go through api module
pub(crate) mod comparator;
pub(crate) mod error;
pub(crate) mod range;
pub(crate) mod version;

// Public API module - the only public interface for version matching
pub mod api;
