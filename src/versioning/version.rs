//! Strict SemVer 2.0.0 parsing and precedence

use crate::versioning::error::{VersionError, VersionResult};
use semver::Version;
use std::cmp::Ordering;

/// Parse a strict semantic version, ignoring surrounding whitespace
pub fn parse_version(text: &str) -> VersionResult<Version> {
    Version::parse(text.trim()).map_err(|e| VersionError::MalformedVersion {
        text: text.to_string(),
        cause: e.to_string(),
    })
}

/// SemVer precedence: build metadata does not take part
pub fn cmp_precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch)
        .cmp(&(b.major, b.minor, b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}
