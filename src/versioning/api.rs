//! Public API for version matching
//!
//! # Examples
//! ```
//! use wim::versioning::api::{contains, parse_range, parse_version};
//!
//! let range = parse_range(">=1.0.0 <2.0.0").unwrap();
//! assert!(contains(&range, &parse_version("1.4.2").unwrap()));
//! assert!(!contains(&range, &parse_version("2.0.0").unwrap()));
//! ```

pub use crate::versioning::comparator::{Comparator, Op};
pub use crate::versioning::error::{VersionError, VersionResult};
pub use crate::versioning::range::{contains, parse_range, VersionRange};
pub use crate::versioning::version::{cmp_precedence, parse_version};

pub use semver::Version;
