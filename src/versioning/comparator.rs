//! Primitive comparators that every range desugars to

use crate::versioning::version::cmp_precedence;
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Op {
    #[strum(serialize = "=")]
    Exact,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEq,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEq,
}

/// `op version`, e.g. `>=1.2.0` or `<2.0.0-0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparator {
    pub op: Op,
    pub version: Version,
}

impl Comparator {
    pub fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// `>=0.0.0`: every release
    pub(crate) fn any() -> Self {
        Self::new(Op::GreaterEq, Version::new(0, 0, 0))
    }

    /// `<0.0.0-0`: nothing
    pub(crate) fn none() -> Self {
        Self::new(Op::Less, lowest(0, 0, 0))
    }

    pub fn matches(&self, version: &Version) -> bool {
        let ordering = cmp_precedence(version, &self.version);
        match self.op {
            Op::Exact => ordering == Ordering::Equal,
            Op::Greater => ordering == Ordering::Greater,
            Op::GreaterEq => ordering != Ordering::Less,
            Op::Less => ordering == Ordering::Less,
            Op::LessEq => ordering != Ordering::Greater,
        }
    }

    /// True if this comparator names a pre-release of the same release tuple
    pub(crate) fn admits_prerelease_of(&self, version: &Version) -> bool {
        !self.version.pre.is_empty()
            && self.version.major == version.major
            && self.version.minor == version.minor
            && self.version.patch == version.patch
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// The smallest version of a release tuple, `M.m.p-0`
pub(crate) fn lowest(major: u64, minor: u64, patch: u64) -> Version {
    let mut version = Version::new(major, minor, patch);
    // "0" is always a valid pre-release identifier
    version.pre = Prerelease::new("0").unwrap_or(Prerelease::EMPTY);
    version
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    #[test]
    fn test_operators() {
        let target = v("1.2.3");
        assert!(Comparator::new(Op::Exact, target.clone()).matches(&v("1.2.3")));
        assert!(Comparator::new(Op::Exact, target.clone()).matches(&v("1.2.3+meta")));
        assert!(!Comparator::new(Op::Greater, target.clone()).matches(&v("1.2.3")));
        assert!(Comparator::new(Op::GreaterEq, target.clone()).matches(&v("1.2.3")));
        assert!(Comparator::new(Op::Less, target.clone()).matches(&v("1.2.3-rc.1")));
        assert!(Comparator::new(Op::LessEq, target).matches(&v("1.2.3")));
    }

    #[test]
    fn test_lowest_sorts_below_every_prerelease() {
        let floor = Comparator::new(Op::Less, lowest(2, 0, 0));
        assert!(floor.matches(&v("1.99.99")));
        assert!(!floor.matches(&v("2.0.0-0")));
        assert!(!floor.matches(&v("2.0.0-alpha")));
        assert_eq!(floor.to_string(), "<2.0.0-0");
    }

    #[test]
    fn test_any_and_none() {
        assert!(Comparator::any().matches(&v("0.0.0")));
        assert!(Comparator::any().matches(&v("99.0.0")));
        assert!(!Comparator::none().matches(&v("0.0.0")));
        assert!(!Comparator::none().matches(&v("0.0.0-alpha")));
    }
}
