//! Version range parsing and containment
//!
//! Ranges follow the npm grammar: `||`-separated sets of comparators joined
//! by whitespace or commas, with `~`, `^`, x-ranges and hyphen ranges
//! desugared to primitive comparators. A partial upper bound is exclusive of
//! the next increment and is expressed with a `-0` pre-release so that
//! pre-releases of that increment stay outside the range.

use crate::versioning::comparator::{lowest, Comparator, Op};
use crate::versioning::error::{VersionError, VersionResult};
use once_cell::sync::Lazy;
use regex::Regex;
use semver::{Prerelease, Version};
use std::fmt;
use std::str::FromStr;

static PARTIAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[vV]?(?P<major>0|[1-9]\d*|[xX*])(?:\.(?P<minor>0|[1-9]\d*|[xX*])(?:\.(?P<patch>0|[1-9]\d*|[xX*])(?:-(?P<pre>[0-9A-Za-z.-]+))?(?:\+[0-9A-Za-z.-]+)?)?)?$",
    )
    .expect("partial version pattern is valid")
});

static HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S+)\s+-\s+(\S+)$").expect("hyphen range pattern is valid"));

const OPERATOR_CHARS: &[char] = &['<', '>', '=', '~', '^'];

/// A parsed, immutable range predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    source: String,
    sets: Vec<Vec<Comparator>>,
}

impl VersionRange {
    /// The desugared comparator sets; a version matches if any set matches
    pub fn comparator_sets(&self) -> &[Vec<Comparator>] {
        &self.sets
    }

    pub fn matches(&self, version: &Version) -> bool {
        contains(self, version)
    }
}

impl FromStr for VersionRange {
    type Err = VersionError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_range(text)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

/// Parse a range expression
///
/// An empty expression matches every release.
pub fn parse_range(text: &str) -> VersionResult<VersionRange> {
    let sets = text
        .split("||")
        .map(|set| parse_set(text, set))
        .collect::<VersionResult<Vec<_>>>()?;

    Ok(VersionRange {
        source: text.trim().to_string(),
        sets,
    })
}

/// True if `version` satisfies `range`
///
/// A pre-release is only admitted by a set that also names a pre-release of
/// the same major.minor.patch.
pub fn contains(range: &VersionRange, version: &Version) -> bool {
    range.sets.iter().any(|set| set_matches(set, version))
}

fn set_matches(set: &[Comparator], version: &Version) -> bool {
    if !set.iter().all(|comparator| comparator.matches(version)) {
        return false;
    }
    version.pre.is_empty() || set.iter().any(|c| c.admits_prerelease_of(version))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeOp {
    Exact,
    Greater,
    GreaterEq,
    Less,
    LessEq,
    Tilde,
    Caret,
}

#[derive(Debug)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Prerelease,
}

impl Partial {
    fn floor(&self) -> Version {
        let mut version = Version::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        version.pre = self.pre.clone();
        version
    }
}

fn parse_set(source: &str, set: &str) -> VersionResult<Vec<Comparator>> {
    let set = set.trim();
    if set.is_empty() {
        return Ok(vec![Comparator::any()]);
    }

    if let Some(caps) = HYPHEN.captures(set) {
        let lower = parse_partial(source, &caps[1])?;
        let upper = parse_partial(source, &caps[2])?;
        return hyphen(source, &lower, &upper);
    }

    let mut comparators = Vec::new();
    for token in tokenize(source, set)? {
        let (op, rest) = split_operator(&token);
        let partial = parse_partial(source, rest)?;
        comparators.extend(desugar(source, op, &partial)?);
    }
    Ok(comparators)
}

// ">= 1.2.3" is one comparator: a bare operator binds to the next token
fn tokenize(source: &str, set: &str) -> VersionResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut pending_operator: Option<&str> = None;

    for piece in set
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|piece| !piece.is_empty())
    {
        if piece.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            if pending_operator.is_some() {
                return Err(VersionError::range(
                    source,
                    format!("unexpected operator '{}'", piece),
                ));
            }
            pending_operator = Some(piece);
            continue;
        }
        match pending_operator.take() {
            Some(operator) => tokens.push(format!("{}{}", operator, piece)),
            None => tokens.push(piece.to_string()),
        }
    }

    if let Some(operator) = pending_operator {
        return Err(VersionError::range(
            source,
            format!("operator '{}' is missing a version", operator),
        ));
    }
    Ok(tokens)
}

fn split_operator(token: &str) -> (RangeOp, &str) {
    const PREFIXES: [(&str, RangeOp); 8] = [
        (">=", RangeOp::GreaterEq),
        ("<=", RangeOp::LessEq),
        ("~>", RangeOp::Tilde),
        (">", RangeOp::Greater),
        ("<", RangeOp::Less),
        ("=", RangeOp::Exact),
        ("~", RangeOp::Tilde),
        ("^", RangeOp::Caret),
    ];

    PREFIXES
        .iter()
        .find_map(|(prefix, op)| token.strip_prefix(prefix).map(|rest| (*op, rest)))
        .unwrap_or((RangeOp::Exact, token))
}

fn parse_partial(source: &str, text: &str) -> VersionResult<Partial> {
    let caps = PARTIAL
        .captures(text)
        .ok_or_else(|| VersionError::range(source, format!("unexpected token '{}'", text)))?;

    let component = |name: &str| -> VersionResult<Option<u64>> {
        match caps.name(name).map(|m| m.as_str()) {
            None | Some("x") | Some("X") | Some("*") => Ok(None),
            Some(digits) => digits.parse::<u64>().map(Some).map_err(|_| {
                VersionError::range(source, format!("version component '{}' is too large", digits))
            }),
        }
    };

    // Everything after a wildcard is a wildcard too
    let major = component("major")?;
    let minor = major.and(component("minor")?);
    let patch = minor.and(component("patch")?);

    let pre = match (patch, caps.name("pre")) {
        (Some(_), Some(pre)) => Prerelease::new(pre.as_str()).map_err(|e| {
            VersionError::range(source, format!("invalid pre-release '{}': {}", pre.as_str(), e))
        })?,
        _ => Prerelease::EMPTY,
    };

    Ok(Partial {
        major,
        minor,
        patch,
        pre,
    })
}

fn bump(source: &str, component: u64) -> VersionResult<u64> {
    component
        .checked_add(1)
        .ok_or_else(|| VersionError::range(source, "version component overflows"))
}

/// Exclusive upper bound of everything the partial covers
fn next_increment(source: &str, partial: &Partial) -> VersionResult<Option<Comparator>> {
    let bound = match (partial.major, partial.minor) {
        (None, _) => return Ok(None),
        (Some(major), None) => lowest(bump(source, major)?, 0, 0),
        (Some(major), Some(minor)) => lowest(major, bump(source, minor)?, 0),
    };
    Ok(Some(Comparator::new(Op::Less, bound)))
}

fn desugar(source: &str, op: RangeOp, partial: &Partial) -> VersionResult<Vec<Comparator>> {
    let floor = Comparator::new(Op::GreaterEq, partial.floor());

    let Some(major) = partial.major else {
        return Ok(match op {
            RangeOp::Greater | RangeOp::Less => vec![Comparator::none()],
            _ => vec![Comparator::any()],
        });
    };

    let comparators = match op {
        RangeOp::Exact => match partial.patch {
            Some(_) => vec![Comparator::new(Op::Exact, partial.floor())],
            None => with_upper(floor, next_increment(source, partial)?),
        },
        RangeOp::Tilde => {
            let tilde = Partial {
                major: Some(major),
                minor: partial.minor,
                patch: None,
                pre: Prerelease::EMPTY,
            };
            with_upper(floor, next_increment(source, &tilde)?)
        }
        RangeOp::Caret => {
            let upper = match (partial.minor, partial.patch) {
                (None, _) => lowest(bump(source, major)?, 0, 0),
                (Some(minor), _) if major == 0 && partial.patch.is_none() => {
                    lowest(0, bump(source, minor)?, 0)
                }
                (Some(_), _) if major > 0 => lowest(bump(source, major)?, 0, 0),
                (Some(minor), Some(_)) if minor > 0 => lowest(0, bump(source, minor)?, 0),
                (Some(_), Some(patch)) => lowest(0, 0, bump(source, patch)?),
                (Some(_), None) => lowest(bump(source, major)?, 0, 0),
            };
            vec![floor, Comparator::new(Op::Less, upper)]
        }
        RangeOp::Greater => match (partial.minor, partial.patch) {
            (None, _) => vec![Comparator::new(
                Op::GreaterEq,
                Version::new(bump(source, major)?, 0, 0),
            )],
            (Some(minor), None) => vec![Comparator::new(
                Op::GreaterEq,
                Version::new(major, bump(source, minor)?, 0),
            )],
            (Some(_), Some(_)) => vec![Comparator::new(Op::Greater, partial.floor())],
        },
        RangeOp::GreaterEq => vec![floor],
        RangeOp::Less => match partial.patch {
            Some(_) => vec![Comparator::new(Op::Less, partial.floor())],
            None => vec![Comparator::new(
                Op::Less,
                lowest(major, partial.minor.unwrap_or(0), 0),
            )],
        },
        RangeOp::LessEq => match partial.patch {
            Some(_) => vec![Comparator::new(Op::LessEq, partial.floor())],
            None => next_increment(source, partial)?.into_iter().collect(),
        },
    };
    Ok(comparators)
}

fn with_upper(floor: Comparator, upper: Option<Comparator>) -> Vec<Comparator> {
    std::iter::once(floor).chain(upper).collect()
}

fn hyphen(source: &str, lower: &Partial, upper: &Partial) -> VersionResult<Vec<Comparator>> {
    let mut comparators = Vec::new();
    if lower.major.is_some() {
        comparators.push(Comparator::new(Op::GreaterEq, lower.floor()));
    }
    match upper.patch {
        Some(_) => comparators.push(Comparator::new(Op::LessEq, upper.floor())),
        None => comparators.extend(next_increment(source, upper)?),
    }
    if comparators.is_empty() {
        comparators.push(Comparator::any());
    }
    Ok(comparators)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    fn satisfies(range: &str, version: &str) -> bool {
        contains(&parse_range(range).unwrap(), &v(version))
    }

    fn desugared(range: &str) -> Vec<String> {
        parse_range(range)
            .unwrap()
            .comparator_sets()
            .iter()
            .map(|set| {
                set.iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn test_empty_and_star_match_every_release() {
        for range in ["", "   ", "*", "x", "X"] {
            assert!(satisfies(range, "0.0.0"), "{:?}", range);
            assert!(satisfies(range, "42.1.7"), "{:?}", range);
            assert!(!satisfies(range, "1.0.0-alpha"), "{:?}", range);
        }
    }

    #[test]
    fn test_half_open_interval() {
        assert!(!satisfies(">=1.0.0 <2.0.0", "0.9.9"));
        assert!(satisfies(">=1.0.0 <2.0.0", "1.0.0"));
        assert!(satisfies(">=1.0.0 <2.0.0", "1.9.9"));
        assert!(!satisfies(">=1.0.0 <2.0.0", "2.0.0"));
        assert!(satisfies(">=1.0.0, <2.0.0", "1.5.0"));
        assert!(satisfies(">= 1.0.0 < 2.0.0", "1.5.0"));
    }

    #[test]
    fn test_partial_desugaring() {
        assert_eq!(desugared("1.2"), vec![">=1.2.0 <1.3.0-0"]);
        assert_eq!(desugared("1"), vec![">=1.0.0 <2.0.0-0"]);
        assert_eq!(desugared("1.x"), vec![">=1.0.0 <2.0.0-0"]);
        assert_eq!(desugared("1.2.3"), vec!["=1.2.3"]);
        assert_eq!(desugared("<1.2"), vec!["<1.2.0-0"]);
        assert_eq!(desugared("<=1.2"), vec!["<1.3.0-0"]);
        assert_eq!(desugared(">1.2"), vec![">=1.3.0"]);
        assert_eq!(desugared(">=1.2"), vec![">=1.2.0"]);
    }

    #[test]
    fn test_tilde() {
        assert_eq!(desugared("~1.2.3"), vec![">=1.2.3 <1.3.0-0"]);
        assert_eq!(desugared("~1.2"), vec![">=1.2.0 <1.3.0-0"]);
        assert_eq!(desugared("~1"), vec![">=1.0.0 <2.0.0-0"]);
        assert_eq!(desugared("~>1.2.3"), vec![">=1.2.3 <1.3.0-0"]);
        assert!(satisfies("~1.2.3", "1.2.9"));
        assert!(!satisfies("~1.2.3", "1.3.0"));
    }

    #[test]
    fn test_caret() {
        assert_eq!(desugared("^1.2.3"), vec![">=1.2.3 <2.0.0-0"]);
        assert_eq!(desugared("^0.2.3"), vec![">=0.2.3 <0.3.0-0"]);
        assert_eq!(desugared("^0.0.3"), vec![">=0.0.3 <0.0.4-0"]);
        assert_eq!(desugared("^0.2"), vec![">=0.2.0 <0.3.0-0"]);
        assert_eq!(desugared("^1.2"), vec![">=1.2.0 <2.0.0-0"]);
        assert_eq!(desugared("^0"), vec![">=0.0.0 <1.0.0-0"]);
        assert!(satisfies("^0.2.3", "0.2.9"));
        assert!(!satisfies("^0.2.3", "0.3.0"));
    }

    #[test]
    fn test_hyphen_ranges() {
        assert_eq!(desugared("1.2.3 - 2.3.4"), vec![">=1.2.3 <=2.3.4"]);
        assert_eq!(desugared("1.2 - 2.3"), vec![">=1.2.0 <2.4.0-0"]);
        assert_eq!(desugared("1.2.3 - 2"), vec![">=1.2.3 <3.0.0-0"]);
        assert_eq!(desugared("* - 2"), vec!["<3.0.0-0"]);
        assert!(satisfies("1.2 - 2.3", "2.3.99"));
        assert!(!satisfies("1.2 - 2.3", "2.4.0"));
    }

    #[test]
    fn test_union_of_sets() {
        let range = "<1.0.0 || >=2.0.0 <3.0.0";
        assert!(satisfies(range, "0.5.0"));
        assert!(!satisfies(range, "1.5.0"));
        assert!(satisfies(range, "2.5.0"));
        assert!(!satisfies(range, "3.0.0"));
        assert_eq!(desugared(range).len(), 2);
    }

    #[test]
    fn test_wildcard_with_strict_operators_matches_nothing() {
        assert!(!satisfies(">*", "1.0.0"));
        assert!(!satisfies("<x", "0.0.0"));
        assert!(satisfies("<=*", "7.0.0"));
    }

    #[test]
    fn test_prerelease_inclusion_rule() {
        assert!(!satisfies(">=1.0.0 <2.0.0", "1.5.0-beta"));
        assert!(satisfies(">=1.5.0-alpha <2.0.0", "1.5.0-beta"));
        assert!(!satisfies(">=1.5.0-alpha <2.0.0", "1.6.0-beta"));
        assert!(satisfies("^1.2.3-beta.2", "1.2.3-beta.3"));
        assert!(!satisfies("^1.2.3-beta.2", "1.2.4-beta.1"));
        assert!(!satisfies("1.x", "2.0.0-0"));
    }

    #[test]
    fn test_build_metadata_ignored() {
        assert!(satisfies("=1.2.3", "1.2.3+ci.7"));
        assert!(satisfies("1.2.3+anything", "1.2.3"));
    }

    #[test]
    fn test_malformed_ranges() {
        for range in [
            "banana",
            ">=",
            "1.2.3.4",
            ">=1.0.0 <",
            ">> 1.0.0",
            "1.2.3-",
            "1.0.0 - ",
            "99999999999999999999999",
        ] {
            let err = parse_range(range).unwrap_err();
            assert!(
                matches!(err, VersionError::MalformedRange { .. }),
                "{:?} -> {:?}",
                range,
                err
            );
        }
    }

    #[test]
    fn test_display_and_from_str() {
        let range: VersionRange = "  ^1.2.0 ".parse().unwrap();
        assert_eq!(range.to_string(), "^1.2.0");
        assert!(range.matches(&v("1.9.0")));
    }

    #[test]
    fn test_overflowing_bump_is_rejected() {
        let range = format!("^{}.0.0", u64::MAX);
        assert!(parse_range(&range).is_err());
    }
}
