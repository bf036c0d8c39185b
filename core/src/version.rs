//! Dotted version strings and version constraint expressions.
//!
//! A [`Version`] is one or more dot-separated unsigned decimal segments,
//! optionally followed by a `-qualifier` that is ignored for ordering:
//!
//! ```
//! use jsonmatch::Version;
//! use std::cmp::Ordering;
//!
//! let a: Version = "1.2".parse().unwrap();
//! let b: Version = "1.2.0-beta".parse().unwrap();
//! assert_eq!(a.compare(&b), Ordering::Equal); // missing segments are zero
//! assert!("1.x".parse::<Version>().is_err());
//! ```
//!
//! A [`VersionConstraint`] is the expression carried by `version_matches`:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `1.2.3` | exactly 1.2.3 (`1.2.3.0` also matches) |
//! | `1.2.+` / `1.2+` | leading segments are `1.2` |
//! | `+` | any valid version |
//! | `[1.0,2.0)` | interval; `[`/`]` inclusive, `(`/`)` exclusive |
//! | `[1.0,)` / `(,2.0]` | half-open interval |
//! | `]1.0,2.0[` | reversed brackets are exclusive |

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Errors from parsing a version or version constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Not a dotted sequence of decimal segments.
    #[error("invalid version \"{0}\": expected dot-separated numbers such as \"1.2.3\"")]
    InvalidVersion(String),
    /// Constraint expression is malformed.
    #[error("invalid version constraint \"{expr}\": {reason}")]
    InvalidConstraint {
        /// The expression as written.
        expr: String,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// A parsed dotted version.
///
/// Equality is textual so that a matcher serializes back to the string it was
/// parsed from. Use [`compare`](Self::compare) for version ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    raw: String,
    segments: Vec<u64>,
}

impl Version {
    /// The version as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric segments, qualifier dropped.
    #[must_use]
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Componentwise numeric ordering. Missing trailing segments count as zero.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Ordering {
        compare_segments(&self.segments, &other.segments)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let core = trimmed.split_once('-').map_or(trimmed, |(core, _)| core);
        let segments =
            parse_segments(core).ok_or_else(|| VersionError::InvalidVersion(s.to_string()))?;
        Ok(Self {
            raw: s.to_string(),
            segments,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segments(core: &str) -> Option<Vec<u64>> {
    if core.is_empty() {
        return None;
    }
    core.split('.')
        .map(|seg| {
            if !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()) {
                seg.parse::<u64>().ok()
            } else {
                None
            }
        })
        .collect()
}

fn compare_segments(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constraints
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RangeBound {
    version: Version,
    inclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstraintKind {
    Exact(Version),
    Prefix(Vec<u64>),
    Range {
        lower: Option<RangeBound>,
        upper: Option<RangeBound>,
    },
}

/// A parsed `version_matches` expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionConstraint {
    raw: String,
    kind: ConstraintKind,
}

impl VersionConstraint {
    /// The expression as originally written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if `version` satisfies this constraint.
    #[must_use]
    pub fn matches(&self, version: &Version) -> bool {
        match &self.kind {
            ConstraintKind::Exact(expected) => version.compare(expected).is_eq(),
            ConstraintKind::Prefix(prefix) => prefix
                .iter()
                .enumerate()
                .all(|(i, seg)| version.segments.get(i).copied().unwrap_or(0) == *seg),
            ConstraintKind::Range { lower, upper } => {
                let above = lower.as_ref().map_or(true, |b| {
                    let ord = version.compare(&b.version);
                    ord.is_gt() || (b.inclusive && ord.is_eq())
                });
                let below = upper.as_ref().map_or(true, |b| {
                    let ord = version.compare(&b.version);
                    ord.is_lt() || (b.inclusive && ord.is_eq())
                });
                above && below
            }
        }
    }
}

impl FromStr for VersionConstraint {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        let invalid = |reason| VersionError::InvalidConstraint {
            expr: s.to_string(),
            reason,
        };

        if expr.is_empty() {
            return Err(invalid("expression is empty"));
        }

        let kind = if expr.starts_with(['[', '(', ']']) {
            parse_range(expr).map_err(invalid)?
        } else if let Some(prefix) = expr.strip_suffix('+') {
            let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
            if prefix.is_empty() {
                ConstraintKind::Prefix(Vec::new())
            } else {
                ConstraintKind::Prefix(
                    parse_segments(prefix).ok_or_else(|| invalid("prefix is not a version"))?,
                )
            }
        } else {
            ConstraintKind::Exact(expr.parse()?)
        };

        Ok(Self {
            raw: s.to_string(),
            kind,
        })
    }
}

fn parse_range(expr: &str) -> Result<ConstraintKind, &'static str> {
    let mut chars = expr.chars();
    let open = chars.next().ok_or("expression is empty")?;
    let close = chars.next_back().ok_or("range is not closed")?;
    if !matches!(close, ']' | ')' | '[') || expr.len() < 2 {
        return Err("range must end with ']', ')' or '['");
    }
    let inner = &expr[1..expr.len() - 1];
    let (low, high) = inner
        .split_once(',')
        .ok_or("range must contain a ',' between bounds")?;

    let bound = |text: &str, inclusive: bool| -> Result<Option<RangeBound>, &'static str> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let version = text
            .parse::<Version>()
            .map_err(|_| "range bound is not a version")?;
        Ok(Some(RangeBound { version, inclusive }))
    };

    let lower = bound(low, open == '[')?;
    let upper = bound(high, close == ']')?;

    match (&lower, &upper) {
        (None, None) => Err("range needs at least one bound"),
        (Some(l), Some(u)) if l.version.compare(&u.version).is_gt() => {
            Err("lower bound is greater than upper bound")
        }
        _ => Ok(ConstraintKind::Range { lower, upper }),
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
