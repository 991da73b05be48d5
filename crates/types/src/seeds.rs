use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::{Known, sanitize};
use crate::error::{Error, ErrorKind};

/// Number of seeders in a swarm, as reported by trackers.
#[derive(Debug, Clone, Copy)]
pub enum SeedCount {
    Count(u64),
    /// No tracker has reported a number yet.
    Unknown,
}
impl SeedCount {
    /// The largest count reported by any tracker. Trackers report `-1` when
    /// they don't know; those are ignored.
    pub fn from_tracker_counts(counts: impl IntoIterator<Item = i64>) -> Self {
        counts
            .into_iter()
            .filter_map(|count| u64::try_from(count).ok())
            .max()
            .map_or(Self::Unknown, Self::Count)
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Count(count) => Some(*count),
            Self::Unknown => None,
        }
    }
}
impl Known for SeedCount {
    fn is_known(&self) -> bool {
        matches!(self, Self::Count(_))
    }
}
impl PartialEq for SeedCount {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (Self::Count(a), Self::Count(b)) if a == b)
    }
}
impl PartialOrd for SeedCount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}
impl FromStr for SeedCount {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match sanitize(s).as_str() {
            "?" | "unknown" => Ok(Self::Unknown),
            other => match other.parse::<u64>() {
                Ok(count) => Ok(Self::Count(count)),
                Err(_) => exn::bail!(ErrorKind::parse("seed count", s)),
            },
        }
    }
}
impl Display for SeedCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Unknown => write!(f, "?"),
        }
    }
}
