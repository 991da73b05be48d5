use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::{Known, sanitize};
use crate::error::{Error, ErrorKind};

/// Upload/download ratio of a torrent.
#[derive(Debug, Clone, Copy)]
pub enum Ratio {
    Value(f64),
    /// The ratio means nothing for this torrent (nothing downloaded yet).
    NotApplicable,
    /// The ratio means something, but the daemon couldn't work it out.
    Unknown,
}
impl Ratio {
    /// Daemon marker for [`NotApplicable`](Self::NotApplicable).
    pub const RAW_NOT_APPLICABLE: f64 = -1.0;
    /// Daemon marker for [`Unknown`](Self::Unknown).
    pub const RAW_UNKNOWN: f64 = -2.0;

    /// Decode the daemon's number, mapping its sentinel markers.
    pub fn from_raw(raw: f64) -> Self {
        if raw == Self::RAW_NOT_APPLICABLE {
            Self::NotApplicable
        } else if raw == Self::RAW_UNKNOWN {
            Self::Unknown
        } else {
            Self::Value(raw)
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(ratio) => Some(*ratio),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }
}
impl Known for Ratio {
    fn is_known(&self) -> bool {
        matches!(self, Self::Value(_))
    }
}
impl From<f64> for Ratio {
    fn from(value: f64) -> Self {
        Self::Value(value)
    }
}

impl PartialEq for Ratio {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a == b,
            _ => false,
        }
    }
}
impl PartialOrd for Ratio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
impl PartialEq<f64> for Ratio {
    fn eq(&self, other: &f64) -> bool {
        self.value().is_some_and(|ratio| ratio == *other)
    }
}
impl PartialOrd<f64> for Ratio {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.value().and_then(|ratio| ratio.partial_cmp(other))
    }
}

impl FromStr for Ratio {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "n/a" | "na" => Self::NotApplicable,
            "?" | "unknown" => Self::Unknown,
            other => {
                let Ok(ratio) = other.parse::<f64>() else {
                    exn::bail!(ErrorKind::parse("ratio", s));
                };
                if ratio.is_nan() || ratio < 0.0 {
                    exn::bail!(ErrorKind::range("ratio", ratio));
                }
                Self::Value(ratio)
            },
        })
    }
}
impl Display for Ratio {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Value(ratio) => write!(f, "{ratio}"),
            Self::NotApplicable => write!(f, "n/a"),
            Self::Unknown => write!(f, "?"),
        }
    }
}
