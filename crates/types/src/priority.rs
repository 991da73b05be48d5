use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Download priority of a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// The file is not downloaded at all.
    Off,
    Low,
    #[default]
    Normal,
    High,
}
impl Priority {
    /// Decode the daemon's priority number (`-1`, `0` or `1`).
    ///
    /// Daemons track "don't download" separately from priority, so this never
    /// returns [`Off`](Self::Off); see [`with_wanted`](Self::with_wanted).
    pub fn from_raw(raw: i64) -> Result<Self, Error> {
        Ok(match raw {
            -1 => Self::Low,
            0 => Self::Normal,
            1 => Self::High,
            _ => exn::bail!(ErrorKind::range("priority", raw)),
        })
    }

    /// The effective priority: unwanted files are [`Off`](Self::Off).
    #[must_use]
    pub fn with_wanted(self, wanted: bool) -> Self {
        if wanted { self } else { Self::Off }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}
impl TryFrom<i64> for Priority {
    type Error = Error;
    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        Self::from_raw(raw)
    }
}
impl FromStr for Priority {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "off" | "o" | "0" => Self::Off,
            "low" | "l" | "-" => Self::Low,
            "normal" | "n" | "=" => Self::Normal,
            "high" | "h" | "+" => Self::High,
            _ => exn::bail!(ErrorKind::parse("priority", s)),
        })
    }
}
impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
