use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::Bandwidth;
use crate::error::Error;

/// A bandwidth limit. [`Unlimited`](Self::Unlimited) sorts above every
/// finite limit, like positive infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Limit {
    Limited(Bandwidth),
    Unlimited,
}
impl Limit {
    /// Bytes in the daemon's "kilobyte" speed unit.
    pub const RAW_UNIT: u64 = 1000;

    /// Decode the daemon's limit (in kB/s) and its separate on/off switch.
    pub fn from_raw(kilobytes_per_second: u64, limited: bool) -> Self {
        if limited {
            Self::Limited(Bandwidth(kilobytes_per_second.saturating_mul(Self::RAW_UNIT)))
        } else {
            Self::Unlimited
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Bytes per second, with [`Unlimited`](Self::Unlimited) as infinity.
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Limited(bandwidth) => bandwidth.bytes_per_second() as f64,
            Self::Unlimited => f64::INFINITY,
        }
    }
}
impl From<Bandwidth> for Limit {
    fn from(bandwidth: Bandwidth) -> Self {
        Self::Limited(bandwidth)
    }
}
impl PartialEq<f64> for Limit {
    fn eq(&self, other: &f64) -> bool {
        self.as_f64() == *other
    }
}
impl PartialOrd<f64> for Limit {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.as_f64().partial_cmp(other)
    }
}
impl FromStr for Limit {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match sanitize(s).as_str() {
            "unlimited" | "off" | "none" | "inf" => Ok(Self::Unlimited),
            _ => s.parse::<Bandwidth>().map(Self::Limited),
        }
    }
}
impl Display for Limit {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Limited(bandwidth) => write!(f, "{bandwidth}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(Limit::from_raw(100, true), Limit::Limited(Bandwidth(100_000)));
        assert_eq!(Limit::from_raw(100, false), Limit::Unlimited);
    }

    #[test]
    fn test_unlimited_is_infinite() {
        assert!(Limit::Unlimited > Limit::Limited(Bandwidth(u64::MAX)));
        assert!(Limit::Unlimited > 1e300);
        assert!(Limit::Unlimited == f64::INFINITY);
        assert!(Limit::Limited(Bandwidth(500)) < 501.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("off".parse::<Limit>().unwrap(), Limit::Unlimited);
        assert_eq!("1M".parse::<Limit>().unwrap(), Limit::Limited(Bandwidth(1_000_000)));
        assert_eq!("unlimited".parse::<Limit>().unwrap().to_string(), "unlimited");
        assert!("fast".parse::<Limit>().is_err());
    }
}
