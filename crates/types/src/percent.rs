use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// A percentage between 0 and 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Percent(f64);
impl Percent {
    pub const COMPLETE: Percent = Percent(100.0);

    /// Daemons report progress as a fraction between 0 and 1.
    pub fn from_fraction(fraction: f64) -> Self {
        Self(fraction * 100.0)
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 100.0
    }
}
impl TryFrom<f64> for Percent {
    type Error = Error;
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !(0.0..=100.0).contains(&value) {
            exn::bail!(ErrorKind::range("percent", value));
        }
        Ok(Self(value))
    }
}
impl FromStr for Percent {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
        let Ok(value) = number.parse::<f64>() else {
            exn::bail!(ErrorKind::parse("percent", s));
        };
        Self::try_from(value)
    }
}
impl Display for Percent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}%", self.0)
    }
}
