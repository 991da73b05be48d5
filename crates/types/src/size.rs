use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, ErrorKind};

static QUANTITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*([kKMGT]i?)?[bB]?$").unwrap());

const DECIMAL_PREFIXES: [&str; 5] = ["k", "M", "G", "T", "P"];

/// Parse a number of bytes with an optional decimal (`k`, `M`, ...) or
/// binary (`Ki`, `Mi`, ...) unit prefix.
fn parse_quantity(kind: &'static str, s: &str) -> Result<u64, Error> {
    let Some(captures) = QUANTITY_REGEX.captures(s.trim()) else {
        exn::bail!(ErrorKind::parse(kind, s));
    };
    let Ok(number) = captures[1].parse::<f64>() else {
        exn::bail!(ErrorKind::parse(kind, s));
    };
    let multiplier = match captures.get(2).map(|m| m.as_str()) {
        None => 1.0,
        Some(prefix) => {
            let base: f64 = if prefix.ends_with('i') { 1024.0 } else { 1000.0 };
            let exponent = match prefix.chars().next() {
                Some('k' | 'K') => 1,
                Some('M') => 2,
                Some('G') => 3,
                _ => 4,
            };
            base.powi(exponent)
        },
    };
    let bytes = (number * multiplier).round();
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        exn::bail!(ErrorKind::range(kind, s.trim()));
    }
    Ok(bytes as u64)
}

fn format_quantity(f: &mut Formatter<'_>, bytes: u64) -> FmtResult {
    if bytes < 1000 {
        return write!(f, "{bytes} B");
    }
    let mut value = bytes as f64;
    let mut prefix = "";
    for candidate in DECIMAL_PREFIXES {
        if value < 1000.0 {
            break;
        }
        value /= 1000.0;
        prefix = candidate;
    }
    match value {
        v if v < 10.0 => write!(f, "{value:.2} {prefix}B"),
        v if v < 100.0 => write!(f, "{value:.1} {prefix}B"),
        _ => write!(f, "{value:.0} {prefix}B"),
    }
}

/// An amount of data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bytes(pub u64);
impl Bytes {
    pub fn get(&self) -> u64 {
        self.0
    }
}
impl From<u64> for Bytes {
    fn from(bytes: u64) -> Self {
        Self(bytes)
    }
}
impl FromStr for Bytes {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_quantity("size", s).map(Self)
    }
}
impl Display for Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        format_quantity(f, self.0)
    }
}

/// A transfer rate in bytes per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bandwidth(pub u64);
impl Bandwidth {
    pub fn bytes_per_second(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}
impl From<u64> for Bandwidth {
    fn from(bytes_per_second: u64) -> Self {
        Self(bytes_per_second)
    }
}
impl FromStr for Bandwidth {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let quantity = trimmed.strip_suffix("/s").unwrap_or(trimmed);
        parse_quantity("bandwidth", quantity).map(Self)
    }
}
impl Display for Bandwidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        format_quantity(f, self.0)?;
        write!(f, "/s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", 0)]
    #[case("512", 512)]
    #[case("512B", 512)]
    #[case("10k", 10_000)]
    #[case("10 kB", 10_000)]
    #[case("1.5M", 1_500_000)]
    #[case("1Ki", 1024)]
    #[case("2 MiB", 2 * 1024 * 1024)]
    #[case("1G", 1_000_000_000)]
    fn test_parse_bytes(#[case] input: &str, #[case] expected: u64) {
        assert_eq!(input.parse::<Bytes>().unwrap(), Bytes(expected));
    }

    #[rstest]
    #[case("")]
    #[case("ten")]
    #[case("-5k")]
    #[case("5X")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Bytes>().is_err(), "{input:?} should not parse");
    }

    #[rstest]
    #[case(999, "999 B")]
    #[case(1_500, "1.50 kB")]
    #[case(25_300_000, "25.3 MB")]
    #[case(512_000_000_000, "512 GB")]
    fn test_display_bytes(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(Bytes(bytes).to_string(), expected);
        assert_eq!(expected.parse::<Bytes>().unwrap().to_string(), expected);
    }

    #[test]
    fn test_bandwidth() {
        assert_eq!("100k/s".parse::<Bandwidth>().unwrap(), Bandwidth(100_000));
        assert_eq!("100 kB/s".parse::<Bandwidth>().unwrap(), Bandwidth(100_000));
        assert_eq!(Bandwidth(1_500).to_string(), "1.50 kB/s");
        assert!(Bandwidth(0).is_zero());
        assert!(Bandwidth(10) < Bandwidth(20));
    }
}
