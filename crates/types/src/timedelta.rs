//! Signed time spans.
//!
//! A [`Timedelta`] is positive when it points into the future ("in 5
//! minutes") and negative when it points into the past ("5 minutes ago").

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use time::{Duration, UtcDateTime};

use super::{Known, sanitize};
use crate::Timestamp;
use crate::error::{Error, ErrorKind};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;
// Roughly 30 million years; keeps every conversion well inside `Duration`.
const MAX_SECONDS: f64 = 1e15;

/// Units used for rendering, largest first. Weeks and months are accepted
/// when parsing but never produced.
const RENDER_UNITS: [(i64, &str); 5] = [(YEAR, "y"), (DAY, "d"), (HOUR, "h"), (MINUTE, "m"), (1, "s")];

static BODY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\s*\d+(?:\.\d+)?\s*[[:alpha:]]*)+\s*$").unwrap());
static GROUP_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([[:alpha:]]*)").unwrap());

/// A signed span of time, or a sentinel.
#[derive(Debug, Clone, Copy)]
pub enum Timedelta {
    Delta(Duration),
    /// The span means nothing for this torrent (e.g. ETA of a stopped torrent).
    NotApplicable,
    /// The span means something, but the daemon couldn't work it out.
    Unknown,
}
impl Timedelta {
    /// Daemon marker for [`NotApplicable`](Self::NotApplicable).
    pub const RAW_NOT_APPLICABLE: i64 = -1;
    /// Daemon marker for [`Unknown`](Self::Unknown).
    pub const RAW_UNKNOWN: i64 = -2;

    pub fn from_secs(seconds: i64) -> Self {
        Self::Delta(Duration::seconds(seconds))
    }

    /// Decode the daemon's number of seconds, mapping its sentinel markers.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            Self::RAW_NOT_APPLICABLE => Self::NotApplicable,
            Self::RAW_UNKNOWN => Self::Unknown,
            seconds => Self::from_secs(seconds),
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Delta(duration) => Some(*duration),
            _ => None,
        }
    }

    /// Whole seconds, truncated towards zero.
    pub fn seconds(&self) -> Option<i64> {
        self.duration().map(|duration| duration.whole_seconds())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// Strictly in the future. Sentinels are neither positive nor negative.
    pub fn is_positive(&self) -> bool {
        self.duration().is_some_and(|duration| duration.is_positive())
    }

    /// Strictly in the past.
    pub fn is_negative(&self) -> bool {
        self.duration().is_some_and(|duration| duration.is_negative())
    }

    /// The same span pointing the other way in time.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Delta(duration) => Self::Delta(-duration),
            sentinel => sentinel,
        }
    }

    /// The magnitude of the span.
    #[must_use]
    pub fn abs(self) -> Self {
        match self {
            Self::Delta(duration) => Self::Delta(duration.abs()),
            sentinel => sentinel,
        }
    }

    /// The absolute point in time this span points at, seen from `reference`.
    pub fn timestamp_at(&self, reference: UtcDateTime) -> Timestamp {
        match self {
            Self::Delta(duration) => reference.checked_add(*duration).map_or(Timestamp::Unknown, Timestamp::At),
            Self::NotApplicable => Timestamp::NotApplicable,
            Self::Unknown => Timestamp::Unknown,
        }
    }

    /// The absolute point in time this span points at, seen from now.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp_at(UtcDateTime::now())
    }

    /// Returns `true` if `s` says which way in time it points: a leading
    /// `+`/`-`, an `in ...` prefix or an `... ago` suffix.
    ///
    /// Unsigned input parses as a future span; callers that want a different
    /// default can [`inverse`](Self::inverse) it when this returns `false`.
    pub fn is_explicitly_signed(s: &str) -> bool {
        let s = sanitize(s);
        s.starts_with(['+', '-']) || s.starts_with("in") || s.ends_with("ago")
    }

    fn parse_body(original: &str, body: &str) -> Result<f64, Error> {
        if body.is_empty() || !BODY_REGEX.is_match(body) {
            exn::bail!(ErrorKind::parse("timedelta", original));
        }
        let mut seconds = 0.0;
        for captures in GROUP_REGEX.captures_iter(body) {
            let (_, [number, unit]) = captures.extract();
            let Ok(number) = number.parse::<f64>() else {
                exn::bail!(ErrorKind::parse("timedelta", original));
            };
            let Some(multiplier) = unit_seconds(unit) else {
                exn::bail!(ErrorKind::parse("timedelta", original));
            };
            seconds += number * multiplier as f64;
        }
        if !seconds.is_finite() || seconds > MAX_SECONDS {
            exn::bail!(ErrorKind::range("timedelta", original.trim()));
        }
        Ok(seconds)
    }
}

fn unit_seconds(unit: &str) -> Option<i64> {
    // "M" is the only case-sensitive unit; "m" means minutes.
    if unit == "M" {
        return Some(MONTH);
    }
    Some(match unit.to_lowercase().as_str() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => HOUR,
        "d" | "day" | "days" => DAY,
        "w" | "week" | "weeks" => WEEK,
        "mo" | "month" | "months" => MONTH,
        "y" | "year" | "years" => YEAR,
        _ => return None,
    })
}

impl Known for Timedelta {
    fn is_known(&self) -> bool {
        matches!(self, Self::Delta(_))
    }
}
impl From<Duration> for Timedelta {
    fn from(duration: Duration) -> Self {
        Self::Delta(duration)
    }
}

impl PartialEq for Timedelta {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Delta(a), Self::Delta(b)) => a == b,
            _ => false,
        }
    }
}
impl PartialOrd for Timedelta {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Delta(a), Self::Delta(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl FromStr for Timedelta {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match sanitize(trimmed).as_str() {
            "n/a" | "na" => return Ok(Self::NotApplicable),
            "?" | "unknown" => return Ok(Self::Unknown),
            _ => {},
        }
        let lower = trimmed.to_lowercase();
        let (body, negative) = if let Some(rest) = trimmed.strip_prefix('+') {
            (rest, false)
        } else if let Some(rest) = trimmed.strip_prefix('-') {
            (rest, true)
        } else if lower.starts_with("in") {
            (&trimmed[2..], false)
        } else if lower.ends_with("ago") {
            (&trimmed[..trimmed.len() - 3], true)
        } else {
            (trimmed, false)
        };
        let seconds = Self::parse_body(s, body.trim())?;
        let duration = Duration::seconds_f64(seconds);
        Ok(Self::Delta(if negative { -duration } else { duration }))
    }
}
impl Display for Timedelta {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let duration = match self {
            Self::Delta(duration) => *duration,
            Self::NotApplicable => return write!(f, "n/a"),
            Self::Unknown => return write!(f, "?"),
        };
        let mut remaining = duration.whole_seconds();
        if remaining == 0 {
            return write!(f, "0s");
        }
        if remaining < 0 {
            write!(f, "-")?;
            remaining = remaining.saturating_abs();
        }
        for (unit, suffix) in RENDER_UNITS {
            let amount = remaining / unit;
            if amount > 0 {
                write!(f, "{amount}{suffix}")?;
                remaining -= amount * unit;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-1, "n/a")]
    #[case(-2, "?")]
    #[case(0, "0s")]
    #[case(90, "1m30s")]
    #[case(DAY + HOUR, "1d1h")]
    fn test_from_raw(#[case] raw: i64, #[case] expected: &str) {
        assert_eq!(Timedelta::from_raw(raw).to_string(), expected);
    }

    #[rstest]
    #[case("5", 5)]
    #[case("5m", 5 * MINUTE)]
    #[case("1h30m", HOUR + 30 * MINUTE)]
    #[case("1h 30min", HOUR + 30 * MINUTE)]
    #[case("2 days", 2 * DAY)]
    #[case("1M", MONTH)]
    #[case("1y", YEAR)]
    #[case("1.5h", HOUR + 30 * MINUTE)]
    #[case("+10s", 10)]
    #[case("-10s", -10)]
    #[case("in 5 minutes", 5 * MINUTE)]
    #[case("5 minutes ago", -5 * MINUTE)]
    #[case("3w ago", -3 * WEEK)]
    fn test_parse(#[case] input: &str, #[case] seconds: i64) {
        let delta: Timedelta = input.parse().unwrap();
        assert_eq!(delta.seconds(), Some(seconds));
    }

    #[rstest]
    #[case("")]
    #[case("ago")]
    #[case("5 parsecs")]
    #[case("five minutes")]
    #[case("m5")]
    #[case("--5")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Timedelta>().is_err(), "{input:?} should not parse");
    }

    #[rstest]
    #[case("1y2d3h4m5s")]
    #[case("-5m")]
    #[case("0s")]
    #[case("n/a")]
    #[case("?")]
    fn test_canonical_form(#[case] canonical: &str) {
        assert_eq!(canonical.parse::<Timedelta>().unwrap().to_string(), canonical);
    }

    #[rstest]
    #[case("5m", false)]
    #[case("+5m", true)]
    #[case("-5m", true)]
    #[case("in 5m", true)]
    #[case("5m ago", true)]
    fn test_explicit_sign(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(Timedelta::is_explicitly_signed(input), expected);
    }

    #[test]
    fn test_sentinels_never_compare() {
        assert_ne!(Timedelta::Unknown, Timedelta::Unknown);
        assert!(!(Timedelta::NotApplicable < Timedelta::from_secs(1)));
        assert!(!Timedelta::Unknown.is_positive());
        assert!(!Timedelta::Unknown.is_negative());
        assert!(Timedelta::Unknown.inverse().is_unknown());
    }

    #[test]
    fn test_inverse_and_abs() {
        let delta = Timedelta::from_secs(-300);
        assert!(delta.is_negative());
        assert_eq!(delta.inverse(), Timedelta::from_secs(300));
        assert_eq!(delta.abs(), Timedelta::from_secs(300));
    }

    #[test]
    fn test_timestamp_at() {
        let reference = UtcDateTime::from_unix_timestamp(1_000_000).unwrap();
        let timestamp = Timedelta::from_secs(-100).timestamp_at(reference);
        assert_eq!(timestamp.unix_timestamp(), Some(999_900));
        assert!(Timedelta::NotApplicable.timestamp_at(reference).is_not_applicable());
    }
}
