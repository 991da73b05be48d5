//! Absolute points in time.
//!
//! User input is read as UTC; the daemon reports Unix timestamps, which are
//! UTC by definition.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use time::{Date, Month, Time, UtcDateTime};

use super::{Known, sanitize};
use crate::Timedelta;
use crate::error::{Error, ErrorKind};

/// A point in time, or a sentinel.
#[derive(Debug, Clone, Copy)]
pub enum Timestamp {
    At(UtcDateTime),
    /// The event never happened (e.g. a torrent that was never completed).
    NotApplicable,
    Unknown,
}
impl Timestamp {
    /// Decode the daemon's Unix timestamp. Zero means "never", negative
    /// numbers (and anything `time` can't represent) mean "unknown".
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::NotApplicable,
            raw if raw < 0 => Self::Unknown,
            raw => UtcDateTime::from_unix_timestamp(raw).map_or(Self::Unknown, Self::At),
        }
    }

    pub fn datetime(&self) -> Option<UtcDateTime> {
        match self {
            Self::At(datetime) => Some(*datetime),
            _ => None,
        }
    }

    pub fn unix_timestamp(&self) -> Option<i64> {
        self.datetime().map(|datetime| datetime.unix_timestamp())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    /// The span from `reference` to this point in time; positive if this
    /// timestamp lies after `reference`.
    pub fn timedelta_at(&self, reference: UtcDateTime) -> Timedelta {
        match self {
            Self::At(datetime) => Timedelta::Delta(*datetime - reference),
            Self::NotApplicable => Timedelta::NotApplicable,
            Self::Unknown => Timedelta::Unknown,
        }
    }

    /// The span from now to this point in time.
    pub fn timedelta(&self) -> Timedelta {
        self.timedelta_at(UtcDateTime::now())
    }
}

fn parse_date(s: &str) -> Option<Date> {
    let mut parts = s.split('-');
    let year = parts.next().filter(|year| year.len() == 4)?.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(month) => Month::try_from(month.parse::<u8>().ok()?).ok()?,
        None => Month::January,
    };
    let day = match parts.next() {
        Some(day) => day.parse::<u8>().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }
    Date::from_calendar_date(year, month, day).ok()
}

fn parse_time(s: &str) -> Option<Time> {
    let mut parts = s.split(':');
    let hour = parts.next()?.parse::<u8>().ok()?;
    let minute = parts.next()?.parse::<u8>().ok()?;
    let second = match parts.next() {
        Some(second) => second.parse::<u8>().ok()?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Time::from_hms(hour, minute, second).ok()
}

fn parse_datetime(s: &str) -> Option<UtcDateTime> {
    let mut words = s.split_whitespace();
    let first = words.next()?;
    let second = words.next();
    if words.next().is_some() {
        return None;
    }
    match second {
        Some(time) => Some(UtcDateTime::new(parse_date(first)?, parse_time(time)?)),
        // A lone time of day means today.
        None if first.contains(':') => Some(UtcDateTime::new(UtcDateTime::now().date(), parse_time(first)?)),
        None => Some(UtcDateTime::new(parse_date(first)?, Time::MIDNIGHT)),
    }
}

impl Known for Timestamp {
    fn is_known(&self) -> bool {
        matches!(self, Self::At(_))
    }
}
impl From<UtcDateTime> for Timestamp {
    fn from(datetime: UtcDateTime) -> Self {
        Self::At(datetime)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::At(a), Self::At(b)) => a == b,
            _ => false,
        }
    }
}
impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::At(a), Self::At(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl FromStr for Timestamp {
    type Err = Error;
    /// Accepts `YYYY-MM-DD HH:MM[:SS]`, `YYYY[-MM[-DD]]` and `HH:MM[:SS]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match sanitize(s).as_str() {
            "never" | "n/a" | "na" => Ok(Self::NotApplicable),
            "?" | "unknown" => Ok(Self::Unknown),
            other => match parse_datetime(other) {
                Some(datetime) => Ok(Self::At(datetime)),
                None => exn::bail!(ErrorKind::parse("timestamp", s)),
            },
        }
    }
}
impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::At(dt) => write!(
                f,
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                dt.year(),
                u8::from(dt.month()),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second()
            ),
            Self::NotApplicable => write!(f, "never"),
            Self::Unknown => write!(f, "?"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "never")]
    #[case(-5, "?")]
    #[case(1_600_000_000, "2020-09-13 12:26:40")]
    fn test_from_raw(#[case] raw: i64, #[case] expected: &str) {
        assert_eq!(Timestamp::from_raw(raw).to_string(), expected);
    }

    #[rstest]
    #[case("2020-09-13 12:26:40", "2020-09-13 12:26:40")]
    #[case("2020-09-13 12:26", "2020-09-13 12:26:00")]
    #[case("2020-09-13", "2020-09-13 00:00:00")]
    #[case("2020-09", "2020-09-01 00:00:00")]
    #[case("2020", "2020-01-01 00:00:00")]
    #[case("Never", "never")]
    fn test_parse(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.parse::<Timestamp>().unwrap().to_string(), expected);
    }

    #[test]
    fn test_parse_time_of_day() {
        let timestamp: Timestamp = "13:37".parse().unwrap();
        let datetime = timestamp.datetime().unwrap();
        assert_eq!(datetime.date(), UtcDateTime::now().date());
        assert_eq!((datetime.hour(), datetime.minute()), (13, 37));
    }

    #[rstest]
    #[case("5")]
    #[case("5m")]
    #[case("20-01-01")]
    #[case("2020-13-01")]
    #[case("2020-02-30")]
    #[case("25:00")]
    #[case("2020-01-01 10:00 extra")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Timestamp>().is_err(), "{input:?} should not parse");
    }

    #[test]
    fn test_timedelta_at() {
        let reference = UtcDateTime::from_unix_timestamp(1_000).unwrap();
        let timestamp = Timestamp::from_raw(700);
        assert_eq!(timestamp.timedelta_at(reference), Timedelta::from_secs(-300));
        assert!(Timestamp::NotApplicable.timedelta_at(reference).is_not_applicable());
    }

    #[test]
    fn test_sentinels_never_compare() {
        assert_ne!(Timestamp::Unknown, Timestamp::Unknown);
        assert!(!(Timestamp::NotApplicable < Timestamp::from_raw(1)));
        assert!(Timestamp::from_raw(1) < Timestamp::from_raw(2));
    }
}
