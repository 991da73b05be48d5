//! Comparing points and spans in time.
//!
//! Users filter time properties with either an absolute timestamp
//! (`2024-01-31`) or a span relative to now (`2d`, `in 1h`, `-30m`), while
//! torrents expose both kinds too: "added at" is a timestamp, "ETA" is a
//! span. Any combination compares sensibly.

use std::fmt::{Display, Formatter, Result as FmtResult};

use swarm_types::{Known, Timedelta, Timestamp};
use time::UtcDateTime;
use tracing::instrument;

use crate::CmpOp;
use crate::error::{ErrorKind, Result};

/// Which way in time a span without explicit sign points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sign {
    #[default]
    Future,
    Past,
}

/// A point or a span in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temporal {
    Timestamp(Timestamp),
    Timedelta(Timedelta),
}
impl Temporal {
    pub fn is_known(&self) -> bool {
        match self {
            Self::Timestamp(timestamp) => timestamp.is_known(),
            Self::Timedelta(timedelta) => timedelta.is_known(),
        }
    }
}
impl From<Timestamp> for Temporal {
    fn from(timestamp: Timestamp) -> Self {
        Self::Timestamp(timestamp)
    }
}
impl From<Timedelta> for Temporal {
    fn from(timedelta: Timedelta) -> Self {
        Self::Timedelta(timedelta)
    }
}
impl Display for Temporal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Timestamp(timestamp) => write!(f, "{timestamp}"),
            Self::Timedelta(timedelta) => write!(f, "{timedelta}"),
        }
    }
}

/// Parses user input as a timestamp, or failing that, a span.
///
/// A span that doesn't say which way it points (`+`/`-`, `in ...`,
/// `... ago`) points towards `default`.
pub fn timestamp_or_timedelta(s: &str, default: Sign) -> Result<Temporal> {
    if let Ok(timestamp) = s.parse::<Timestamp>() {
        return Ok(Temporal::Timestamp(timestamp));
    }
    let Ok(delta) = s.parse::<Timedelta>() else {
        exn::bail!(ErrorKind::InvalidValue { kind: "timestamp or time span", value: s.to_string() });
    };
    if default == Sign::Past && !Timedelta::is_explicitly_signed(s) {
        return Ok(Temporal::Timedelta(delta.inverse()));
    }
    Ok(Temporal::Timedelta(delta))
}

/// [`cmp_timestamp_or_timedelta_at`], as seen from now.
pub fn cmp_timestamp_or_timedelta(item: Temporal, op: CmpOp, user: Temporal) -> bool {
    self::cmp_timestamp_or_timedelta_at(item, op, user, UtcDateTime::now())
}

/// Compares a torrent's time property against a user's, with `now` as the
/// reference for converting between points and spans.
///
/// - Unknown item values never match.
/// - Timestamps compare directly, as do a timestamp item and a span turned
///   into a timestamp.
/// - A span item against a user timestamp compares against the span from
///   `now` to that timestamp.
/// - Two spans: a user span in the past (or zero) never matches items in the
///   future and vice versa; otherwise magnitudes are compared, so "`<= 1h`"
///   means "within an hour" in whichever direction the user pointed.
#[instrument(level = "trace", ret)]
pub fn cmp_timestamp_or_timedelta_at(item: Temporal, op: CmpOp, user: Temporal, now: UtcDateTime) -> bool {
    if !item.is_known() {
        return false;
    }
    match (item, user) {
        (Temporal::Timestamp(item), Temporal::Timestamp(user)) => op.apply(&item, &user),
        (Temporal::Timestamp(item), Temporal::Timedelta(user)) => op.apply(&item, &user.timestamp_at(now)),
        (Temporal::Timedelta(item), Temporal::Timestamp(user)) => op.apply(&item, &user.timedelta_at(now)),
        (Temporal::Timedelta(item), Temporal::Timedelta(user)) => {
            if !user.is_positive() && item.is_positive() {
                return false;
            }
            if user.is_positive() && item.is_negative() {
                return false;
            }
            op.apply(&item.abs(), &user.abs())
        },
    }
}
