//! # Swarm Filter
//!
//! Comparison semantics for filtering torrents by their typed properties.
//!
//! Filters compare a torrent's value (the *item*) against a value the user
//! typed (the *user value*) with one of a fixed set of operators. Items that
//! aren't known never match, whatever the operator. Beyond that, times and
//! bandwidth limits need some interpretation:
//!
//! - [`cmp_timestamp_or_timedelta`]: points and spans in time, in any
//!   combination.
//! - [`limit_rate_filter`]: limits against rates, or against just "limited"
//!   or "unlimited".
//! - [`cmp_ratio`] and [`cmp_known`]: plain comparisons that respect unknown
//!   values.
//!
//! ```rust
//! use swarm_filter::{CmpOp, Sign, cmp_timestamp_or_timedelta, timestamp_or_timedelta};
//! use swarm_types::Timedelta;
//!
//! // "Finishes within the next hour."
//! let user = timestamp_or_timedelta("1h", Sign::Future).unwrap();
//! let eta = Timedelta::from_secs(1800).into();
//! assert!(cmp_timestamp_or_timedelta(eta, "<=".parse::<CmpOp>().unwrap(), user));
//! ```

pub mod error;
mod known;
mod limit;
mod op;
mod temporal;

pub use crate::known::{cmp_known, cmp_ratio};
pub use crate::limit::{UserLimit, limit_rate_filter};
pub use crate::op::CmpOp;
pub use crate::temporal::{Sign, Temporal, cmp_timestamp_or_timedelta, cmp_timestamp_or_timedelta_at, timestamp_or_timedelta};
