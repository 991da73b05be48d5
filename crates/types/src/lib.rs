//! Semantic value types for torrent daemon state.
//!
//! Every value a daemon reports for a torrent is a plain number, boolean or
//! string. This crate gives those numbers meaning:
//!
//! - **Sentinels**: [`Ratio`], [`Timedelta`], [`Timestamp`] and [`SeedCount`]
//!   have "not applicable" and/or "unknown" states. Sentinels behave like
//!   `NaN`: they are never equal to, less than or greater than anything
//!   (themselves included). Test for them explicitly with [`Known::is_known`]
//!   or the type's own `is_unknown()`/`is_not_applicable()`.
//! - **Parsing**: every type implements [`FromStr`](std::str::FromStr) for
//!   its canonical string form, plus the shorthand users type in filters
//!   (`10MB`, `5 minutes ago`, `high`, ...).
//! - **Rendering**: [`Display`](std::fmt::Display) produces the canonical
//!   form, which parses back to the same value.
//!
//! Everything here is immutable and `Send + Sync`.

pub mod error;
mod limit;
mod percent;
mod priority;
mod ratio;
mod seeds;
#[cfg(feature = "serde")]
mod serde_impls;
mod size;
mod status;
mod timedelta;
mod timestamp;

pub use crate::limit::Limit;
pub use crate::percent::Percent;
pub use crate::priority::Priority;
pub use crate::ratio::Ratio;
pub use crate::seeds::SeedCount;
pub use crate::size::{Bandwidth, Bytes};
pub use crate::status::{State, Status};
pub use crate::timedelta::Timedelta;
pub use crate::timestamp::Timestamp;

/// Values that may hold a sentinel instead of a measurement.
pub trait Known {
    /// Returns `false` for "unknown" and "not applicable" sentinels.
    fn is_known(&self) -> bool;
}

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase()
}
