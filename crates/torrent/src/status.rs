//! Status derivation.
//!
//! A torrent's [`Status`] is a pure function of a handful of raw fields:
//! `status`, `percentDone`, `metadataPercentComplete`, `rateDownload`,
//! `rateUpload`, `peersConnected`, `trackerStats` and `isPrivate`. Fields are
//! only read by the branch that needs them.

use swarm_types::{State, Status};
use tracing::instrument;

use crate::error::Result;
use crate::raw::{self, RawTorrent};
use crate::trackers;

/// Activity codes reported in the raw `status` field.
mod code {
    pub const STOPPED: i64 = 0;
    pub const CHECK_WAIT: i64 = 1;
    pub const CHECK: i64 = 2;
    pub const DOWNLOAD_WAIT: i64 = 3;
    pub const SEED_WAIT: i64 = 5;
}

/// A private torrent that can't reach any tracker can't find peers.
///
/// That is: no trackers at all, or at least one has announced and none of
/// the announces succeeded.
#[instrument(level = "trace", skip(raw))]
pub fn is_isolated(raw: &RawTorrent) -> Result<bool> {
    if !raw::boolean(raw, "isPrivate")? {
        return Ok(false);
    }
    let stats = trackers::tracker_stats(raw)?;
    if stats.is_empty() {
        return Ok(true);
    }
    let announced = stats.iter().any(|tracker| tracker.has_announced);
    let succeeded = stats.iter().any(|tracker| tracker.last_announce_succeeded);
    Ok(announced && !succeeded)
}

/// Derives the ordered set of states a torrent is in.
///
/// Tags are added in a fixed order, never duplicated:
///
/// 1. `Stopped` when the daemon has stopped the torrent, `Verify` when it is
///    checking (or waiting to check) local data, `Queued` when waiting to
///    check, download or seed.
/// 2. Unless stopped: `Isolated` (see [`is_isolated`]), then `Init` while
///    metadata is incomplete.
/// 3. Unless stopped or queued: with connected peers, `Download` and
///    `Upload` for non-zero transfer rates, then `Connected`; `Seed` once
///    all wanted data is downloaded.
/// 4. `Idle` when none of `Upload`, `Download` or `Verify` apply.
#[instrument(level = "trace", skip(raw))]
pub fn derive_status(raw: &RawTorrent) -> Result<Status> {
    let mut status = Status::new();
    let activity = raw::int(raw, "status")?;

    let stopped = activity == code::STOPPED;
    if stopped {
        status.insert(State::Stopped);
    }
    if matches!(activity, code::CHECK_WAIT | code::CHECK) {
        status.insert(State::Verify);
    }
    let queued = matches!(activity, code::CHECK_WAIT | code::DOWNLOAD_WAIT | code::SEED_WAIT);
    if queued {
        status.insert(State::Queued);
    }

    if !stopped {
        if self::is_isolated(raw)? {
            status.insert(State::Isolated);
        }
        if raw::float(raw, "metadataPercentComplete")? < 1.0 {
            status.insert(State::Init);
        }

        if !queued {
            if raw::uint(raw, "peersConnected")? > 0 {
                if raw::uint(raw, "rateDownload")? > 0 {
                    status.insert(State::Download);
                }
                if raw::uint(raw, "rateUpload")? > 0 {
                    status.insert(State::Upload);
                }
                status.insert(State::Connected);
            }
            if raw::float(raw, "percentDone")? >= 1.0 {
                status.insert(State::Seed);
            }
        }
    }

    if ![State::Upload, State::Download, State::Verify].into_iter().any(|state| status.contains(state)) {
        status.insert(State::Idle);
    }
    Ok(status)
}
