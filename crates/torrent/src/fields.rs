//! Property table.
//!
//! Every public torrent property ([`Key`]) is derived from a declared set of
//! raw daemon fields. A [`Schema`] maps each key to those fields and to how
//! the value is produced: either a straight conversion of its single field,
//! or a function of the whole raw record. The declared fields are what the
//! record cache uses to decide when a cached value goes stale, and what a
//! caller should fetch from the daemon to make a key available.

use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

use exn::OptionExt;
use serde_json::Value as Json;
use swarm_types::{Bandwidth, Bytes, Limit, Percent, Ratio, SeedCount, Timedelta, Timestamp};
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};
use crate::raw::{self, RawTorrent};
use crate::{Value, files, peers, status, trackers};

macro_rules! keys {
    ($($(#[$meta:meta])* $variant:ident => $name:literal),+ $(,)?) => {
        /// Public torrent properties, in display order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Key {
            $($(#[$meta])* $variant),+
        }
        impl Key {
            pub const ALL: &'static [Key] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

keys! {
    Id => "id",
    Hash => "hash",
    Name => "name",
    Ratio => "ratio",
    Status => "status",
    /// Download directory.
    Path => "path",
    Private => "private",
    PercentDownloaded => "%downloaded",
    PercentMetadata => "%metadata",
    PercentVerified => "%verified",
    PeersConnected => "peers-connected",
    /// Peers uploading to us.
    PeersUploading => "peers-uploading",
    /// Peers downloading from us.
    PeersDownloading => "peers-downloading",
    /// Seeds in the swarm, as reported by trackers.
    PeersSeeding => "peers-seeding",
    TimestampCreated => "timestamp-created",
    TimestampAdded => "timestamp-added",
    TimestampStarted => "timestamp-started",
    TimestampActive => "timestamp-active",
    TimestampDone => "timestamp-done",
    TimespanEta => "timespan-eta",
    TimestampManualAnnounceAllowed => "timestamp-manual-announce-allowed",
    RateDown => "rate-down",
    RateUp => "rate-up",
    LimitRateDown => "limit-rate-down",
    LimitRateUp => "limit-rate-up",
    /// Bytes wanted, once everything selected is downloaded.
    SizeFinal => "size-final",
    SizeTotal => "size-total",
    SizeDownloaded => "size-downloaded",
    SizeUploaded => "size-uploaded",
    /// Bytes available from connected peers.
    SizeAvailable => "size-available",
    SizeCorrupt => "size-corrupt",
    Trackers => "trackers",
    Peers => "peers",
    Files => "files",
}

impl FromStr for Key {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match Self::ALL.iter().find(|key| key.as_str() == s) {
            Some(key) => Ok(*key),
            None => exn::bail!(ErrorKind::UnknownKey(s.to_string())),
        }
    }
}
impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// How a pass-through key converts its single raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    Integer,
    Text,
    Boolean,
    Count,
    Timestamp,
    Bandwidth,
    Bytes,
}
impl Conversion {
    pub fn convert(&self, field: &'static str, value: &Json) -> Result<Value> {
        let invalid = || raw::invalid(field, value);
        Ok(match self {
            Self::Integer => Value::Integer(value.as_u64().ok_or_raise(invalid)?),
            Self::Text => Value::Text(value.as_str().ok_or_raise(invalid)?.to_string()),
            Self::Boolean => Value::Boolean(value.as_bool().ok_or_raise(invalid)?),
            Self::Count => Value::Count(value.as_u64().ok_or_raise(invalid)?),
            Self::Timestamp => Value::Timestamp(Timestamp::from_raw(value.as_i64().ok_or_raise(invalid)?)),
            Self::Bandwidth => Value::Bandwidth(Bandwidth(value.as_u64().ok_or_raise(invalid)?)),
            Self::Bytes => Value::Bytes(Bytes(value.as_u64().ok_or_raise(invalid)?)),
        })
    }
}

/// Computes a value from the whole raw record.
///
/// It must only read the fields declared next to it in the [`Schema`].
pub type Strategy = fn(&RawTorrent) -> Result<Value>;

#[derive(Debug, Clone, Copy)]
pub enum Derive {
    /// Convert the single declared field.
    Convert(Conversion),
    Computed(Strategy),
}

#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub key: Key,
    /// Raw fields the value depends on.
    pub fields: &'static [&'static str],
    pub derive: Derive,
}
impl Entry {
    pub const fn pass_through(key: Key, fields: &'static [&'static str], conversion: Conversion) -> Self {
        Self { key, fields, derive: Derive::Convert(conversion) }
    }

    pub const fn computed(key: Key, fields: &'static [&'static str], strategy: Strategy) -> Self {
        Self { key, fields, derive: Derive::Computed(strategy) }
    }
}

/// The property table: which raw fields each key needs and how it's derived.
#[derive(Debug)]
pub struct Schema {
    entries: Vec<Entry>,
}

static STANDARD: LazyLock<Schema> =
    LazyLock::new(|| Schema::new(self::standard_entries()).expect("the standard property table is valid"));

impl Schema {
    /// Validates and wraps a table.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidSchema`] when a key appears twice, or a
    /// pass-through key doesn't declare exactly one field.
    pub fn new(entries: Vec<Entry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(entry.key) {
                exn::bail!(ErrorKind::InvalidSchema(format!("{} is declared twice", entry.key)));
            }
            if matches!(entry.derive, Derive::Convert(_)) && entry.fields.len() != 1 {
                exn::bail!(ErrorKind::InvalidSchema(format!(
                    "{} copies a single field but declares {}",
                    entry.key,
                    entry.fields.len()
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The table every torrent uses unless told otherwise.
    pub fn standard() -> &'static Schema {
        &STANDARD
    }

    pub fn entry(&self, key: Key) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.iter().map(|entry| entry.key)
    }

    pub fn dependencies(&self, key: Key) -> Option<&'static [&'static str]> {
        self.entry(key).map(|entry| entry.fields)
    }

    /// Raw fields needed by every key, plus `id` and `name`.
    pub fn all_fields(&self) -> RpcFields {
        let mut fields = RpcFields::new();
        for entry in &self.entries {
            fields.0.extend(entry.fields.iter().copied());
        }
        fields
    }

    /// Raw fields to request from the daemon so every one of `keys` is
    /// available.
    ///
    /// Each item is a key, a raw field name (passed through), or `all`
    /// (any case) for everything. `id` and `name` are always included.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::UnknownKey`] for anything else.
    #[instrument(level = "debug", skip_all)]
    pub fn fields<I, S>(&self, keys: I) -> Result<RpcFields>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = RpcFields::new();
        for key in keys {
            let key = key.as_ref();
            if key.eq_ignore_ascii_case("all") {
                return Ok(self.all_fields());
            }
            if let Ok(key) = key.parse::<Key>()
                && let Some(dependencies) = self.dependencies(key)
            {
                fields.0.extend(dependencies.iter().copied());
            } else if let Some(field) = RPC_FIELDS.iter().find(|field| **field == key) {
                fields.0.insert(*field);
            } else {
                exn::bail!(ErrorKind::UnknownKey(key.to_string()));
            }
        }
        Ok(fields)
    }
}

/// A set of raw field names to request from the daemon. Always contains `id`
/// and `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcFields(BTreeSet<&'static str>);
impl RpcFields {
    fn new() -> Self {
        Self(BTreeSet::from([raw::ID, NAME]))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().copied()
    }

    pub fn union(mut self, other: &RpcFields) -> Self {
        self.0.extend(other.iter());
        self
    }
}
impl<'a> IntoIterator for &'a RpcFields {
    type Item = &'static str;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, &'static str>>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
impl Display for RpcFields {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let fields: Vec<&str> = self.iter().collect();
        write!(f, "{}", fields.join(","))
    }
}

const NAME: &str = "name";

/// Every torrent field the daemon knows about.
pub const RPC_FIELDS: &[&str] = &[
    "activityDate",
    "addedDate",
    "announceResponse",
    "announceURL",
    "bandwidthPriority",
    "comment",
    "corruptEver",
    "creator",
    "dateCreated",
    "desiredAvailable",
    "doneDate",
    "downloadDir",
    "downloadedEver",
    "downloadLimit",
    "downloadLimited",
    "downloadLimitMode",
    "error",
    "errorString",
    "eta",
    "etaIdle",
    "hashString",
    "haveUnchecked",
    "haveValid",
    "honorsSessionLimits",
    "id",
    "isFinished",
    "isPrivate",
    "isStalled",
    "lastAnnounceTime",
    "lastScrapeTime",
    "leftUntilDone",
    "magnetLink",
    "manualAnnounceTime",
    "maxConnectedPeers",
    "metadataPercentComplete",
    "name",
    "nextAnnounceTime",
    "nextScrapeTime",
    "peer-limit",
    "peersConnected",
    "peersGettingFromUs",
    "peersSendingToUs",
    "percentDone",
    "pieceCount",
    "pieceSize",
    "queuePosition",
    "rateDownload",
    "rateUpload",
    "recheckProgress",
    "secondsDownloading",
    "secondsSeeding",
    "scrapeResponse",
    "scrapeURL",
    "seedIdleLimit",
    "seedIdleMode",
    "seedRatioLimit",
    "seedRatioMode",
    "sizeWhenDone",
    "startDate",
    "status",
    "totalSize",
    "torrentFile",
    "uploadedEver",
    "uploadLimit",
    "uploadLimitMode",
    "uploadLimited",
    "uploadRatio",
    "webseedsSendingToUs",
    "files",
    "fileStats",
    "peers",
    "peersFrom",
    "pieces",
    "priorities",
    "trackers",
    "trackerStats",
    "wanted",
    "webseeds",
];

fn standard_entries() -> Vec<Entry> {
    use Conversion as C;
    use Key as K;
    vec![
        Entry::pass_through(K::Id, &["id"], C::Integer),
        Entry::pass_through(K::Hash, &["hashString"], C::Text),
        Entry::pass_through(K::Name, &["name"], C::Text),
        Entry::computed(K::Ratio, &["uploadRatio"], self::ratio),
        Entry::computed(
            K::Status,
            &[
                "status",
                "percentDone",
                "metadataPercentComplete",
                "rateDownload",
                "rateUpload",
                "peersConnected",
                "trackerStats",
                "isPrivate",
            ],
            self::status,
        ),
        Entry::pass_through(K::Path, &["downloadDir"], C::Text),
        Entry::pass_through(K::Private, &["isPrivate"], C::Boolean),
        Entry::computed(K::PercentDownloaded, &["percentDone"], self::percent_downloaded),
        Entry::computed(K::PercentMetadata, &["metadataPercentComplete"], self::percent_metadata),
        Entry::computed(K::PercentVerified, &["recheckProgress"], self::percent_verified),
        Entry::pass_through(K::PeersConnected, &["peersConnected"], C::Count),
        Entry::pass_through(K::PeersUploading, &["peersSendingToUs"], C::Count),
        Entry::pass_through(K::PeersDownloading, &["peersGettingFromUs"], C::Count),
        Entry::computed(K::PeersSeeding, &["trackerStats"], self::peers_seeding),
        Entry::pass_through(K::TimestampCreated, &["dateCreated"], C::Timestamp),
        Entry::pass_through(K::TimestampAdded, &["addedDate"], C::Timestamp),
        Entry::pass_through(K::TimestampStarted, &["startDate"], C::Timestamp),
        Entry::pass_through(K::TimestampActive, &["activityDate"], C::Timestamp),
        Entry::pass_through(K::TimestampDone, &["doneDate"], C::Timestamp),
        Entry::computed(K::TimespanEta, &["eta"], self::eta),
        Entry::pass_through(K::TimestampManualAnnounceAllowed, &["manualAnnounceTime"], C::Timestamp),
        Entry::pass_through(K::RateDown, &["rateDownload"], C::Bandwidth),
        Entry::pass_through(K::RateUp, &["rateUpload"], C::Bandwidth),
        Entry::computed(K::LimitRateDown, &["downloadLimit", "downloadLimited"], self::limit_rate_down),
        Entry::computed(K::LimitRateUp, &["uploadLimit", "uploadLimited"], self::limit_rate_up),
        Entry::pass_through(K::SizeFinal, &["sizeWhenDone"], C::Bytes),
        Entry::pass_through(K::SizeTotal, &["totalSize"], C::Bytes),
        Entry::pass_through(K::SizeDownloaded, &["downloadedEver"], C::Bytes),
        Entry::pass_through(K::SizeUploaded, &["uploadedEver"], C::Bytes),
        Entry::pass_through(K::SizeAvailable, &["desiredAvailable"], C::Bytes),
        Entry::pass_through(K::SizeCorrupt, &["corruptEver"], C::Bytes),
        Entry::computed(K::Trackers, &["trackers"], self::trackers),
        Entry::computed(K::Peers, &["peers", "id", "name", "totalSize"], self::peers),
        Entry::computed(K::Files, &["fileStats", "files", "name", "id"], self::files),
    ]
}

fn ratio(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Ratio(Ratio::from_raw(raw::float(raw, "uploadRatio")?)))
}

fn status(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Status(status::derive_status(raw)?))
}

fn percent_downloaded(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Percent(Percent::from_fraction(raw::float(raw, "percentDone")?)))
}

fn percent_metadata(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Percent(Percent::from_fraction(raw::float(raw, "metadataPercentComplete")?)))
}

fn percent_verified(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Percent(Percent::from_fraction(raw::float(raw, "recheckProgress")?)))
}

fn peers_seeding(raw: &RawTorrent) -> Result<Value> {
    let stats = trackers::tracker_stats(raw)?;
    Ok(Value::SeedCount(SeedCount::from_tracker_counts(stats.iter().map(|tracker| tracker.seeder_count))))
}

fn eta(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Timedelta(Timedelta::from_raw(raw::int(raw, "eta")?)))
}

fn limit_rate_down(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Limit(Limit::from_raw(raw::uint(raw, "downloadLimit")?, raw::boolean(raw, "downloadLimited")?)))
}

fn limit_rate_up(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Limit(Limit::from_raw(raw::uint(raw, "uploadLimit")?, raw::boolean(raw, "uploadLimited")?)))
}

fn trackers(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Trackers(trackers::trackers(raw)?))
}

fn peers(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Peers(peers::peers(raw)?))
}

fn files(raw: &RawTorrent) -> Result<Value> {
    Ok(Value::Files(files::tree(raw)?))
}
