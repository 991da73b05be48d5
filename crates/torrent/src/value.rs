use std::fmt::{Display, Formatter, Result as FmtResult};

use swarm_types::{Bandwidth, Bytes, Limit, Percent, Ratio, SeedCount, Status, Timedelta, Timestamp};

use crate::{FileTree, Peer, Tracker};

/// A derived torrent property.
///
/// Which variant a key produces is fixed by its entry in the property table;
/// the `as_*` accessors return `None` for any other variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(u64),
    Text(String),
    Boolean(bool),
    Count(u64),
    Ratio(Ratio),
    Percent(Percent),
    Status(Status),
    SeedCount(SeedCount),
    Timestamp(Timestamp),
    Timedelta(Timedelta),
    Bandwidth(Bandwidth),
    Limit(Limit),
    Bytes(Bytes),
    Trackers(Vec<Tracker>),
    Peers(Vec<Peer>),
    Files(FileTree),
}

macro_rules! accessor {
    ($($name:ident => $variant:ident: $ty:ty),+ $(,)?) => {$(
        pub fn $name(&self) -> Option<&$ty> {
            match self {
                Self::$variant(value) => Some(value),
                _ => None,
            }
        }
    )+};
}

impl Value {
    accessor! {
        as_integer => Integer: u64,
        as_text => Text: String,
        as_bool => Boolean: bool,
        as_count => Count: u64,
        as_ratio => Ratio: Ratio,
        as_percent => Percent: Percent,
        as_status => Status: Status,
        as_seed_count => SeedCount: SeedCount,
        as_timestamp => Timestamp: Timestamp,
        as_timedelta => Timedelta: Timedelta,
        as_bandwidth => Bandwidth: Bandwidth,
        as_limit => Limit: Limit,
        as_bytes => Bytes: Bytes,
        as_trackers => Trackers: Vec<Tracker>,
        as_peers => Peers: Vec<Peer>,
        as_files => Files: FileTree,
    }

    pub(crate) fn as_files_mut(&mut self) -> Option<&mut FileTree> {
        match self {
            Self::Files(tree) => Some(tree),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Integer(value) | Self::Count(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{}", if *value { "yes" } else { "no" }),
            Self::Ratio(value) => write!(f, "{value}"),
            Self::Percent(value) => write!(f, "{value}"),
            Self::Status(value) => write!(f, "{value}"),
            Self::SeedCount(value) => write!(f, "{value}"),
            Self::Timestamp(value) => write!(f, "{value}"),
            Self::Timedelta(value) => write!(f, "{value}"),
            Self::Bandwidth(value) => write!(f, "{value}"),
            Self::Limit(value) => write!(f, "{value}"),
            Self::Bytes(value) => write!(f, "{value}"),
            Self::Trackers(trackers) => write!(f, "{} trackers", trackers.len()),
            Self::Peers(peers) => write!(f, "{} peers", peers.len()),
            Self::Files(tree) => write!(f, "{} files", tree.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_match_variant() {
        let value = Value::Ratio(Ratio::Value(1.5));
        assert_eq!(value.as_ratio(), Some(&Ratio::Value(1.5)));
        assert_eq!(value.as_integer(), None);
        assert_eq!(Value::Boolean(true).as_bool(), Some(&true));
        assert!(Value::Text("x".to_string()).as_files().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Boolean(false).to_string(), "no");
        assert_eq!(Value::Count(3).to_string(), "3");
        assert_eq!(Value::Ratio(Ratio::NotApplicable).to_string(), "n/a");
        assert_eq!(Value::Trackers(Vec::new()).to_string(), "0 trackers");
    }
}
