//! # Swarm Torrent
//!
//! Named, typed properties over raw torrent records from a BitTorrent daemon.
//!
//! A [`Torrent`] owns one raw record (field name to JSON value, as decoded
//! from the daemon) and derives public properties ([`Key`]) from it on
//! demand. Each key declares the raw fields it depends on in the property
//! table ([`Schema`]); derived values are cached until an update changes one
//! of those fields.
//!
//! ```rust
//! use serde_json::json;
//! use swarm_torrent::{Key, RawTorrent, Schema, Torrent};
//!
//! let fields = Schema::standard().fields(["name", "ratio"]).unwrap();
//! assert!(fields.contains("uploadRatio"));
//!
//! let serde_json::Value::Object(raw) = json!({ "id": 1, "name": "debian.iso", "uploadRatio": 2.5 }) else {
//!     unreachable!()
//! };
//! let mut torrent = Torrent::new(raw).unwrap();
//! assert_eq!(torrent.get(Key::Ratio).unwrap().to_string(), "2.5");
//!
//! let serde_json::Value::Object(update) = json!({ "id": 1, "uploadRatio": 3.0 }) else { unreachable!() };
//! torrent.update(update).unwrap();
//! assert!(!torrent.is_cached(Key::Ratio));
//! ```
#![recursion_limit = "256"]

pub mod error;
mod fields;
mod files;
mod peers;
mod raw;
mod status;
mod torrent;
mod trackers;
mod value;

pub use swarm_types as types;

pub use crate::fields::{Conversion, Derive, Entry, Key, RPC_FIELDS, RpcFields, Schema, Strategy};
pub use crate::files::{FileDelta, FileEntry, FileTree, Files, Node, SEPARATOR, TorrentFile};
pub use crate::peers::Peer;
pub use crate::raw::{ID, RawTorrent};
pub use crate::status::{derive_status, is_isolated};
pub use crate::torrent::Torrent;
pub use crate::trackers::Tracker;
pub use crate::value::Value;
