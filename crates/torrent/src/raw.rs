//! Typed reads from a raw record.
//!
//! Every reader reports a missing field as [`ErrorKind::MissingField`] and a
//! field of the wrong shape as [`ErrorKind::InvalidField`]. Lookups check
//! declared dependencies before running a derivation, so a `MissingField`
//! coming out of a derivation means it read something it never declared.

use exn::{OptionExt, ResultExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::error::{ErrorKind, Result};

/// A (possibly partial) snapshot of one torrent, as decoded from the daemon.
pub type RawTorrent = serde_json::Map<String, Json>;

/// Raw field carrying the torrent's identity.
pub const ID: &str = "id";

pub(crate) fn invalid(field: &'static str, value: &Json) -> ErrorKind {
    ErrorKind::InvalidField { field, value: value.to_string() }
}

pub(crate) fn get<'a>(raw: &'a RawTorrent, field: &'static str) -> Result<&'a Json> {
    raw.get(field).ok_or_raise(|| ErrorKind::MissingField(field))
}

pub(crate) fn int(raw: &RawTorrent, field: &'static str) -> Result<i64> {
    let value = self::get(raw, field)?;
    value.as_i64().ok_or_raise(|| self::invalid(field, value))
}

pub(crate) fn uint(raw: &RawTorrent, field: &'static str) -> Result<u64> {
    let value = self::get(raw, field)?;
    value.as_u64().ok_or_raise(|| self::invalid(field, value))
}

pub(crate) fn float(raw: &RawTorrent, field: &'static str) -> Result<f64> {
    let value = self::get(raw, field)?;
    value.as_f64().ok_or_raise(|| self::invalid(field, value))
}

pub(crate) fn boolean(raw: &RawTorrent, field: &'static str) -> Result<bool> {
    let value = self::get(raw, field)?;
    value.as_bool().ok_or_raise(|| self::invalid(field, value))
}

pub(crate) fn text<'a>(raw: &'a RawTorrent, field: &'static str) -> Result<&'a str> {
    let value = self::get(raw, field)?;
    value.as_str().ok_or_raise(|| self::invalid(field, value))
}

/// Decodes a list of nested records.
pub(crate) fn list<T: DeserializeOwned>(raw: &RawTorrent, field: &'static str) -> Result<Vec<T>> {
    self::decode(field, self::get(raw, field)?)
}

pub(crate) fn decode<T: DeserializeOwned>(field: &'static str, value: &Json) -> Result<Vec<T>> {
    Vec::<T>::deserialize(value).or_raise(|| self::invalid(field, value))
}

/// Builds a raw record from a `json!` object literal.
#[cfg(test)]
pub(crate) fn record(value: Json) -> RawTorrent {
    match value {
        Json::Object(map) => map,
        other => panic!("not a JSON object: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_typed_reads() {
        let raw = record(json!({ "id": 7, "name": "debian.iso", "uploadRatio": 0.5, "isPrivate": true, "eta": -1 }));
        assert_eq!(uint(&raw, "id").unwrap(), 7);
        assert_eq!(text(&raw, "name").unwrap(), "debian.iso");
        assert_eq!(float(&raw, "uploadRatio").unwrap(), 0.5);
        assert!(boolean(&raw, "isPrivate").unwrap());
        assert_eq!(int(&raw, "eta").unwrap(), -1);
    }

    #[test]
    fn test_missing_and_invalid_fields() {
        let raw = record(json!({ "id": "seven", "eta": -1 }));
        let err = uint(&raw, "id").unwrap_err();
        assert_eq!(&*err, &ErrorKind::InvalidField { field: "id", value: r#""seven""#.to_string() });
        let err = uint(&raw, "eta").unwrap_err();
        assert_eq!(&*err, &ErrorKind::InvalidField { field: "eta", value: "-1".to_string() });
        let err = text(&raw, "name").unwrap_err();
        assert_eq!(&*err, &ErrorKind::MissingField("name"));
    }

    #[test]
    fn test_decode_nested_list() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Entry {
            id: u64,
        }
        let raw = record(json!({ "trackers": [{ "id": 1 }, { "id": 2 }], "peers": "none" }));
        assert_eq!(list::<Entry>(&raw, "trackers").unwrap(), vec![Entry { id: 1 }, Entry { id: 2 }]);
        assert!(matches!(&*list::<Entry>(&raw, "peers").unwrap_err(), ErrorKind::InvalidField { field: "peers", .. }));
    }
}
