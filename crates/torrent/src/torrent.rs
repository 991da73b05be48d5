//! The torrent record cache.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::collections::hash_map::Entry as CacheEntry;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use exn::OptionExt;
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::fields::{Derive, Key, Schema};
use crate::files::{self, FILE_STATS, FILES};
use crate::raw::{self, RawTorrent};
use crate::value::Value;

/// One torrent: its raw daemon record plus lazily derived properties.
///
/// Properties are computed on first [`get`](Self::get) and cached until an
/// [`update`](Self::update) changes one of the raw fields they depend on.
/// The file tree is special: file progress updates are applied to the cached
/// tree in place instead of evicting it.
///
/// Torrents are identified by ID alone. They compare equal when their IDs do,
/// and sort by descending ID (most recently added first).
pub struct Torrent {
    id: u64,
    raw: RawTorrent,
    cache: HashMap<Key, Value>,
    schema: &'static Schema,
}

impl Torrent {
    /// Wraps a raw record using the standard property table.
    ///
    /// # Errors
    ///
    /// The record must carry an integer `id`.
    pub fn new(raw: RawTorrent) -> Result<Self> {
        Self::with_schema(raw, Schema::standard())
    }

    #[instrument(skip_all, fields(id))]
    pub fn with_schema(raw: RawTorrent, schema: &'static Schema) -> Result<Self> {
        let id = raw::uint(&raw, raw::ID)?;
        tracing::Span::current().record("id", id);
        Ok(Self { id, raw, cache: HashMap::new(), schema })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn raw(&self) -> &RawTorrent {
        &self.raw
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Whether `key` can be looked up: every raw field it depends on is
    /// present. Doesn't compute anything.
    pub fn contains(&self, key: Key) -> bool {
        self.schema
            .dependencies(key)
            .is_some_and(|fields| fields.iter().all(|field| self.raw.contains_key(*field)))
    }

    /// Keys that can currently be looked up, in table order.
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.schema.keys().filter(|key| self.contains(*key))
    }

    /// Looks up a property, computing and caching it on first access.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::UnknownKey`] if the table has no such key.
    /// - [`ErrorKind::NotAvailable`] if a raw field it depends on hasn't been
    ///   fetched; nothing is cached.
    /// - Whatever the derivation fails with for malformed raw fields.
    pub fn get(&mut self, key: Key) -> Result<&Value> {
        match self.cache.entry(key) {
            CacheEntry::Occupied(entry) => Ok(entry.into_mut()),
            CacheEntry::Vacant(entry) => {
                let value = Self::derive(self.schema, &self.raw, key)?;
                tracing::trace!(id = self.id, key = %key, "Cached derived value");
                Ok(entry.insert(value))
            },
        }
    }

    /// Like [`get`](Self::get), for a key given by name.
    pub fn get_str(&mut self, key: &str) -> Result<&Value> {
        let key: Key = key.parse()?;
        self.get(key)
    }

    fn derive(schema: &Schema, raw: &RawTorrent, key: Key) -> Result<Value> {
        let entry = schema.entry(key).ok_or_raise(|| ErrorKind::UnknownKey(key.to_string()))?;
        if let Some(field) = entry.fields.iter().find(|field| !raw.contains_key(**field)) {
            exn::bail!(ErrorKind::NotAvailable { key, field: *field });
        }
        match entry.derive {
            Derive::Convert(conversion) => {
                let &[field] = entry.fields else {
                    exn::bail!(ErrorKind::InvalidSchema(format!("{key} copies a single field")));
                };
                conversion.convert(field, raw::get(raw, field)?)
            },
            Derive::Computed(strategy) => strategy(raw),
        }
    }

    pub fn is_cached(&self, key: Key) -> bool {
        self.cache.contains_key(&key)
    }

    /// Number of cached values.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drops every cached value. The raw record is untouched.
    pub fn clear_cache(&mut self) {
        tracing::debug!(id = self.id, evicted = self.cache.len(), "Clearing derived value cache");
        self.cache.clear();
    }

    /// Merges a (partial) raw record into this torrent.
    ///
    /// Cached values are evicted when a raw field they depend on is present
    /// both before and after the update with different values. Fresh file
    /// progress is applied to a cached file tree in place, unless the tree
    /// needs rebuilding: it was a placeholder and real files have arrived,
    /// or the update carries a different file list. All fields of the
    /// update end up in the raw record.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::IdMismatch`] if the update is for another torrent, or
    /// [`ErrorKind::InvalidField`] for undecodable file progress. Either way
    /// the torrent is left as it was.
    #[instrument(skip_all, fields(id = self.id, fields = update.len()))]
    pub fn update(&mut self, update: RawTorrent) -> Result<()> {
        if update.contains_key(raw::ID) {
            let found = raw::uint(&update, raw::ID)?;
            if found != self.id {
                exn::bail!(ErrorKind::IdMismatch { expected: self.id, found });
            }
        }

        let applied = self.apply_file_stats(&update)?;

        let (schema, old) = (self.schema, &self.raw);
        let before = self.cache.len();
        self.cache.retain(|key, _| {
            let Some(fields) = schema.dependencies(*key) else {
                return false;
            };
            let changed = fields
                .iter()
                .filter(|field| !applied.contains(*field))
                .find(|field| matches!((old.get(**field), update.get(**field)), (Some(a), Some(b)) if a != b));
            match changed {
                Some(field) => {
                    tracing::trace!(key = %key, field, "Evicting derived value");
                    false
                },
                None => true,
            }
        });
        tracing::debug!(evicted = before - self.cache.len(), "Merged update");

        self.raw.extend(update);
        Ok(())
    }

    /// Applies `fileStats` from an update to the cached file tree, if that's
    /// enough to bring it up to date. Returns the raw fields whose changes
    /// the tree has absorbed.
    fn apply_file_stats(&mut self, update: &RawTorrent) -> Result<&'static [&'static str]> {
        let Some(stats) = update.get(FILE_STATS) else {
            return Ok(&[]);
        };
        let Some(tree) = self.cache.get_mut(&Key::Files).and_then(Value::as_files_mut) else {
            return Ok(&[]);
        };
        if let Some(list) = update.get(FILES)
            && self.raw.get(FILES) != Some(list)
        {
            tracing::debug!("File list changed; rebuilding file tree");
            return Ok(&[]);
        }
        let deltas = files::deltas(stats)?;
        if tree.is_placeholder() && !deltas.is_empty() {
            tracing::debug!(files = deltas.len(), "Files arrived for placeholder tree; rebuilding file tree");
            return Ok(&[]);
        }
        tree.apply_deltas(&deltas);
        Ok(&[FILE_STATS, FILES])
    }
}

impl Debug for Torrent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Torrent")
            .field("id", &self.id)
            .field("fields", &self.raw.len())
            .field("cached", &self.cache.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PartialEq for Torrent {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Torrent {}
impl PartialEq<u64> for Torrent {
    fn eq(&self, other: &u64) -> bool {
        self.id == *other
    }
}
impl PartialEq<Torrent> for u64 {
    fn eq(&self, other: &Torrent) -> bool {
        *self == other.id
    }
}
impl Hash for Torrent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
impl Ord for Torrent {
    fn cmp(&self, other: &Self) -> Ordering {
        other.id.cmp(&self.id)
    }
}
impl PartialOrd for Torrent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
