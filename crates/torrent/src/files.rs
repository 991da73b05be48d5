//! File tree.
//!
//! A torrent's files form a tree keyed by `/`-separated path segments. The
//! tree is built once from the raw `files`/`fileStats` lists and afterwards
//! only updated in place from per-file deltas, so each [`TorrentFile`] keeps
//! its identity (and anything a consumer attached to the tree) across
//! updates. A file's index is its position in the raw lists and never
//! changes.

use std::collections::{BTreeMap, HashMap, btree_map};
use std::iter;

use exn::ResultExt;
use serde::Deserialize;
use serde_json::Value as Json;
use swarm_types::{Bytes, Percent, Priority};
use tracing::instrument;

use crate::error::{ErrorKind, Result};
use crate::raw::{self, RawTorrent};

pub const SEPARATOR: char = '/';
pub(crate) const FILES: &str = "files";
pub(crate) const FILE_STATS: &str = "fileStats";

/// One file of a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentFile {
    pub torrent_id: u64,
    /// Position in the torrent's file list.
    pub index: usize,
    pub name: String,
    /// Segments of the directory containing the file.
    pub path: Vec<String>,
    pub size_total: Bytes,
    pub size_downloaded: Bytes,
    pub is_wanted: bool,
    priority: Priority,
}
impl TorrentFile {
    /// Effective priority: files that aren't wanted are [`Priority::Off`].
    pub fn priority(&self) -> Priority {
        self.priority.with_wanted(self.is_wanted)
    }

    pub fn progress(&self) -> Percent {
        if self.size_total.get() == 0 {
            return Percent::COMPLETE;
        }
        Percent::from_fraction(self.size_downloaded.get() as f64 / self.size_total.get() as f64)
    }

    pub fn full_path(&self) -> String {
        self.path.iter().map(String::as_str).chain(iter::once(self.name.as_str())).collect::<Vec<_>>().join("/")
    }

    fn apply(&mut self, delta: &FileDelta) {
        self.size_downloaded = Bytes(delta.downloaded);
        self.is_wanted = delta.wanted;
        self.priority = delta.priority;
    }
}

/// A flat entry to build a tree from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path, `/`-separated.
    pub path: String,
    pub index: usize,
    pub size: u64,
    pub downloaded: u64,
    pub wanted: bool,
    pub priority: Priority,
}

/// Fresh progress for one file, addressed by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileDelta {
    pub index: usize,
    pub downloaded: u64,
    pub wanted: bool,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(TorrentFile),
    Directory(FileTree),
}
impl Node {
    pub fn as_file(&self) -> Option<&TorrentFile> {
        match self {
            Self::File(file) => Some(file),
            Self::Directory(_) => None,
        }
    }

    pub fn as_directory(&self) -> Option<&FileTree> {
        match self {
            Self::Directory(tree) => Some(tree),
            Self::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    path: Vec<String>,
    items: BTreeMap<String, Node>,
    placeholder: bool,
}
impl FileTree {
    /// Builds a tree from flat entries.
    ///
    /// Without any entries (a torrent whose metadata hasn't arrived yet) the
    /// tree holds a single placeholder file named after the torrent, with
    /// index 0 and no data.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedPath`] for empty path segments, or for two
    /// entries claiming the same path.
    #[instrument(skip(torrent_name, entries), fields(entries = entries.len()))]
    pub fn build(torrent_id: u64, torrent_name: &str, entries: Vec<FileEntry>) -> Result<Self> {
        if entries.is_empty() {
            let placeholder = TorrentFile {
                torrent_id,
                index: 0,
                name: torrent_name.to_string(),
                path: Vec::new(),
                size_total: Bytes(0),
                size_downloaded: Bytes(0),
                is_wanted: true,
                priority: Priority::Normal,
            };
            let items = BTreeMap::from([(torrent_name.to_string(), Node::File(placeholder))]);
            return Ok(Self { path: Vec::new(), items, placeholder: true });
        }
        Self::build_at(torrent_id, Vec::new(), entries)
    }

    fn build_at(torrent_id: u64, path: Vec<String>, entries: Vec<FileEntry>) -> Result<Self> {
        let mut items = BTreeMap::new();
        let mut folders: BTreeMap<String, Vec<FileEntry>> = BTreeMap::new();
        for mut entry in entries {
            match entry.path.split_once(SEPARATOR) {
                Some((folder, rest)) => {
                    if folder.is_empty() || rest.is_empty() {
                        exn::bail!(ErrorKind::MalformedPath(self::full_path(&path, &entry.path)));
                    }
                    let folder = folder.to_string();
                    entry.path = rest.to_string();
                    folders.entry(folder).or_default().push(entry);
                },
                None => {
                    if entry.path.is_empty() || items.contains_key(&entry.path) {
                        exn::bail!(ErrorKind::MalformedPath(self::full_path(&path, &entry.path)));
                    }
                    let file = TorrentFile {
                        torrent_id,
                        index: entry.index,
                        name: entry.path.clone(),
                        path: path.clone(),
                        size_total: Bytes(entry.size),
                        size_downloaded: Bytes(entry.downloaded),
                        is_wanted: entry.wanted,
                        priority: entry.priority,
                    };
                    items.insert(entry.path, Node::File(file));
                },
            }
        }
        for (folder, entries) in folders {
            if items.contains_key(&folder) {
                exn::bail!(ErrorKind::MalformedPath(self::full_path(&path, &folder)));
            }
            let mut subpath = path.clone();
            subpath.push(folder.clone());
            items.insert(folder, Node::Directory(Self::build_at(torrent_id, subpath, entries)?));
        }
        Ok(Self { path, items, placeholder: false })
    }

    /// Updates files in place from deltas, matched by index.
    ///
    /// Structure is never touched. A file with no matching delta keeps its
    /// state; that only happens when the daemon sends a shorter list than
    /// the tree was built from, so it is logged.
    pub fn apply_deltas(&mut self, deltas: &[FileDelta]) {
        if deltas.is_empty() {
            return;
        }
        let deltas: HashMap<usize, &FileDelta> = deltas.iter().map(|delta| (delta.index, delta)).collect();
        self.apply_indexed(&deltas);
    }

    fn apply_indexed(&mut self, deltas: &HashMap<usize, &FileDelta>) {
        for node in self.items.values_mut() {
            match node {
                Node::File(file) => match deltas.get(&file.index) {
                    Some(delta) => file.apply(delta),
                    None => tracing::warn!(torrent = file.torrent_id, index = file.index, "No update for file; keeping previous state"),
                },
                Node::Directory(tree) => tree.apply_indexed(deltas),
            }
        }
    }

    /// Whether this tree was built without any files.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Segments leading to this (sub)tree.
    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.items.get(segment)
    }

    /// Direct children, sorted by name.
    pub fn nodes(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.items.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// All files below this tree, depth first.
    pub fn files(&self) -> Files<'_> {
        Files { stack: vec![self.items.values()] }
    }

    pub fn find(&self, index: usize) -> Option<&TorrentFile> {
        self.files().find(|file| file.index == index)
    }

    /// Number of files below this tree.
    pub fn len(&self) -> usize {
        self.files().count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn size_total(&self) -> Bytes {
        Bytes(self.files().map(|file| file.size_total.get()).sum())
    }

    pub fn size_downloaded(&self) -> Bytes {
        Bytes(self.files().map(|file| file.size_downloaded.get()).sum())
    }

    pub fn progress(&self) -> Percent {
        let total = self.size_total().get();
        if total == 0 {
            return Percent::COMPLETE;
        }
        Percent::from_fraction(self.size_downloaded().get() as f64 / total as f64)
    }
}

/// Depth-first iterator over the files of a [`FileTree`].
pub struct Files<'a> {
    stack: Vec<btree_map::Values<'a, String, Node>>,
}
impl<'a> Iterator for Files<'a> {
    type Item = &'a TorrentFile;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(nodes) = self.stack.last_mut() {
            match nodes.next() {
                Some(Node::File(file)) => return Some(file),
                Some(Node::Directory(tree)) => self.stack.push(tree.items.values()),
                None => {
                    self.stack.pop();
                },
            }
        }
        None
    }
}

fn full_path(parent: &[String], rest: &str) -> String {
    parent.iter().map(String::as_str).chain(iter::once(rest)).collect::<Vec<_>>().join("/")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFileStat {
    bytes_completed: u64,
    wanted: bool,
    priority: i64,
}

#[derive(Debug, Deserialize)]
struct RawFile {
    name: String,
    length: u64,
}

/// Decodes a raw `fileStats` list into deltas; the index is the position.
pub(crate) fn deltas(stats: &Json) -> Result<Vec<FileDelta>> {
    raw::decode::<RawFileStat>(FILE_STATS, stats)?
        .into_iter()
        .enumerate()
        .map(|(index, stat)| {
            let priority = Priority::from_raw(stat.priority).or_raise(|| raw::invalid(FILE_STATS, stats))?;
            Ok(FileDelta { index, downloaded: stat.bytes_completed, wanted: stat.wanted, priority })
        })
        .collect()
}

/// Builds the tree from `id`, `name`, `files` and `fileStats`.
pub(crate) fn tree(raw: &RawTorrent) -> Result<FileTree> {
    let torrent_id = raw::uint(raw, raw::ID)?;
    let torrent_name = raw::text(raw, "name")?;
    let files = raw::list::<RawFile>(raw, FILES)?;
    let stats = raw::get(raw, FILE_STATS)?;
    let deltas = self::deltas(stats)?;
    if files.len() != deltas.len() {
        exn::bail!(raw::invalid(FILE_STATS, stats));
    }
    let entries = files
        .into_iter()
        .zip(deltas)
        .map(|(file, delta)| FileEntry {
            path: file.name,
            index: delta.index,
            size: file.length,
            downloaded: delta.downloaded,
            wanted: delta.wanted,
            priority: delta.priority,
        })
        .collect();
    FileTree::build(torrent_id, torrent_name, entries)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::raw::record;

    fn entry(path: &str, index: usize, size: u64) -> FileEntry {
        FileEntry { path: path.to_string(), index, size, downloaded: 0, wanted: true, priority: Priority::Normal }
    }

    fn delta(index: usize, downloaded: u64) -> FileDelta {
        FileDelta { index, downloaded, wanted: true, priority: Priority::Normal }
    }

    fn album() -> FileTree {
        FileTree::build(
            9,
            "album",
            vec![
                entry("album/cover.jpg", 0, 100),
                entry("album/disc 1/01.flac", 1, 1000),
                entry("album/disc 1/02.flac", 2, 2000),
                entry("album/disc 2/01.flac", 3, 3000),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_build_nested() {
        let tree = album();
        assert!(!tree.is_placeholder());
        assert_eq!(tree.len(), 4);
        let album = tree.get("album").and_then(Node::as_directory).unwrap();
        let disc = album.get("disc 1").and_then(Node::as_directory).unwrap();
        assert_eq!(disc.path(), &["album".to_string(), "disc 1".to_string()]);
        let track = disc.get("02.flac").and_then(Node::as_file).unwrap();
        assert_eq!(track.index, 2);
        assert_eq!(track.full_path(), "album/disc 1/02.flac");
        assert_eq!(track.torrent_id, 9);
        assert_eq!(tree.size_total(), Bytes(6100));
    }

    #[test]
    fn test_build_empty_is_placeholder() {
        let tree = FileTree::build(4, "magnet-only", Vec::new()).unwrap();
        assert!(tree.is_placeholder());
        assert_eq!(tree.len(), 1);
        let file = tree.get("magnet-only").and_then(Node::as_file).unwrap();
        assert_eq!(file.index, 0);
        assert_eq!(file.size_total, Bytes(0));
        assert!(file.is_wanted);
        assert_eq!(file.priority(), Priority::Normal);
    }

    #[test]
    fn test_build_rejects_malformed_paths() {
        for path in ["a//b", "/a", "a/", ""] {
            let err = FileTree::build(1, "x", vec![entry(path, 0, 1)]).unwrap_err();
            assert!(matches!(&*err, ErrorKind::MalformedPath(_)), "{path:?} accepted");
        }
        let err = FileTree::build(1, "x", vec![entry("a", 0, 1), entry("a/b", 1, 1)]).unwrap_err();
        assert_eq!(&*err, &ErrorKind::MalformedPath("a".to_string()));
    }

    #[test]
    fn test_apply_deltas_keeps_structure() {
        let mut tree = album();
        let before: Vec<usize> = tree.files().map(|file| file.index).collect();
        tree.apply_deltas(&[delta(0, 100), delta(1, 10), delta(2, 20), delta(3, 30)]);
        let after: Vec<usize> = tree.files().map(|file| file.index).collect();
        assert_eq!(before, after);
        assert_eq!(tree.find(2).unwrap().size_downloaded, Bytes(20));
        assert_eq!(tree.size_downloaded(), Bytes(160));
    }

    #[test]
    fn test_apply_deltas_missing_index_keeps_state() {
        let mut tree = album();
        tree.apply_deltas(&[delta(0, 50)]);
        tree.apply_deltas(&[delta(1, 70)]);
        assert_eq!(tree.find(0).unwrap().size_downloaded, Bytes(50));
        assert_eq!(tree.find(1).unwrap().size_downloaded, Bytes(70));
        assert_eq!(tree.find(3).unwrap().size_downloaded, Bytes(0));
    }

    #[test]
    fn test_apply_empty_deltas_is_noop() {
        let mut tree = album();
        let before = tree.clone();
        tree.apply_deltas(&[]);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_unchanged_deltas_leave_tree_as_built() {
        let entries = vec![
            FileEntry { downloaded: 40, priority: Priority::High, ..entry("show/s01e01.mkv", 0, 100) },
            FileEntry { wanted: false, priority: Priority::Low, ..entry("show/s01e02.mkv", 1, 100) },
            FileEntry { downloaded: 5, ..entry("show/extras/notes.txt", 2, 5) },
        ];
        let deltas: Vec<FileDelta> = entries
            .iter()
            .map(|entry| FileDelta {
                index: entry.index,
                downloaded: entry.downloaded,
                wanted: entry.wanted,
                priority: entry.priority,
            })
            .collect();
        let mut tree = FileTree::build(3, "show", entries).unwrap();
        let before = tree.clone();
        tree.apply_deltas(&deltas);
        assert_eq!(tree, before);
        tree.apply_deltas(&deltas);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_unchanged_deltas_leave_placeholder_as_built() {
        let mut tree = FileTree::build(4, "magnet-only", Vec::new()).unwrap();
        let before = tree.clone();
        tree.apply_deltas(&[delta(0, 0)]);
        assert_eq!(tree, before);
        assert!(tree.is_placeholder());
    }

    #[test]
    fn test_unwanted_file_priority_is_off() {
        let mut tree = album();
        tree.apply_deltas(&[FileDelta { index: 3, downloaded: 0, wanted: false, priority: Priority::High }]);
        let file = tree.find(3).unwrap();
        assert!(!file.is_wanted);
        assert_eq!(file.priority(), Priority::Off);
    }

    #[test]
    fn test_tree_from_raw() {
        let raw = record(json!({
            "id": 2,
            "name": "docs",
            "files": [
                { "name": "docs/readme.txt", "length": 10, "bytesCompleted": 10 },
                { "name": "docs/manual.pdf", "length": 90, "bytesCompleted": 0 },
            ],
            "fileStats": [
                { "bytesCompleted": 10, "wanted": true, "priority": 1 },
                { "bytesCompleted": 0, "wanted": false, "priority": 0 },
            ],
        }));
        let tree = tree(&raw).unwrap();
        assert_eq!(tree.len(), 2);
        let readme = tree.find(0).unwrap();
        assert_eq!(readme.name, "readme.txt");
        assert_eq!(readme.priority(), Priority::High);
        assert!(readme.progress().is_complete());
        assert_eq!(tree.find(1).unwrap().priority(), Priority::Off);
    }

    #[test]
    fn test_tree_from_raw_length_mismatch() {
        let raw = record(json!({
            "id": 2,
            "name": "docs",
            "files": [{ "name": "a", "length": 1 }],
            "fileStats": [],
        }));
        assert!(matches!(&*tree(&raw).unwrap_err(), ErrorKind::InvalidField { field: FILE_STATS, .. }));
    }

    #[test]
    fn test_invalid_priority() {
        let stats = json!([{ "bytesCompleted": 0, "wanted": true, "priority": 7 }]);
        assert!(deltas(&stats).is_err());
    }
}
