use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Longest key, in code points, the segmenter will try to match
pub const MAX_ROOT_CHARS: usize = 10;

/// Exact-match lookup over word roots
pub trait Dictionary: Send + Sync {
    /// Gloss for an exact key, if present
    fn lookup_exact(&self, chinese: &str) -> Option<&str>;

    /// Length in code points of the longest key, 0 when empty
    fn longest_key_chars(&self) -> usize;

    /// Number of entries
    fn entry_count(&self) -> usize;
}

/// Immutable point-in-time copy of the dictionary.
///
/// Built from an owned map and never mutated afterwards, so an engine holding
/// one is unaffected by writes that land in the store later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Snapshot {
    roots: BTreeMap<String, String>,
    longest_key_chars: usize,
}

impl Snapshot {
    pub fn new(roots: BTreeMap<String, String>) -> Self {
        let longest_key_chars = roots.keys().map(|k| k.chars().count()).max().unwrap_or(0);
        Self {
            roots,
            longest_key_chars,
        }
    }

    pub fn get(&self, chinese: &str) -> Option<&str> {
        self.roots.get(chinese).map(String::as_str)
    }

    pub fn contains(&self, chinese: &str) -> bool {
        self.roots.contains_key(chinese)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Entries in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.roots.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.roots
    }
}

impl From<BTreeMap<String, String>> for Snapshot {
    fn from(roots: BTreeMap<String, String>) -> Self {
        Self::new(roots)
    }
}

impl From<Snapshot> for BTreeMap<String, String> {
    fn from(snapshot: Snapshot) -> Self {
        snapshot.roots
    }
}

impl<K, V> FromIterator<(K, V)> for Snapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Dictionary for Snapshot {
    fn lookup_exact(&self, chinese: &str) -> Option<&str> {
        self.get(chinese)
    }

    fn longest_key_chars(&self) -> usize {
        self.longest_key_chars
    }

    fn entry_count(&self) -> usize {
        self.roots.len()
    }
}
