//! RID compatibility fallback graph
//!
//! A manifest's top-level `runtimes` section maps each RID to an ordered list
//! of compatible fallback RIDs, closest first. The graph is built at most
//! once and shared read-only across loads; resolution only ever tests
//! membership of a single RID's declared list, so an unterminated chain
//! yields "no match" rather than a loop.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Maps a RID to its ordered fallback RIDs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RidFallbackGraph {
    rids: HashMap<String, Vec<String>>,
}

impl RidFallbackGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from a parsed manifest document
    ///
    /// An absent or non-object `runtimes` section yields an empty graph.
    /// Every key becomes an entry; a key whose value is not an array keeps an
    /// empty fallback list, and non-string list elements are skipped.
    pub fn from_document(doc: &Value) -> Self {
        let mut graph = Self::new();

        let runtimes = match doc.get("runtimes").and_then(Value::as_object) {
            Some(runtimes) => runtimes,
            None => return graph,
        };

        for (rid, fallbacks) in runtimes {
            let list = graph.rids.entry(rid.clone()).or_default();
            if let Some(array) = fallbacks.as_array() {
                list.reserve(array.len());
                for fallback in array {
                    if let Some(rid) = fallback.as_str() {
                        list.push(rid.to_string());
                    }
                }
            }
        }

        debug!("RID fallback graph = {:?}", graph.rids);
        graph
    }

    /// Read only the fallback graph from a deps manifest on disk
    ///
    /// Reusable before a full load. A missing or unparsable manifest yields
    /// an empty graph.
    pub fn from_file(path: &Path) -> Self {
        debug!("reading RID fallback graph from [{}]", path.display());

        if !path.exists() {
            debug!("deps manifest does not exist at [{}]", path.display());
            return Self::new();
        }

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!("failed to read deps manifest [{}]: {}", path.display(), err);
                return Self::new();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(doc) => Self::from_document(&doc),
            Err(err) => {
                warn!("failed to parse deps manifest [{}]: {}", path.display(), err);
                Self::new()
            }
        }
    }

    /// Ordered fallback RIDs for `rid`, if the graph declares it
    pub fn fallbacks(&self, rid: &str) -> Option<&[String]> {
        self.rids.get(rid).map(Vec::as_slice)
    }

    /// Whether the graph declares `rid`
    pub fn contains(&self, rid: &str) -> bool {
        self.rids.contains_key(rid)
    }

    /// Number of declared RIDs
    pub fn len(&self) -> usize {
        self.rids.len()
    }

    /// Whether the graph declares no RIDs
    pub fn is_empty(&self) -> bool {
        self.rids.is_empty()
    }

    /// Iterate over declared RIDs and their fallback lists
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.rids
            .iter()
            .map(|(rid, fallbacks)| (rid.as_str(), fallbacks.as_slice()))
    }
}
