//! Run configuration, threaded explicitly into the site pipeline.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Result, SiteError};

pub const DEFAULT_INPUT: &str = "dump.lsif";
pub const DEFAULT_OUTPUT: &str = "out";

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Folder copied verbatim as `_dist` instead of the embedded assets.
    pub dist: Option<PathBuf>,
    pub uri_map: UriMap,
    /// Log per-stage timings.
    pub bench: bool,
    /// Validate generated pages after writing.
    pub check: bool,
    /// Worker pool size for rendering and writing.
    pub jobs: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            dist: None,
            uri_map: UriMap::default(),
            bench: false,
            check: false,
            jobs: default_jobs(),
        }
    }
}

pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// User-supplied table from document-URI prefixes to output-relative prefixes.
///
/// Loaded from a JSON object such as
/// `{ "file:///usr/lib/go/src/": "_external/go/" }`. The longest matching
/// prefix wins.
#[derive(Debug, Clone, Default)]
pub struct UriMap {
    entries: Vec<(String, String)>,
}

impl UriMap {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut entries: Vec<_> = entries.into_iter().collect();
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let table: IndexMap<String, String> = serde_json::from_str(text)?;
        Ok(Self::new(table))
    }

    pub fn lookup(&self, uri: &str) -> Option<String> {
        self.entries.iter().find_map(|(prefix, target)| {
            uri.strip_prefix(prefix.as_str())
                .map(|rest| format!("{}{}", target, rest))
        })
    }
}
