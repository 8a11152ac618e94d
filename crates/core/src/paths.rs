//! Document URI to output path mapping.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::config::UriMap;
use crate::error::{Result, SiteError};

pub struct PathMapper {
    root_prefix: String,
    uri_map: UriMap,
}

impl PathMapper {
    pub fn new(project_root: &str, uri_map: UriMap) -> Self {
        let mut root_prefix = project_root.to_string();
        if !root_prefix.ends_with('/') {
            root_prefix.push('/');
        }
        Self {
            root_prefix,
            uri_map,
        }
    }

    /// Percent-decoded output-relative path (without extension) for a
    /// document. `None` when the document lies outside the project and the
    /// remapping table, or when its path would leave the output directory.
    pub fn relative(&self, uri: &str) -> Option<String> {
        let mapped = self
            .uri_map
            .lookup(uri)
            .or_else(|| uri.strip_prefix(self.root_prefix.as_str()).map(str::to_string))?;
        let trimmed = mapped.trim_start_matches('/');
        if trimmed.is_empty() || trimmed.ends_with('/') {
            return None;
        }
        let decoded = percent_decode_str(trimmed).decode_utf8().ok()?;
        is_contained(&decoded).then(|| decoded.into_owned())
    }
}

/// Every segment is a plain name, so joining onto the output root stays below it.
fn is_contained(relative: &str) -> bool {
    relative.split('/').enumerate().all(|(idx, segment)| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && !segment.contains(['\\', '\0'])
            && !(idx == 0 && segment.ends_with(':'))
    })
}

/// Local file backing a `file://` document URI.
pub fn source_path(uri: &str) -> Result<PathBuf> {
    let url = Url::parse(uri).map_err(|e| SiteError::Uri {
        uri: uri.to_string(),
        reason: e.to_string(),
    })?;
    url.to_file_path().map_err(|_| SiteError::Uri {
        uri: uri.to_string(),
        reason: "not a local file uri".to_string(),
    })
}

/// Number of directories between the output root and a page.
pub fn depth(relative: &str) -> usize {
    relative.matches('/').count()
}

/// Relative prefix leading from a page back to the output root.
pub fn root_prefix(relative: &str) -> String {
    "../".repeat(depth(relative))
}

pub fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}
