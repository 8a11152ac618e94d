//! In-memory copies of the documents' source text.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, SiteError};
use crate::lsif::ElementId;

#[derive(Debug, Clone)]
pub struct SourceText {
    text: String,
    line_starts: Vec<usize>,
}

impl SourceText {
    pub fn new(text: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { text, line_starts }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| SiteError::io(path, e))?;
        Ok(Self::new(String::from_utf8_lossy(&bytes).into_owned()))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Zero-based line without its terminator.
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        self.text
            .get(start..end)
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
    }
}

#[derive(Debug, Default)]
pub struct SourceMap {
    sources: HashMap<ElementId, SourceText>,
}

impl SourceMap {
    pub fn insert(&mut self, document: ElementId, source: SourceText) {
        self.sources.insert(document, source);
    }

    pub fn get(&self, document: &ElementId) -> Option<&SourceText> {
        self.sources.get(document)
    }

    pub fn line(&self, document: &ElementId, line: usize) -> Option<&str> {
        self.get(document)?.line(line)
    }
}

impl FromIterator<(ElementId, SourceText)> for SourceMap {
    fn from_iter<I: IntoIterator<Item = (ElementId, SourceText)>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}
