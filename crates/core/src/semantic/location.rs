use serde::Serialize;

use crate::lsif::{EdgeLabel, ElementId, GraphError, GraphResult, IndexedGraph, Vertex};
use crate::paths::PathMapper;
use crate::source::SourceMap;

/// A place in the generated site a reader can jump to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Output-root-relative link, e.g. `src/a.go.html#12`.
    pub url: String,
    /// 1-based line.
    pub line: u32,
    /// Source line, trimmed.
    pub text: String,
}

/// Resolves range vertices to [`Location`]s.
pub struct Locator<'a> {
    graph: &'a IndexedGraph,
    paths: &'a PathMapper,
    sources: &'a SourceMap,
}

impl<'a> Locator<'a> {
    pub fn new(graph: &'a IndexedGraph, paths: &'a PathMapper, sources: &'a SourceMap) -> Self {
        Self {
            graph,
            paths,
            sources,
        }
    }

    /// Document whose `contains` edge reaches `range`.
    pub fn owning_document(&self, range: &ElementId) -> Option<&'a ElementId> {
        self.graph
            .incoming(range)
            .filter(|e| e.edge.label == EdgeLabel::Contains)
            .find_map(|e| match self.graph.get(&e.edge.out_v)?.as_vertex()? {
                Vertex::Document(_) => Some(&e.edge.out_v),
                _ => None,
            })
    }

    /// `Ok(None)` when the owning document is not part of the generated site.
    pub fn locate(
        &self,
        range_id: &ElementId,
        document_hint: Option<&ElementId>,
    ) -> GraphResult<Option<Location>> {
        let range = self.graph.range(range_id)?;
        let doc_id = self
            .owning_document(range_id)
            .or(document_hint)
            .ok_or_else(|| GraphError::NoOwningDocument(range_id.clone()))?;
        let doc = self.graph.document(doc_id)?;

        let Some(relative) = self.paths.relative(&doc.uri) else {
            return Ok(None);
        };
        let line = range.start.line;
        let text = self
            .sources
            .line(doc_id, line as usize)
            .map(|l| l.trim().to_string())
            .unwrap_or_default();

        Ok(Some(Location {
            url: format!("{}.html#{}", relative, line + 1),
            line: line + 1,
            text,
        }))
    }
}
