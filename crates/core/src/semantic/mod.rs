//! Per-document semantic extraction.
//!
//! For every non-empty range of a document the extractor resolves hover,
//! definition and references through the result-set chain, producing the
//! wrapper insertions for the page and the occurrence records for the hover
//! sidecar.

pub mod hover;
pub mod location;
pub mod references;

use std::sync::Arc;

use tracing::debug;

pub use hover::{HoverTable, HoverText, hover_text};
pub use location::{Location, Locator};
pub use references::{ItemPartition, ReferenceSet, ReferenceSets, partition_items};

use crate::annotate::AnnotationInsertion;
use crate::error::Result;
use crate::lsif::{
    ChainResolver, EdgeLabel, ElementId, GraphError, IndexedGraph, RangeVertex, Vertex, VertexRef,
};
use crate::render::MarkupRenderer;

/// What one range resolves to. Absent parts are simply `None`.
#[derive(Debug, Clone)]
pub struct ResolvedOccurrence {
    pub range_id: ElementId,
    pub range: RangeVertex,
    /// Hover result id and its rendered HTML.
    pub hover: Option<(ElementId, Arc<str>)>,
    /// Definition result id and where it points.
    pub definition: Option<(ElementId, Location)>,
    /// Reference result id; its set lives in [`ReferenceSets`].
    pub references: Option<ElementId>,
}

#[derive(Debug, Default)]
pub struct DocumentSemantics {
    pub insertions: Vec<AnnotationInsertion>,
    pub occurrences: Vec<ResolvedOccurrence>,
}

pub fn open_marker(range_id: &ElementId) -> String {
    format!(r#"<span id="lsif{}">"#, range_id)
}

pub const CLOSE_MARKER: &str = "</span>";

pub struct SemanticExtractor<'a> {
    graph: &'a IndexedGraph,
    resolver: ChainResolver<'a>,
    locator: &'a Locator<'a>,
    renderer: &'a dyn MarkupRenderer,
    hovers: &'a HoverTable,
    references: &'a ReferenceSets,
}

impl<'a> SemanticExtractor<'a> {
    pub fn new(
        graph: &'a IndexedGraph,
        locator: &'a Locator<'a>,
        renderer: &'a dyn MarkupRenderer,
        hovers: &'a HoverTable,
        references: &'a ReferenceSets,
    ) -> Self {
        Self {
            graph,
            resolver: ChainResolver::new(graph),
            locator,
            renderer,
            hovers,
            references,
        }
    }

    pub fn extract(&self, document: &ElementId) -> Result<DocumentSemantics> {
        let mut semantics = DocumentSemantics::default();

        for edge_ref in self.graph.outgoing_labeled(document, EdgeLabel::Contains) {
            for range_id in &edge_ref.edge.in_vs {
                let range = match self.graph.vertex(range_id)?.vertex {
                    Vertex::Range(range) => *range,
                    other => {
                        debug!("document {} contains a {}, skipping", document, other.label());
                        continue;
                    }
                };
                if range.is_empty() {
                    continue;
                }
                if let Some(occurrence) = self.resolve_occurrence(range_id, range)? {
                    semantics
                        .insertions
                        .push(AnnotationInsertion::new(range.start, open_marker(range_id)));
                    semantics
                        .insertions
                        .push(AnnotationInsertion::new(range.end, CLOSE_MARKER));
                    semantics.occurrences.push(occurrence);
                }
            }
        }

        Ok(semantics)
    }

    fn resolve_occurrence(
        &self,
        range_id: &ElementId,
        range: RangeVertex,
    ) -> Result<Option<ResolvedOccurrence>> {
        let hover = self.resolve_hover(range_id)?;
        let definition = self.resolve_definition(range_id)?;
        let references = self.resolve_references(range_id)?;

        if hover.is_none() && definition.is_none() && references.is_none() {
            return Ok(None);
        }
        Ok(Some(ResolvedOccurrence {
            range_id: range_id.clone(),
            range,
            hover,
            definition,
            references,
        }))
    }

    fn resolve_hover(&self, range_id: &ElementId) -> Result<Option<(ElementId, Arc<str>)>> {
        let Some(found) = self.resolver.resolve(range_id, EdgeLabel::Hover)? else {
            return Ok(None);
        };
        let Vertex::HoverResult(result) = found.vertex else {
            return Err(unexpected(found, "hoverResult").into());
        };
        let html = self
            .hovers
            .get_or_render(found.id, &result.result.contents, self.renderer)?;
        Ok(Some((found.id.clone(), html)))
    }

    fn resolve_definition(&self, range_id: &ElementId) -> Result<Option<(ElementId, Location)>> {
        let Some(found) = self.resolver.resolve(range_id, EdgeLabel::Definition)? else {
            return Ok(None);
        };
        let Some(item) = self
            .graph
            .outgoing_labeled(found.id, EdgeLabel::Item)
            .next()
        else {
            return Ok(None);
        };
        let Some(target) = item.edge.first_target() else {
            return Ok(None);
        };
        if target == range_id {
            return Ok(None);
        }
        let location = self.locator.locate(target, item.edge.document.as_ref())?;
        Ok(location.map(|loc| (found.id.clone(), loc)))
    }

    fn resolve_references(&self, range_id: &ElementId) -> Result<Option<ElementId>> {
        let Some(found) = self.resolver.resolve(range_id, EdgeLabel::References)? else {
            return Ok(None);
        };
        let set = self
            .references
            .get_or_resolve(found.id, self.graph, self.locator)?;
        Ok(set.map(|_| found.id.clone()))
    }
}

fn unexpected(found: VertexRef<'_>, expected: &'static str) -> GraphError {
    GraphError::UnexpectedKind {
        id: found.id.clone(),
        expected,
    }
}
