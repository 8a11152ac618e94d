//! Immutable, randomly-addressable LSIF graph.
//!
//! Built in one linear pass over the element stream. After construction the
//! graph is only read, so it can be shared across worker threads behind an
//! `Arc` without locking.

use std::collections::HashMap;

use super::element::{Document, Edge, EdgeLabel, Element, ElementId, MetaData, RangeVertex, Vertex};
use super::error::{GraphError, GraphResult};

/// An edge together with its own id.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRef<'g> {
    pub id: &'g ElementId,
    pub edge: &'g Edge,
}

/// A vertex together with its own id.
#[derive(Debug, Clone, Copy)]
pub struct VertexRef<'g> {
    pub id: &'g ElementId,
    pub vertex: &'g Vertex,
}

pub struct IndexedGraph {
    elements: Vec<Element>,
    by_id: HashMap<ElementId, usize>,
    /// Source id -> edges leaving it, in dump order.
    outgoing: HashMap<ElementId, Vec<usize>>,
    /// Target id -> edges pointing at it; multi-target edges appear once per target.
    incoming: HashMap<ElementId, Vec<usize>>,
    meta: MetaData,
    documents: Vec<usize>,
}

impl IndexedGraph {
    /// Parse a line-delimited dump. Blank lines are ignored.
    pub fn parse(text: &str) -> GraphResult<Self> {
        let mut elements = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if let Some(el) = parse_line(line, idx + 1)? {
                elements.push(el);
            }
        }
        Self::from_elements(elements)
    }

    pub fn from_elements(elements: Vec<Element>) -> GraphResult<Self> {
        let mut by_id = HashMap::with_capacity(elements.len());
        let mut outgoing: HashMap<ElementId, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<ElementId, Vec<usize>> = HashMap::new();
        let mut meta = None;
        let mut documents = Vec::new();

        for (idx, element) in elements.iter().enumerate() {
            if by_id.insert(element.id.clone(), idx).is_some() {
                return Err(GraphError::DuplicateId(element.id.clone()));
            }
            if let Some(edge) = element.as_edge() {
                outgoing.entry(edge.out_v.clone()).or_default().push(idx);
                for target in &edge.in_vs {
                    incoming.entry(target.clone()).or_default().push(idx);
                }
                continue;
            }
            match element.as_vertex() {
                Some(Vertex::MetaData(data)) => {
                    if meta.is_some() {
                        return Err(GraphError::DuplicateMetaData(element.id.clone()));
                    }
                    meta = Some(data.clone());
                }
                Some(Vertex::Document(_)) => documents.push(idx),
                _ => {}
            }
        }

        let graph = Self {
            elements,
            by_id,
            outgoing,
            incoming,
            meta: meta.ok_or(GraphError::MissingMetaData)?,
            documents,
        };
        graph.check_edge_endpoints()?;
        Ok(graph)
    }

    // Ids may appear in any order in the stream, so endpoints are verified
    // only once everything is registered.
    fn check_edge_endpoints(&self) -> GraphResult<()> {
        for element in &self.elements {
            let Some(edge) = element.as_edge() else {
                continue;
            };
            let endpoints = std::iter::once(&edge.out_v)
                .chain(edge.in_vs.iter())
                .chain(edge.document.iter());
            for id in endpoints {
                match self.get(id) {
                    Some(el) if el.as_vertex().is_some() => {}
                    Some(_) => {
                        return Err(GraphError::MalformedEdge {
                            id: element.id.clone(),
                            reason: format!("endpoint {id} is an edge"),
                        });
                    }
                    None => return Err(GraphError::MissingElement(id.clone())),
                }
            }
        }
        Ok(())
    }

    // ---- Lookups ----

    /// Query lookup: absence is a normal outcome.
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.by_id.get(id).map(|&idx| &self.elements[idx])
    }

    /// Structural lookup: absence means the dump is malformed.
    pub fn require(&self, id: &ElementId) -> GraphResult<&Element> {
        self.get(id)
            .ok_or_else(|| GraphError::MissingElement(id.clone()))
    }

    pub fn vertex(&self, id: &ElementId) -> GraphResult<VertexRef<'_>> {
        let element = self.require(id)?;
        match element.as_vertex() {
            Some(vertex) => Ok(VertexRef {
                id: &element.id,
                vertex,
            }),
            None => Err(GraphError::UnexpectedKind {
                id: id.clone(),
                expected: "vertex",
            }),
        }
    }

    pub fn range(&self, id: &ElementId) -> GraphResult<&RangeVertex> {
        match self.vertex(id)?.vertex {
            Vertex::Range(range) => Ok(range),
            _ => Err(GraphError::UnexpectedKind {
                id: id.clone(),
                expected: "range",
            }),
        }
    }

    pub fn document(&self, id: &ElementId) -> GraphResult<&Document> {
        match self.vertex(id)?.vertex {
            Vertex::Document(doc) => Ok(doc),
            _ => Err(GraphError::UnexpectedKind {
                id: id.clone(),
                expected: "document",
            }),
        }
    }

    // ---- Adjacency ----

    pub fn outgoing(&self, id: &ElementId) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges_at(self.outgoing.get(id))
    }

    pub fn incoming(&self, id: &ElementId) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.edges_at(self.incoming.get(id))
    }

    pub fn outgoing_labeled(
        &self,
        id: &ElementId,
        label: EdgeLabel,
    ) -> impl Iterator<Item = EdgeRef<'_>> + '_ {
        self.outgoing(id).filter(move |e| e.edge.label == label)
    }

    fn edges_at<'g>(&'g self, slots: Option<&'g Vec<usize>>) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        slots
            .into_iter()
            .flatten()
            .filter_map(move |&idx| {
                let element = &self.elements[idx];
                element.as_edge().map(|edge| EdgeRef {
                    id: &element.id,
                    edge,
                })
            })
    }

    // ---- Dump-level data ----

    pub fn meta_data(&self) -> &MetaData {
        &self.meta
    }

    pub fn project_root(&self) -> &str {
        &self.meta.project_root
    }

    /// All document vertices in dump order.
    pub fn documents(&self) -> impl Iterator<Item = (&ElementId, &Document)> + '_ {
        self.documents.iter().filter_map(move |&idx| {
            let element = &self.elements[idx];
            match element.as_vertex() {
                Some(Vertex::Document(doc)) => Some((&element.id, doc)),
                _ => None,
            }
        })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.elements.iter().filter(|e| e.as_edge().is_some()).count()
    }
}

fn parse_line(line: &str, number: usize) -> GraphResult<Option<Element>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| GraphError::Parse {
            line: number,
            source,
        })
}
