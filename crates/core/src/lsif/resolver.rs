//! Result-set chain resolution.
//!
//! Ranges rarely carry `textDocument/*` edges themselves. They point through
//! `next` edges at one or more result sets, and the first vertex along that
//! chain with an edge of the requested label wins.

use std::collections::HashSet;

use super::element::{EdgeLabel, ElementId};
use super::error::{GraphError, GraphResult};
use super::graph::{IndexedGraph, VertexRef};

#[derive(Clone, Copy)]
pub struct ChainResolver<'g> {
    graph: &'g IndexedGraph,
}

impl<'g> ChainResolver<'g> {
    pub fn new(graph: &'g IndexedGraph) -> Self {
        Self { graph }
    }

    /// Follow `next` edges from `start` until a vertex has an edge labelled
    /// `label`, returning that edge's target. `Ok(None)` when the chain ends
    /// without a match; `Err(Cycle)` when it loops back on itself.
    pub fn resolve(
        &self,
        start: &ElementId,
        label: EdgeLabel,
    ) -> GraphResult<Option<VertexRef<'g>>> {
        let graph = self.graph;
        let mut visited = HashSet::new();
        let mut current = start;

        loop {
            if !visited.insert(current) {
                return Err(GraphError::Cycle {
                    start: start.clone(),
                    revisited: current.clone(),
                });
            }

            let mut next = None;
            for edge_ref in graph.outgoing(current) {
                let edge = edge_ref.edge;
                if edge.label == label {
                    let target = edge.first_target().ok_or_else(|| GraphError::MalformedEdge {
                        id: edge_ref.id.clone(),
                        reason: "relationship edge without target".to_string(),
                    })?;
                    return graph.vertex(target).map(Some);
                }
                if next.is_none() && edge.label == EdgeLabel::Next {
                    next = edge.first_target();
                }
            }

            match next {
                Some(target) => current = target,
                None => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsif::Vertex;

    const HEAD: &str = r#"{"id":1,"type":"vertex","label":"metaData","version":"0.4.3","projectRoot":"file:///repo"}
{"id":2,"type":"vertex","label":"range","start":{"line":0,"character":0},"end":{"line":0,"character":3}}
{"id":3,"type":"vertex","label":"resultSet"}
{"id":4,"type":"vertex","label":"resultSet"}
{"id":5,"type":"vertex","label":"hoverResult","result":{"contents":"doc"}}
"#;

    fn graph(edges: &str) -> IndexedGraph {
        IndexedGraph::parse(&format!("{HEAD}{edges}")).unwrap()
    }

    #[test]
    fn test_two_hop_chain_reaches_hover() {
        let g = graph(
            r#"{"id":10,"type":"edge","label":"next","outV":2,"inV":3}
{"id":11,"type":"edge","label":"next","outV":3,"inV":4}
{"id":12,"type":"edge","label":"textDocument/hover","outV":4,"inV":5}
"#,
        );
        let found = ChainResolver::new(&g)
            .resolve(&"2".into(), EdgeLabel::Hover)
            .unwrap()
            .expect("hover should be found");
        assert_eq!(found.id.as_str(), "5");
        assert!(matches!(found.vertex, Vertex::HoverResult(_)));
    }

    #[test]
    fn test_direct_edge_wins_over_next() {
        let g = graph(
            r#"{"id":10,"type":"edge","label":"next","outV":2,"inV":3}
{"id":11,"type":"edge","label":"textDocument/hover","outV":2,"inV":5}
"#,
        );
        let found = ChainResolver::new(&g)
            .resolve(&"2".into(), EdgeLabel::Hover)
            .unwrap();
        assert_eq!(found.map(|v| v.id.as_str().to_string()), Some("5".to_string()));
    }

    #[test]
    fn test_no_outgoing_edges_is_none() {
        let g = graph("");
        let found = ChainResolver::new(&g)
            .resolve(&"2".into(), EdgeLabel::Hover)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_chain_without_match_is_none() {
        let g = graph(r#"{"id":10,"type":"edge","label":"next","outV":2,"inV":3}
"#);
        let found = ChainResolver::new(&g)
            .resolve(&"2".into(), EdgeLabel::Definition)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_cyclic_chain_is_reported() {
        let g = graph(
            r#"{"id":10,"type":"edge","label":"next","outV":2,"inV":3}
{"id":11,"type":"edge","label":"next","outV":3,"inV":4}
{"id":12,"type":"edge","label":"next","outV":4,"inV":3}
"#,
        );
        let err = ChainResolver::new(&g)
            .resolve(&"2".into(), EdgeLabel::Hover)
            .unwrap_err();
        match err {
            GraphError::Cycle { start, revisited } => {
                assert_eq!(start.as_str(), "2");
                assert_eq!(revisited.as_str(), "3");
            }
            other => panic!("expected cycle, got {other}"),
        }
    }
}
