//! Reference sets: definitions and references reachable from a reference result.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;

use super::location::{Location, Locator};
use crate::error::Result;
use crate::lsif::{EdgeLabel, ElementId, GraphError, GraphResult, IndexedGraph, ItemProperty};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSet {
    pub definitions: Vec<Location>,
    pub references: Vec<Location>,
}

/// Item-edge targets of a reference result, split by `property`, in edge order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ItemPartition {
    pub definitions: Vec<(ElementId, Option<ElementId>)>,
    pub references: Vec<(ElementId, Option<ElementId>)>,
    /// Whether any `definitions`-tagged edge was seen, even one whose
    /// targets end up outside the site.
    pub has_definitions: bool,
}

/// Partition the item edges of `result`, following `referenceResults` edges
/// into nested results.
pub fn partition_items(graph: &IndexedGraph, result: &ElementId) -> GraphResult<ItemPartition> {
    let mut partition = ItemPartition::default();
    let mut visited = HashSet::new();
    collect_items(graph, result, result, &mut visited, &mut partition)?;
    Ok(partition)
}

fn collect_items(
    graph: &IndexedGraph,
    root: &ElementId,
    result: &ElementId,
    visited: &mut HashSet<ElementId>,
    partition: &mut ItemPartition,
) -> GraphResult<()> {
    if !visited.insert(result.clone()) {
        return Err(GraphError::Cycle {
            start: root.clone(),
            revisited: result.clone(),
        });
    }

    for edge_ref in graph.outgoing_labeled(result, EdgeLabel::Item) {
        let edge = edge_ref.edge;
        match edge.property {
            Some(ItemProperty::Definitions) => {
                partition.has_definitions = true;
                partition.definitions.extend(
                    edge.in_vs
                        .iter()
                        .map(|target| (target.clone(), edge.document.clone())),
                );
            }
            Some(ItemProperty::ReferenceResults) => {
                for nested in &edge.in_vs {
                    collect_items(graph, root, nested, visited, partition)?;
                }
            }
            // Monikers into other projects; not part of this site.
            Some(ItemProperty::ReferenceLinks) => {}
            _ => partition.references.extend(
                edge.in_vs
                    .iter()
                    .map(|target| (target.clone(), edge.document.clone())),
            ),
        }
    }
    Ok(())
}

/// Deduplicating accumulator of reference sets, safe to share between workers.
///
/// A result without any `definitions` edge is remembered as `None` so it is
/// not partitioned again.
#[derive(Default)]
pub struct ReferenceSets {
    sets: DashMap<ElementId, Option<Arc<ReferenceSet>>>,
}

impl ReferenceSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(
        &self,
        result: &ElementId,
        graph: &IndexedGraph,
        locator: &Locator<'_>,
    ) -> Result<Option<Arc<ReferenceSet>>> {
        if let Some(hit) = self.sets.get(result) {
            return Ok(hit.value().clone());
        }
        let entry = self
            .sets
            .entry(result.clone())
            .or_try_insert_with(|| resolve_set(result, graph, locator))?;
        Ok(entry.value().clone())
    }

    /// Materialized sets, ordered by id for stable output.
    pub fn resolved(&self) -> Vec<(ElementId, Arc<ReferenceSet>)> {
        let mut out: Vec<_> = self
            .sets
            .iter()
            .filter_map(|e| e.value().as_ref().map(|set| (e.key().clone(), Arc::clone(set))))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

fn resolve_set(
    result: &ElementId,
    graph: &IndexedGraph,
    locator: &Locator<'_>,
) -> GraphResult<Option<Arc<ReferenceSet>>> {
    let partition = partition_items(graph, result)?;
    if !partition.has_definitions {
        return Ok(None);
    }
    let locate_all = |targets: &[(ElementId, Option<ElementId>)]| -> GraphResult<Vec<Location>> {
        let mut out = Vec::with_capacity(targets.len());
        for (range, document) in targets {
            if let Some(location) = locator.locate(range, document.as_ref())? {
                out.push(location);
            }
        }
        Ok(out)
    };
    Ok(Some(Arc::new(ReferenceSet {
        definitions: locate_all(&partition.definitions)?,
        references: locate_all(&partition.references)?,
    })))
}
