//! LSIF dump ingestion: element model, indexed graph and chain resolution.

pub mod element;
pub mod error;
pub mod graph;
pub mod resolver;

pub use element::{
    Document, Edge, EdgeLabel, Element, ElementId, ElementKind, HoverPayload, HoverResult,
    ItemProperty, MetaData, RangeVertex, Vertex,
};
pub use error::{GraphError, GraphResult};
pub use graph::{EdgeRef, IndexedGraph, VertexRef};
pub use resolver::ChainResolver;
