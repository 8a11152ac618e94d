use thiserror::Error;

use super::element::ElementId;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("element {0} is referenced but not present in the dump")]
    MissingElement(ElementId),
    #[error("element id {0} appears more than once")]
    DuplicateId(ElementId),
    #[error("edge {id} is malformed: {reason}")]
    MalformedEdge { id: ElementId, reason: String },
    #[error("dump has no metaData vertex")]
    MissingMetaData,
    #[error("dump has more than one metaData vertex (second is {0})")]
    DuplicateMetaData(ElementId),
    #[error("element {id} is not a {expected}")]
    UnexpectedKind { id: ElementId, expected: &'static str },
    #[error("result-set chain starting at {start} revisits {revisited}")]
    Cycle { start: ElementId, revisited: ElementId },
    #[error("hover result {id} has an unrecognized shape: {reason}")]
    UnrecognizedHover { id: ElementId, reason: String },
    #[error("range {0} is not contained in any document")]
    NoOwningDocument(ElementId),
}

pub type GraphResult<T> = std::result::Result<T, GraphError>;
