use std::path::PathBuf;

use thiserror::Error;

use crate::lsif::GraphError;
use crate::tree::TreeError;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed LSIF dump: {0}")]
    Graph(#[from] GraphError),
    #[error("navigation tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("cannot map document uri {uri}: {reason}")]
    Uri { uri: String, reason: String },
    #[error("highlighting {language} failed: {reason}")]
    Highlight { language: String, reason: String },
    #[error("task error: {0}")]
    Task(String),
}

impl SiteError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SiteError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
