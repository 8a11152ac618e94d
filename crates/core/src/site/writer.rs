//! Write phase: every generated file goes through one bounded join point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::error::{Result, SiteError};

#[derive(Debug, Clone)]
pub struct OutputFile {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl OutputFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Remove a previous run's output. A missing directory is fine.
pub async fn clean_output(output: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(output).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SiteError::io(output, e)),
    }
}

/// Write all files with at most `jobs` writes in flight. The first failure
/// aborts the rest and is returned.
pub async fn write_all(files: Vec<OutputFile>, jobs: usize) -> Result<usize> {
    let permits = Arc::new(Semaphore::new(jobs.max(1)));
    let mut set = JoinSet::new();

    for file in files {
        let permits = Arc::clone(&permits);
        set.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| SiteError::Task("write semaphore closed".to_string()))?;
            write_one(file).await
        });
    }

    let mut written = 0;
    while let Some(joined) = set.join_next().await {
        let outcome = joined
            .map_err(|e| SiteError::Task(e.to_string()))
            .and_then(|r| r);
        if let Err(e) = outcome {
            set.abort_all();
            return Err(e);
        }
        written += 1;
    }
    debug!("wrote {} files", written);
    Ok(written)
}

async fn write_one(file: OutputFile) -> Result<()> {
    if let Some(parent) = file.path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| SiteError::io(parent, e))?;
    }
    tokio::fs::write(&file.path, &file.contents)
        .await
        .map_err(|e| SiteError::io(&file.path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_all_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            OutputFile::new(dir.path().join("a/b/c.html"), "c"),
            OutputFile::new(dir.path().join("index.html"), "i"),
        ];
        assert_eq!(write_all(files, 1).await.unwrap(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a/b/c.html")).unwrap(),
            "c"
        );
    }

    #[tokio::test]
    async fn test_write_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("blocker"), "file").unwrap();
        let files = vec![OutputFile::new(dir.path().join("blocker/x.html"), "x")];
        let err = write_all(files, 2).await.unwrap_err();
        assert!(matches!(err, SiteError::Io { .. }));
    }

    #[tokio::test]
    async fn test_clean_missing_output_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        clean_output(&dir.path().join("nope")).await.unwrap();

        let out = dir.path().join("out");
        std::fs::create_dir_all(out.join("old")).unwrap();
        clean_output(&out).await.unwrap();
        assert!(!out.exists());
    }
}
