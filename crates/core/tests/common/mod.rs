#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Value, json};
use sourcetree_core::render::{PlainHighlighter, PlainTextRenderer};
use sourcetree_core::{SiteBuilder, SiteConfig};
use tempfile::TempDir;
use url::Url;

/// A throwaway project: sources on disk, a dump describing them, an output dir.
pub struct Project {
    pub dir: TempDir,
    pub root: Url,
    lines: Vec<Value>,
    next_id: u64,
}

impl Project {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        let root = Url::from_directory_path(&src).unwrap();
        let mut project = Self {
            dir,
            root,
            lines: Vec::new(),
            next_id: 1,
        };
        let root = project.root.to_string();
        project.vertex(json!({ "label": "metaData", "version": "0.4.3", "projectRoot": root }));
        project
    }

    pub fn src(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("out")
    }

    pub fn dump_path(&self) -> PathBuf {
        self.dir.path().join("dump.lsif")
    }

    fn push(&mut self, kind: &str, mut body: Value) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        body["id"] = json!(id);
        body["type"] = json!(kind);
        self.lines.push(body);
        id
    }

    pub fn vertex(&mut self, body: Value) -> u64 {
        self.push("vertex", body)
    }

    pub fn edge(&mut self, label: &str, out_v: u64, in_vs: &[u64]) -> u64 {
        self.push("edge", json!({ "label": label, "outV": out_v, "inVs": in_vs }))
    }

    /// Write `text` under the project root and add its document vertex.
    pub fn document(&mut self, relative: &str, language: &str, text: &str) -> u64 {
        let path = self.src().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        let uri = self.root.join(relative).unwrap().to_string();
        self.vertex(json!({ "label": "document", "uri": uri, "languageId": language }))
    }

    /// Document vertex for a uri that is not under the project root.
    pub fn foreign_document(&mut self, uri: &str) -> u64 {
        self.vertex(json!({ "label": "document", "uri": uri, "languageId": "go" }))
    }

    pub fn range(&mut self, line: u32, start: u32, end: u32) -> u64 {
        self.vertex(json!({
            "label": "range",
            "start": { "line": line, "character": start },
            "end": { "line": line, "character": end },
        }))
    }

    pub fn result_set(&mut self, ranges: &[u64]) -> u64 {
        let set = self.vertex(json!({ "label": "resultSet" }));
        for &range in ranges {
            self.push("edge", json!({ "label": "next", "outV": range, "inV": set }));
        }
        set
    }

    pub fn hover(&mut self, from: u64, markdown: &str) -> u64 {
        let hover = self.vertex(json!({
            "label": "hoverResult",
            "result": { "contents": { "kind": "markdown", "value": markdown } },
        }));
        self.push(
            "edge",
            json!({ "label": "textDocument/hover", "outV": from, "inV": hover }),
        );
        hover
    }

    pub fn definition(&mut self, from: u64, target: u64, document: u64) -> u64 {
        let result = self.vertex(json!({ "label": "definitionResult" }));
        self.push(
            "edge",
            json!({ "label": "textDocument/definition", "outV": from, "inV": result }),
        );
        self.push(
            "edge",
            json!({ "label": "item", "outV": result, "inVs": [target], "document": document }),
        );
        result
    }

    pub fn references(
        &mut self,
        from: u64,
        document: u64,
        definitions: &[u64],
        references: &[u64],
    ) -> u64 {
        let result = self.vertex(json!({ "label": "referenceResult" }));
        self.push(
            "edge",
            json!({ "label": "textDocument/references", "outV": from, "inV": result }),
        );
        self.push(
            "edge",
            json!({ "label": "item", "outV": result, "inVs": definitions, "document": document, "property": "definitions" }),
        );
        self.push(
            "edge",
            json!({ "label": "item", "outV": result, "inVs": references, "document": document, "property": "references" }),
        );
        result
    }

    pub fn config(&self) -> SiteConfig {
        let text: String = self
            .lines
            .iter()
            .map(|line| format!("{line}\n"))
            .collect();
        std::fs::write(self.dump_path(), text).unwrap();
        SiteConfig {
            input: self.dump_path(),
            output: self.output(),
            jobs: 2,
            ..SiteConfig::default()
        }
    }
}

pub fn plain_builder() -> SiteBuilder {
    SiteBuilder::new(Arc::new(PlainHighlighter), Arc::new(PlainTextRenderer))
}

pub fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path.as_ref())
        .unwrap_or_else(|e| panic!("{}: {e}", path.as_ref().display()))
}

pub fn read_json(path: impl AsRef<Path>) -> Value {
    serde_json::from_str(&read(path)).unwrap()
}
