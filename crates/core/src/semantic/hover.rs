//! Hover payload decoding and the shared rendered-hover table.

use std::sync::Arc;

use dashmap::DashMap;
use lsp_types::{HoverContents, MarkedString, MarkupKind};

use crate::error::{Result, SiteError};
use crate::lsif::{ElementId, GraphError};
use crate::render::MarkupRenderer;

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverText {
    Markdown(String),
    PlainText(String),
}

/// Decode the raw `contents` of a hover result.
pub fn hover_text(id: &ElementId, contents: &serde_json::Value) -> Result<HoverText> {
    let parsed: HoverContents =
        serde_json::from_value(contents.clone()).map_err(|e| GraphError::UnrecognizedHover {
            id: id.clone(),
            reason: e.to_string(),
        })?;

    Ok(match parsed {
        HoverContents::Scalar(marked) => HoverText::Markdown(marked_to_markdown(&marked)),
        HoverContents::Array(items) => HoverText::Markdown(
            items
                .iter()
                .map(marked_to_markdown)
                .collect::<Vec<_>>()
                .join(SECTION_SEPARATOR),
        ),
        HoverContents::Markup(markup) => match markup.kind {
            MarkupKind::Markdown => HoverText::Markdown(markup.value),
            MarkupKind::PlainText => HoverText::PlainText(markup.value),
        },
    })
}

fn marked_to_markdown(marked: &MarkedString) -> String {
    match marked {
        MarkedString::String(s) => s.clone(),
        MarkedString::LanguageString(ls) => fenced(&ls.language, &ls.value),
    }
}

/// Fence long enough not to be closed by backticks inside `code`.
fn fenced(language: &str, code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let fence = "`".repeat(longest.max(2) + 1);
    format!("{fence}{language}\n{code}\n{fence}")
}

/// Rendered hover HTML keyed by hover-result id, shared by all workers.
///
/// Each id is rendered at most once per run no matter how many ranges or
/// documents point at it.
#[derive(Default)]
pub struct HoverTable {
    rendered: DashMap<ElementId, Arc<str>>,
}

impl HoverTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_render(
        &self,
        id: &ElementId,
        contents: &serde_json::Value,
        renderer: &dyn MarkupRenderer,
    ) -> Result<Arc<str>> {
        if let Some(hit) = self.rendered.get(id) {
            return Ok(Arc::clone(hit.value()));
        }
        let entry = self
            .rendered
            .entry(id.clone())
            .or_try_insert_with(|| -> std::result::Result<Arc<str>, SiteError> {
                let html = match hover_text(id, contents)? {
                    HoverText::Markdown(md) => renderer.render_markdown(&md)?,
                    HoverText::PlainText(text) => renderer.render_plaintext(&text)?,
                };
                Ok(Arc::from(html))
            })?;
        Ok(Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id() -> ElementId {
        ElementId::from(5)
    }

    #[test]
    fn test_plain_string() {
        assert_eq!(
            hover_text(&id(), &json!("hello")).unwrap(),
            HoverText::Markdown("hello".to_string())
        );
    }

    #[test]
    fn test_language_string_becomes_fence() {
        assert_eq!(
            hover_text(&id(), &json!({"language": "go", "value": "func main()"})).unwrap(),
            HoverText::Markdown("```go\nfunc main()\n```".to_string())
        );
    }

    #[test]
    fn test_fence_outgrows_inner_backticks() {
        let text = hover_text(&id(), &json!({"language": "md", "value": "````"})).unwrap();
        assert_eq!(text, HoverText::Markdown("`````md\n````\n`````".to_string()));
    }

    #[test]
    fn test_list_is_joined() {
        let text = hover_text(
            &id(),
            &json!([{"language": "go", "value": "var x int"}, "doc comment"]),
        )
        .unwrap();
        assert_eq!(
            text,
            HoverText::Markdown("```go\nvar x int\n```\n\n---\n\ndoc comment".to_string())
        );
    }

    #[test]
    fn test_markup_content_kinds() {
        assert_eq!(
            hover_text(&id(), &json!({"kind": "markdown", "value": "**b**"})).unwrap(),
            HoverText::Markdown("**b**".to_string())
        );
        assert_eq!(
            hover_text(&id(), &json!({"kind": "plaintext", "value": "a < b"})).unwrap(),
            HoverText::PlainText("a < b".to_string())
        );
    }

    #[test]
    fn test_unrecognized_shape() {
        for bad in [json!(42), json!({"unexpected": true}), json!(null)] {
            assert!(matches!(
                hover_text(&id(), &bad),
                Err(SiteError::Graph(GraphError::UnrecognizedHover { .. }))
            ));
        }
    }

    struct CountingRenderer(AtomicUsize);

    impl MarkupRenderer for CountingRenderer {
        fn render_markdown(&self, markdown: &str) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(format!("<p>{markdown}</p>"))
        }
    }

    #[test]
    fn test_table_renders_each_id_once() {
        let table = HoverTable::new();
        let renderer = CountingRenderer(AtomicUsize::new(0));
        let contents = json!("doc");
        let a = table.get_or_render(&id(), &contents, &renderer).unwrap();
        let b = table.get_or_render(&id(), &contents, &renderer).unwrap();
        assert_eq!(&*a, "<p>doc</p>");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(renderer.0.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
    }
}
