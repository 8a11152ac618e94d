//! Collaborator seams for turning text into HTML.
//!
//! The pipeline only depends on these traits; concrete highlighters and
//! Markdown renderers are registered by the runtime crate.

pub mod templates;

use crate::error::Result;

/// Produces highlighted HTML for a whole source file.
///
/// Implementations must keep the line count and the visible characters of
/// every line unchanged: only tags and entity escapes may be added.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, source: &str, language_id: &str) -> Result<String>;
}

/// Renders hover documentation to HTML.
pub trait MarkupRenderer: Send + Sync {
    fn render_markdown(&self, markdown: &str) -> Result<String>;

    fn render_plaintext(&self, text: &str) -> Result<String> {
        Ok(format!("<pre>{}</pre>", escape_html(text)))
    }
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Highlighter that only escapes. Used for languages without a grammar.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, source: &str, _language_id: &str) -> Result<String> {
        Ok(escape_html(source))
    }
}

/// Renderer that shows Markdown source as preformatted text.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextRenderer;

impl MarkupRenderer for PlainTextRenderer {
    fn render_markdown(&self, markdown: &str) -> Result<String> {
        self.render_plaintext(markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&#39;");
    }

    #[test]
    fn test_plain_highlighter_keeps_lines() {
        let out = PlainHighlighter.highlight("if a < b {\n}\n", "go").unwrap();
        assert_eq!(out, "if a &lt; b {\n}\n");
    }
}
