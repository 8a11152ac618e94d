//! Markdown subset used by hover documentation.
//!
//! Block level: fenced code, ATX headings, thematic breaks, bullet lists and
//! paragraphs. Inline: code spans, emphasis, strong emphasis and links.
//! Everything else is shown as escaped text.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use sourcetree_core::render::{Highlighter, MarkupRenderer, escape_html};

static CODE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static STRONG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__").unwrap());
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*|\b_([^_\s][^_]*)_\b").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*?)\s*#*\s*$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.*)$").unwrap());

/// Markdown renderer whose fenced code blocks go through `highlighter`.
pub struct MarkdownRenderer {
    highlighter: Arc<dyn Highlighter>,
}

enum Block {
    Paragraph(Vec<String>),
    List(Vec<String>),
}

impl MarkdownRenderer {
    pub fn new(highlighter: Arc<dyn Highlighter>) -> Self {
        Self { highlighter }
    }

    fn code_block(&self, info: &str, code: &str) -> sourcetree_core::Result<String> {
        let language = info.split_whitespace().next().unwrap_or_default();
        let body = if language.is_empty() {
            escape_html(code)
        } else {
            self.highlighter.highlight(code, language)?
        };
        let class = if language.is_empty() {
            String::new()
        } else {
            format!(r#" class="language-{}""#, escape_html(language))
        };
        Ok(format!("<pre><code{}>{}</code></pre>", class, body))
    }
}

impl MarkupRenderer for MarkdownRenderer {
    fn render_markdown(&self, markdown: &str) -> sourcetree_core::Result<String> {
        let mut out = String::new();
        let mut open: Option<Block> = None;
        let mut lines = markdown.lines();

        while let Some(line) = lines.next() {
            let trimmed = line.trim_start();

            if let Some((fence, info)) = fence_open(trimmed) {
                flush(&mut out, open.take());
                let mut code = Vec::new();
                for inner in lines.by_ref() {
                    if is_fence_close(inner.trim(), fence) {
                        break;
                    }
                    code.push(inner);
                }
                out.push_str(&self.code_block(info, &code.join("\n"))?);
                continue;
            }

            if trimmed.is_empty() {
                flush(&mut out, open.take());
                continue;
            }

            if let Some(caps) = HEADING.captures(trimmed) {
                flush(&mut out, open.take());
                let level = caps[1].len();
                out.push_str(&format!("<h{level}>{}</h{level}>", inline(&caps[2])));
                continue;
            }

            if is_thematic_break(trimmed) {
                flush(&mut out, open.take());
                out.push_str("<hr>");
                continue;
            }

            if let Some(caps) = BULLET.captures(line) {
                let item = caps[1].to_string();
                match &mut open {
                    Some(Block::List(items)) => items.push(item),
                    _ => {
                        flush(&mut out, open.take());
                        open = Some(Block::List(vec![item]));
                    }
                }
                continue;
            }

            match &mut open {
                Some(Block::Paragraph(para)) => para.push(trimmed.to_string()),
                Some(Block::List(items)) => {
                    if let Some(last) = items.last_mut() {
                        last.push(' ');
                        last.push_str(trimmed);
                    }
                }
                None => open = Some(Block::Paragraph(vec![trimmed.to_string()])),
            }
        }

        flush(&mut out, open);
        Ok(out)
    }
}

fn flush(out: &mut String, block: Option<Block>) {
    match block {
        Some(Block::Paragraph(lines)) => {
            out.push_str(&format!("<p>{}</p>", inline(&lines.join("\n"))));
        }
        Some(Block::List(items)) => {
            out.push_str("<ul>");
            for item in items {
                out.push_str(&format!("<li>{}</li>", inline(&item)));
            }
            out.push_str("</ul>");
        }
        None => {}
    }
}

/// Backtick or tilde fence of at least three characters, with its info string.
fn fence_open(line: &str) -> Option<(&str, &str)> {
    let marker = line.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = line.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let (fence, info) = line.split_at(len);
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some((fence, info.trim()))
}

fn is_fence_close(line: &str, fence: &str) -> bool {
    let Some(marker) = fence.chars().next() else {
        return false;
    };
    line.len() >= fence.len() && line.chars().all(|c| c == marker)
}

fn is_thematic_break(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|m| compact.chars().all(|c| c == *m))
}

/// Inline formatting. Code spans are cut out first so their content stays literal.
fn inline(text: &str) -> String {
    let mut out = String::new();
    let mut last = 0;
    for caps in CODE_SPAN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&format_text(&text[last..whole.start()]));
        out.push_str(&format!("<code>{}</code>", escape_html(&caps[1])));
        last = whole.end();
    }
    out.push_str(&format_text(&text[last..]));
    out
}

fn format_text(text: &str) -> String {
    let escaped = escape_html(text);
    let linked = LINK.replace_all(&escaped, |caps: &Captures<'_>| {
        let url = &caps[2];
        if is_safe_url(url) {
            format!(r#"<a href="{}">{}</a>"#, url, &caps[1])
        } else {
            caps[1].to_string()
        }
    });
    let strong = STRONG.replace_all(&linked, |caps: &Captures<'_>| {
        let body = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        format!("<strong>{body}</strong>")
    });
    EMPHASIS
        .replace_all(&strong, |caps: &Captures<'_>| {
            let body = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            format!("<em>{body}</em>")
        })
        .into_owned()
}

fn is_safe_url(url: &str) -> bool {
    url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with('#')
        || !url.contains(':')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TreeSitterHighlighter;

    fn render(md: &str) -> String {
        MarkdownRenderer::new(Arc::new(TreeSitterHighlighter))
            .render_markdown(md)
            .unwrap()
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let html = render("```go\nfunc main()\n```\n\n---\n\nRuns the program.");
        assert!(html.starts_with(r#"<pre><code class="language-go">"#));
        assert!(html.contains(r#"<span class="hl-keyword">func</span>"#));
        assert!(html.contains("<hr>"));
        assert!(html.ends_with("<p>Runs the program.</p>"));
    }

    #[test]
    fn test_inline_formatting() {
        let html = render("Use `a<b` with **care** and *style*, see [docs](https://go.dev).");
        assert_eq!(
            html,
            r#"<p>Use <code>a&lt;b</code> with <strong>care</strong> and <em>style</em>, see <a href="https://go.dev">docs</a>.</p>"#
        );
    }

    #[test]
    fn test_unsafe_link_is_dropped() {
        assert_eq!(render("[x](javascript:alert(1))"), "<p>x)</p>");
    }

    #[test]
    fn test_headings_and_lists() {
        let html = render("# Title\n- one\n- two\ncontinued\n\nplain <b>");
        assert_eq!(
            html,
            "<h1>Title</h1><ul><li>one</li><li>two continued</li></ul><p>plain &lt;b&gt;</p>"
        );
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let html = render("```\nlet x = 1;");
        assert_eq!(html, "<pre><code>let x = 1;</code></pre>");
    }
}
