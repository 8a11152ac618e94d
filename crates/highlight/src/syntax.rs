//! Syntax highlighting by walking the tree-sitter leaves of a file.
//!
//! Every byte of the input appears in the output exactly once, escaped, so
//! line structure and visible columns are preserved. Tokens get a
//! `<span class="hl-...">` wrapper; gaps between tokens pass through as text.

use sourcetree_core::SiteError;
use sourcetree_core::render::{Highlighter, escape_html};
use tree_sitter::{Node, Parser};
use tracing::debug;

use crate::language::SourceLanguage;

const STRING_KINDS: &[&str] = &[
    "string",
    "string_literal",
    "raw_string_literal",
    "interpreted_string_literal",
    "template_string",
    "char_literal",
    "character_literal",
    "rune_literal",
];

const NUMBER_KINDS: &[&str] = &[
    "integer",
    "float",
    "number",
    "integer_literal",
    "float_literal",
    "int_literal",
    "imaginary_literal",
    "decimal_integer_literal",
    "decimal_floating_point_literal",
    "hex_integer_literal",
    "octal_integer_literal",
    "binary_integer_literal",
];

const TYPE_KINDS: &[&str] = &[
    "type_identifier",
    "primitive_type",
    "predefined_type",
    "integral_type",
    "floating_point_type",
    "boolean_type",
    "void_type",
];

const CONSTANTS: &[&str] = &[
    "true", "false", "nil", "null", "None", "True", "False", "undefined", "iota",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
    class: Option<&'static str>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterHighlighter;

impl TreeSitterHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn highlight_with(&self, source: &str, language: SourceLanguage) -> Result<String, SiteError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| SiteError::Highlight {
                language: language.as_str().to_string(),
                reason: e.to_string(),
            })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SiteError::Highlight {
                language: language.as_str().to_string(),
                reason: "parser returned no tree".to_string(),
            })?;

        let tokens = collect_tokens(tree.root_node(), source);
        Ok(render_tokens(source, &tokens))
    }
}

impl Highlighter for TreeSitterHighlighter {
    fn highlight(&self, source: &str, language_id: &str) -> sourcetree_core::Result<String> {
        match SourceLanguage::from_id(language_id) {
            Some(language) => self.highlight_with(source, language),
            None => {
                debug!("no grammar for {:?}, escaping only", language_id);
                Ok(escape_html(source))
            }
        }
    }
}

fn collect_tokens(root: Node<'_>, source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = root.walk();

    loop {
        let node = cursor.node();
        let atomic = node.child_count() == 0 || is_atomic(node.kind());
        if !atomic && cursor.goto_first_child() {
            continue;
        }
        if atomic && node.end_byte() > node.start_byte() {
            tokens.push(Token {
                start: node.start_byte(),
                end: node.end_byte(),
                class: classify(&node, source),
            });
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return tokens;
            }
        }
    }
}

fn is_atomic(kind: &str) -> bool {
    kind.contains("comment") || STRING_KINDS.contains(&kind)
}

fn classify(node: &Node<'_>, source: &str) -> Option<&'static str> {
    let kind = node.kind();
    if kind.contains("comment") {
        return Some("hl-comment");
    }
    if STRING_KINDS.contains(&kind) {
        return Some("hl-string");
    }
    let text = source.get(node.start_byte()..node.end_byte()).unwrap_or_default();
    if CONSTANTS.contains(&text) || kind == "boolean" || kind == "null_literal" {
        return Some("hl-constant");
    }
    if !node.is_named() {
        let word = kind.len() > 1 && kind.chars().all(|c| c.is_ascii_alphabetic() || c == '_');
        return word.then_some("hl-keyword");
    }
    if NUMBER_KINDS.contains(&kind) {
        return Some("hl-number");
    }
    if TYPE_KINDS.contains(&kind) {
        return Some("hl-type");
    }
    if kind.ends_with("identifier") && names_function(node) {
        return Some("hl-function");
    }
    None
}

fn names_function(node: &Node<'_>) -> bool {
    node.parent().is_some_and(|parent| {
        let kind = parent.kind();
        kind.contains("function") || kind.contains("method") || kind.starts_with("call")
    })
}

fn render_tokens(source: &str, tokens: &[Token]) -> String {
    let mut out = String::with_capacity(source.len() * 2);
    let mut pos = 0;
    for token in tokens {
        if token.start < pos || token.end > source.len() {
            continue;
        }
        out.push_str(&escape_html(&source[pos..token.start]));
        let text = escape_html(&source[token.start..token.end]);
        match token.class {
            Some(class) => {
                out.push_str(&format!(r#"<span class="{}">{}</span>"#, class, text));
            }
            None => out.push_str(&text),
        }
        pos = token.end;
    }
    out.push_str(&escape_html(&source[pos..]));
    out
}
