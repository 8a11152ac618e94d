//! Default collaborators for page rendering: tree-sitter syntax highlighting
//! and a small Markdown renderer for hover documentation.

pub mod language;
pub mod markdown;
pub mod syntax;

pub use language::SourceLanguage;
pub use markdown::MarkdownRenderer;
pub use syntax::TreeSitterHighlighter;
