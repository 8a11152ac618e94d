use std::sync::Arc;

use sourcetree_core::SiteBuilder;
use sourcetree_highlight::{MarkdownRenderer, TreeSitterHighlighter};

/// Assembles a site builder with the bundled collaborators: tree-sitter
/// highlighting for source pages and Markdown hovers whose code blocks use
/// the same highlighter.
pub fn build_default_site() -> SiteBuilder {
    let highlighter = Arc::new(TreeSitterHighlighter::new());
    let renderer = Arc::new(MarkdownRenderer::new(highlighter.clone()));
    tracing::debug!("site builder ready with tree-sitter highlighting");
    SiteBuilder::new(highlighter, renderer)
}

/// Initializes the logging system for a specific component.
/// This delegates to the core logging module.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<impl Drop> {
    Some(sourcetree_core::logging::init_logging(component, to_stderr))
}
