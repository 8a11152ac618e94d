use tree_sitter::Language;

/// Languages with a bundled grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Rust,
    Java,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Go,
}

impl SourceLanguage {
    /// Map an LSIF `languageId` or a Markdown fence tag.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.trim().to_ascii_lowercase().as_str() {
            "rust" | "rs" => Some(Self::Rust),
            "java" => Some(Self::Java),
            "python" | "py" => Some(Self::Python),
            "javascript" | "javascriptreact" | "js" | "jsx" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "typescriptreact" | "tsx" => Some(Self::Tsx),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "typescriptreact",
            Self::Go => "go",
        }
    }

    pub fn grammar(self) -> Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Self::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Self::Go => tree_sitter_go::LANGUAGE.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id() {
        assert_eq!(SourceLanguage::from_id("go"), Some(SourceLanguage::Go));
        assert_eq!(SourceLanguage::from_id("RS"), Some(SourceLanguage::Rust));
        assert_eq!(
            SourceLanguage::from_id("typescriptreact"),
            Some(SourceLanguage::Tsx)
        );
        assert_eq!(SourceLanguage::from_id("cobol"), None);
    }

    #[test]
    fn test_grammars_load() {
        for lang in [
            SourceLanguage::Rust,
            SourceLanguage::Java,
            SourceLanguage::Python,
            SourceLanguage::JavaScript,
            SourceLanguage::TypeScript,
            SourceLanguage::Tsx,
            SourceLanguage::Go,
        ] {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&lang.grammar()).is_ok(), "{}", lang.as_str());
        }
    }
}
