//! LSIF element model.
//!
//! Every line of a dump decodes to one [`Element`]: an id plus either a
//! [`Vertex`] or an [`Edge`]. Labels form closed enums, so a dump using a
//! label outside the LSIF vocabulary fails to parse instead of being skipped.

use std::fmt;

use lsp_types::Position;
use serde::{Deserialize, Deserializer, Serialize};
use smol_str::SmolStr;

/// Identifier of a vertex or edge. Dumps use either JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ElementId(SmolStr);

impl ElementId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(SmolStr::new(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// File-name-safe spelling of the id. ASCII letters, digits and `-` are
    /// kept; every other byte becomes `_xx` (lowercase hex), so distinct ids
    /// never share a name and no id can form a path separator or `..`.
    pub fn file_stem(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for byte in self.0.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                out.push(char::from(byte));
            } else {
                out.push_str(&format!("_{byte:02x}"));
            }
        }
        out
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => ElementId(SmolStr::new(n.to_string())),
            RawId::Text(s) => ElementId(SmolStr::new(s)),
        })
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<u64> for ElementId {
    fn from(value: u64) -> Self {
        Self(SmolStr::new(value.to_string()))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Vertex(Vertex),
    Edge(Edge),
}

impl Element {
    pub fn as_vertex(&self) -> Option<&Vertex> {
        match &self.kind {
            ElementKind::Vertex(v) => Some(v),
            ElementKind::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match &self.kind {
            ElementKind::Edge(e) => Some(e),
            ElementKind::Vertex(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "label", rename_all = "camelCase")]
pub enum Vertex {
    MetaData(MetaData),
    #[serde(rename = "$event")]
    Event,
    Source,
    Capabilities,
    Project,
    Document(Document),
    Range(RangeVertex),
    ResultSet,
    Moniker,
    PackageInformation,
    HoverResult(HoverResult),
    DefinitionResult,
    DeclarationResult,
    ReferenceResult,
    ImplementationResult,
    TypeDefinitionResult,
    FoldingRangeResult,
    DocumentLinkResult,
    DocumentSymbolResult,
    DiagnosticResult,
}

impl Vertex {
    /// Label as it appears in the dump, used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Vertex::MetaData(_) => "metaData",
            Vertex::Event => "$event",
            Vertex::Source => "source",
            Vertex::Capabilities => "capabilities",
            Vertex::Project => "project",
            Vertex::Document(_) => "document",
            Vertex::Range(_) => "range",
            Vertex::ResultSet => "resultSet",
            Vertex::Moniker => "moniker",
            Vertex::PackageInformation => "packageInformation",
            Vertex::HoverResult(_) => "hoverResult",
            Vertex::DefinitionResult => "definitionResult",
            Vertex::DeclarationResult => "declarationResult",
            Vertex::ReferenceResult => "referenceResult",
            Vertex::ImplementationResult => "implementationResult",
            Vertex::TypeDefinitionResult => "typeDefinitionResult",
            Vertex::FoldingRangeResult => "foldingRangeResult",
            Vertex::DocumentLinkResult => "documentLinkResult",
            Vertex::DocumentSymbolResult => "documentSymbolResult",
            Vertex::DiagnosticResult => "diagnosticResult",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    pub project_root: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub position_encoding: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub uri: String,
    #[serde(default)]
    pub language_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RangeVertex {
    pub start: Position,
    pub end: Position,
}

impl RangeVertex {
    /// Zero-width ranges mark non-semantic tokens.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HoverResult {
    pub result: HoverPayload,
}

/// Hover contents are kept raw; their shape is checked when rendered.
#[derive(Debug, Clone, Deserialize)]
pub struct HoverPayload {
    pub contents: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum EdgeLabel {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "item")]
    Item,
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "moniker")]
    Moniker,
    #[serde(rename = "nextMoniker")]
    NextMoniker,
    #[serde(rename = "packageInformation")]
    PackageInformation,
    #[serde(rename = "attach")]
    Attach,
    #[serde(rename = "belongsTo")]
    BelongsTo,
    #[serde(rename = "textDocument/hover")]
    Hover,
    #[serde(rename = "textDocument/definition")]
    Definition,
    #[serde(rename = "textDocument/declaration")]
    Declaration,
    #[serde(rename = "textDocument/references")]
    References,
    #[serde(rename = "textDocument/implementation")]
    Implementation,
    #[serde(rename = "textDocument/typeDefinition")]
    TypeDefinition,
    #[serde(rename = "textDocument/foldingRange")]
    FoldingRange,
    #[serde(rename = "textDocument/documentLink")]
    DocumentLink,
    #[serde(rename = "textDocument/documentSymbol")]
    DocumentSymbol,
    #[serde(rename = "textDocument/diagnostic")]
    Diagnostic,
}

/// Discriminator on `item` edges. Anything unknown counts as a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemProperty {
    Definitions,
    Declarations,
    References,
    ReferenceResults,
    ReferenceLinks,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "RawEdge")]
pub struct Edge {
    pub label: EdgeLabel,
    pub out_v: ElementId,
    /// Normalized targets: `inV` becomes a one-element list.
    pub in_vs: Vec<ElementId>,
    pub document: Option<ElementId>,
    pub property: Option<ItemProperty>,
}

impl Edge {
    pub fn first_target(&self) -> Option<&ElementId> {
        self.in_vs.first()
    }
}

#[derive(Deserialize)]
struct RawEdge {
    label: EdgeLabel,
    #[serde(rename = "outV")]
    out_v: ElementId,
    #[serde(rename = "inV", default)]
    in_v: Option<ElementId>,
    #[serde(rename = "inVs", default)]
    in_vs: Option<Vec<ElementId>>,
    #[serde(default)]
    document: Option<ElementId>,
    #[serde(default)]
    property: Option<ItemProperty>,
}

impl TryFrom<RawEdge> for Edge {
    type Error = String;

    fn try_from(raw: RawEdge) -> Result<Self, Self::Error> {
        let in_vs = match (raw.in_v, raw.in_vs) {
            (Some(single), None) => vec![single],
            (None, Some(many)) if !many.is_empty() => many,
            (None, Some(_)) => return Err("edge has an empty inVs list".to_string()),
            (Some(_), Some(_)) => return Err("edge carries both inV and inVs".to_string()),
            (None, None) => return Err("edge has neither inV nor inVs".to_string()),
        };
        Ok(Edge {
            label: raw.label,
            out_v: raw.out_v,
            in_vs,
            document: raw.document,
            property: raw.property,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Element {
        serde_json::from_str(line).expect("element should parse")
    }

    #[test]
    fn test_file_stem_cannot_leave_a_directory() {
        assert_eq!(ElementId::from(42).file_stem(), "42");
        assert_eq!(ElementId::from("ab-C").file_stem(), "ab-C");
        assert_eq!(
            ElementId::from("../../x").file_stem(),
            "_2e_2e_2f_2e_2e_2fx"
        );
        assert_ne!(
            ElementId::from("a_2f").file_stem(),
            ElementId::from("a/").file_stem()
        );
    }

    #[test]
    fn test_numeric_and_string_ids() {
        let a = parse(r#"{"id":7,"type":"vertex","label":"resultSet"}"#);
        let b = parse(r#"{"id":"7","type":"vertex","label":"resultSet"}"#);
        assert_eq!(a.id, b.id);
        assert_eq!(a.id.as_str(), "7");
    }

    #[test]
    fn test_range_vertex_ignores_tag_payload() {
        let el = parse(
            r#"{"id":3,"type":"vertex","label":"range","start":{"line":1,"character":4},"end":{"line":1,"character":9},"tag":{"type":"definition","text":"main"}}"#,
        );
        match el.as_vertex() {
            Some(Vertex::Range(r)) => {
                assert_eq!(r.start, Position::new(1, 4));
                assert!(!r.is_empty());
            }
            other => panic!("expected range, got {:?}", other),
        }
    }

    #[test]
    fn test_single_and_multi_target_edges_normalize() {
        let single = parse(r#"{"id":10,"type":"edge","label":"next","outV":3,"inV":4}"#);
        let many = parse(r#"{"id":11,"type":"edge","label":"contains","outV":2,"inVs":[3,5]}"#);
        assert_eq!(single.as_edge().unwrap().in_vs, vec![ElementId::from(4)]);
        assert_eq!(many.as_edge().unwrap().in_vs.len(), 2);
    }

    #[test]
    fn test_item_property_unknown_is_other() {
        let el = parse(
            r#"{"id":12,"type":"edge","label":"item","outV":8,"inVs":[3],"document":2,"property":"somethingNew"}"#,
        );
        assert_eq!(el.as_edge().unwrap().property, Some(ItemProperty::Other));
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        let res = serde_json::from_str::<Element>(r#"{"id":1,"type":"vertex","label":"mystery"}"#);
        assert!(res.is_err());
        let res = serde_json::from_str::<Element>(
            r#"{"id":2,"type":"edge","label":"textDocument/mystery","outV":1,"inV":3}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_edge_without_targets_is_rejected() {
        let res = serde_json::from_str::<Element>(r#"{"id":2,"type":"edge","label":"next","outV":1}"#);
        assert!(res.is_err());
    }
}
