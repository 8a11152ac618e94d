//! Per-page hover sidecar (`<page>.hover.json`).
//!
//! Entries reference payloads by id so that a hover shared by many ranges is
//! stored once per page.

use indexmap::IndexMap;
use serde::Serialize;

use crate::lsif::ElementId;
use crate::semantic::ResolvedOccurrence;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HoverEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// File stem of the shared reference file under `_data/refs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<String>,
}

#[derive(Debug, Default, Serialize)]
pub struct HoverSidecar {
    /// Keyed `x<rangeId>`.
    pub hovers: IndexMap<String, HoverEntry>,
    /// Rendered hover HTML or definition URL, keyed by result id.
    pub data: IndexMap<String, String>,
}

impl HoverSidecar {
    pub fn from_occurrences(occurrences: &[ResolvedOccurrence]) -> Self {
        let mut sidecar = Self::default();
        for occ in occurrences {
            let mut entry = HoverEntry::default();

            if let Some((id, html)) = &occ.hover {
                let key = id.to_string();
                sidecar
                    .data
                    .entry(key.clone())
                    .or_insert_with(|| html.to_string());
                entry.content = Some(key);
            }
            if let Some((id, location)) = &occ.definition {
                let key = id.to_string();
                sidecar
                    .data
                    .entry(key.clone())
                    .or_insert_with(|| location.url.clone());
                entry.definition = Some(key);
            }
            entry.references = occ.references.as_ref().map(ElementId::file_stem);

            sidecar.hovers.insert(format!("x{}", occ.range_id), entry);
        }
        sidecar
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
