//! Structural HTML check run over generated pages.

use std::path::{Path, PathBuf};

use crate::error::{Result, SiteError};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed { files: usize },
    Invalid { path: PathBuf, reason: String },
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, CheckOutcome::Passed { .. })
    }
}

/// Check pages in order, stopping at the first invalid one.
pub fn check_pages<P: AsRef<Path>>(pages: &[P]) -> Result<CheckOutcome> {
    for page in pages {
        let path = page.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SiteError::io(path, e))?;
        if let Err(reason) = check_html(&text) {
            return Ok(CheckOutcome::Invalid {
                path: path.to_path_buf(),
                reason,
            });
        }
    }
    Ok(CheckOutcome::Passed { files: pages.len() })
}

/// Balanced and properly nested tags, terminated comments and entities.
pub fn check_html(html: &str) -> std::result::Result<(), String> {
    let mut open: Vec<String> = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];
        let Some(offset) = rest.find(['<', '&']) else {
            break;
        };
        pos += offset;
        let rest = &html[pos..];

        if rest.starts_with('&') {
            pos += entity_end(rest).ok_or_else(|| at(html, pos, "unterminated entity"))?;
            continue;
        }

        if let Some(body) = rest.strip_prefix("<!--") {
            let end = body
                .find("-->")
                .ok_or_else(|| at(html, pos, "unterminated comment"))?;
            pos += 4 + end + 3;
            continue;
        }

        let end = tag_end(rest).ok_or_else(|| at(html, pos, "unterminated tag"))?;
        let tag = &rest[1..end];
        let start = pos;
        pos += end + 1;

        if tag.starts_with('!') || tag.starts_with('?') {
            continue;
        }

        if let Some(closing) = tag.strip_prefix('/') {
            let name = closing.trim().to_ascii_lowercase();
            match open.pop() {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(at(
                        html,
                        start,
                        &format!("</{name}> closes <{expected}>"),
                    ));
                }
                None => return Err(at(html, start, &format!("stray </{name}>"))),
            }
            continue;
        }

        let name = tag_name(tag).ok_or_else(|| at(html, start, "stray '<'"))?;
        if tag.ends_with('/') || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        }
        if RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            let closing = format!("</{name}");
            let skip = html[pos..]
                .to_ascii_lowercase()
                .find(&closing)
                .ok_or_else(|| at(html, start, &format!("<{name}> is never closed")))?;
            pos += skip;
        }
        open.push(name);
    }

    match open.pop() {
        Some(name) => Err(format!("<{name}> is never closed")),
        None => Ok(()),
    }
}

fn tag_name(tag: &str) -> Option<String> {
    let name: String = tag
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    let starts_alpha = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha.then(|| name.to_ascii_lowercase())
}

/// Index of the `>` closing the tag at the start of `rest`, skipping quoted
/// attribute values.
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, c) in rest.char_indices().skip(1) {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(idx),
            (None, '<') => return None,
            _ => {}
        }
    }
    None
}

/// Length of the entity at the start of `rest`, including `&` and `;`.
fn entity_end(rest: &str) -> Option<usize> {
    let body = &rest[1..];
    let len = body
        .char_indices()
        .take(33)
        .find(|&(_, c)| !(c.is_ascii_alphanumeric() || c == '#'))
        .filter(|&(_, c)| c == ';')
        .map(|(idx, _)| idx)?;
    (len > 0).then_some(len + 2)
}

fn at(html: &str, pos: usize, reason: &str) -> String {
    let line = html[..pos].matches('\n').count() + 1;
    format!("line {line}: {reason}")
}
