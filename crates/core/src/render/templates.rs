//! Page templates and client assets.
//!
//! Files are embedded at compile time using `include_str!` and filled by
//! placeholder substitution:
//! - `templates/source.html` - one page per source document
//! - `templates/welcome.html` - the site's `index.html`
//! - `templates/main.js`, `templates/style.css` - the default `_dist` folder

use super::escape_html;

const SOURCE_TEMPLATE: &str = include_str!("templates/source.html");
const WELCOME_TEMPLATE: &str = include_str!("templates/welcome.html");
const SCRIPT: &str = include_str!("templates/main.js");
const STYLES: &str = include_str!("templates/style.css");

/// Name of the static asset folder at the output root.
pub const ASSET_DIR: &str = "_dist";

pub struct SourcePage<'a> {
    pub filename: &'a str,
    /// Prefix from the page to the output root, e.g. `../../`.
    pub root_path: &'a str,
    pub tree_html: &'a str,
    pub source_html: &'a str,
    pub line_count: usize,
}

pub fn render_source_page(page: &SourcePage<'_>) -> String {
    let asset_path = format!("{}{}/", page.root_path, ASSET_DIR);
    fill(
        SOURCE_TEMPLATE,
        &[
            ("FILENAME", &escape_html(page.filename)),
            ("ASSET_PATH", &asset_path),
            ("ROOT_PATH", page.root_path),
            ("TREE", page.tree_html),
            ("LINE_NUMBERS", &line_numbers(page.line_count)),
            ("SOURCE", page.source_html),
        ],
    )
}

pub fn render_welcome_page(tree_html: &str) -> String {
    fill(
        WELCOME_TEMPLATE,
        &[("ASSET_PATH", &format!("./{}/", ASSET_DIR)), ("TREE", tree_html)],
    )
}

/// Substitutes `{{KEY}}` placeholders in one pass over the template.
/// Substituted values are never scanned again; unknown keys are kept as is.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value, end))
        });
        match value {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Embedded files of the default asset folder.
pub fn default_assets() -> [(&'static str, &'static str); 2] {
    [("main.js", SCRIPT), ("style.css", STYLES)]
}

fn line_numbers(count: usize) -> String {
    let mut out = String::new();
    for n in 1..=count.max(1) {
        out.push_str(&format!("<span id=\"L{n}\" data-line=\"{n}\">{n}</span>\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_page_substitutes_everything() {
        let html = render_source_page(&SourcePage {
            filename: "a<b>.go",
            root_path: "../",
            tree_html: "<ul></ul>",
            source_html: "<span id=\"lsif3\">x</span>",
            line_count: 2,
        });
        assert!(!html.contains("{{"));
        assert!(html.contains("a&lt;b&gt;.go"));
        assert!(html.contains("../_dist/style.css"));
        assert!(html.contains("<span id=\"L2\" data-line=\"2\">2</span>"));
        assert!(html.contains("<span id=\"lsif3\">x</span>"));
    }

    #[test]
    fn test_placeholders_inside_values_stay_literal() {
        let html = render_source_page(&SourcePage {
            filename: "{{SOURCE}}.go",
            root_path: "",
            tree_html: "<li>{{LINE_NUMBERS}}</li>",
            source_html: "BODY",
            line_count: 1,
        });
        assert!(html.contains("{{SOURCE}}.go"));
        assert!(html.contains("<li>{{LINE_NUMBERS}}</li>"));
        assert_eq!(html.matches("BODY").count(), 1);
    }

    #[test]
    fn test_fill_keeps_unknown_keys() {
        let out = fill("{{A}} {{B}} {{ {{A}}", &[("A", "x{{A}}")]);
        assert_eq!(out, "x{{A}} {{B}} {{ x{{A}}");
    }

    #[test]
    fn test_welcome_page() {
        let html = render_welcome_page("<ul><li>x</li></ul>");
        assert!(!html.contains("{{"));
        assert!(html.contains("./_dist/style.css"));
    }
}
