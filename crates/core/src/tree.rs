//! Navigation tree built from the documents' output-relative paths.

use thiserror::Error;

use crate::render::escape_html;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TreeError {
    #[error("{path} is used both as a file and as a folder")]
    Conflict { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File { name: String },
    Folder { name: String, children: Vec<TreeNode> },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name } | TreeNode::Folder { name, .. } => name,
        }
    }
}

/// Build a folder/file tree from slash-separated paths, keeping input order.
pub fn build_tree<S: AsRef<str>>(paths: &[S]) -> Result<Vec<TreeNode>, TreeError> {
    let mut roots = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let Some((file, folders)) = segments.split_last() else {
            continue;
        };

        let mut level = &mut roots;
        for (depth, segment) in folders.iter().enumerate() {
            level = folder_children(level, segment, &segments[..=depth])?;
        }

        match level.iter().find(|n| n.name() == *file) {
            Some(TreeNode::File { .. }) => {}
            Some(TreeNode::Folder { .. }) => {
                return Err(TreeError::Conflict {
                    path: path.to_string(),
                });
            }
            None => level.push(TreeNode::File {
                name: file.to_string(),
            }),
        }
    }
    Ok(roots)
}

fn folder_children<'t>(
    level: &'t mut Vec<TreeNode>,
    name: &str,
    prefix: &[&str],
) -> Result<&'t mut Vec<TreeNode>, TreeError> {
    let idx = match level.iter().position(|n| n.name() == name) {
        Some(idx) => idx,
        None => {
            level.push(TreeNode::Folder {
                name: name.to_string(),
                children: Vec::new(),
            });
            level.len() - 1
        }
    };
    match &mut level[idx] {
        TreeNode::Folder { children, .. } => Ok(children),
        TreeNode::File { .. } => Err(TreeError::Conflict {
            path: prefix.join("/"),
        }),
    }
}

/// Render the tree as nested lists for a page at `current`.
///
/// Links are relative to the page's folder; `None` renders for the output
/// root (the welcome page).
pub fn render_tree(tree: &[TreeNode], current: Option<&str>) -> String {
    let prefix = current.map(crate::paths::root_prefix).unwrap_or_default();
    let mut out = String::from("<ul>");
    render_level(tree, "", &prefix, current, &mut out);
    out.push_str("</ul>");
    out
}

fn render_level(
    nodes: &[TreeNode],
    dir: &str,
    prefix: &str,
    current: Option<&str>,
    out: &mut String,
) {
    for node in nodes {
        let path = if dir.is_empty() {
            node.name().to_string()
        } else {
            format!("{}/{}", dir, node.name())
        };
        let name = escape_html(node.name());
        match node {
            TreeNode::File { .. } => {
                let class = if current == Some(path.as_str()) {
                    r#" class="current-file""#
                } else {
                    ""
                };
                out.push_str(&format!(
                    r#"<li{}><a href="{}{}.html">{}</a></li>"#,
                    class,
                    prefix,
                    escape_html(&path),
                    name
                ));
            }
            TreeNode::Folder { children, .. } => {
                out.push_str(&format!(r#"<li class="folder"><span>{}</span><ul>"#, name));
                render_level(children, &path, prefix, current, out);
                out.push_str("</ul></li>");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Depth-first list of file paths in the tree.
    fn leaves(tree: &[TreeNode]) -> Vec<String> {
        fn walk(nodes: &[TreeNode], prefix: &str, out: &mut Vec<String>) {
            for node in nodes {
                let path = if prefix.is_empty() {
                    node.name().to_string()
                } else {
                    format!("{}/{}", prefix, node.name())
                };
                match node {
                    TreeNode::File { .. } => out.push(path),
                    TreeNode::Folder { children, .. } => walk(children, &path, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(tree, "", &mut out);
        out
    }

    #[test]
    fn test_builds_nested_folders() {
        let tree = build_tree(&["a/b.go", "a/c.go", "d.go"]).unwrap();
        assert_eq!(
            tree,
            vec![
                TreeNode::Folder {
                    name: "a".to_string(),
                    children: vec![
                        TreeNode::File { name: "b.go".to_string() },
                        TreeNode::File { name: "c.go".to_string() },
                    ],
                },
                TreeNode::File { name: "d.go".to_string() },
            ]
        );
    }

    #[test]
    fn test_leaves_round_trip() {
        let paths = ["x/y/z.rs", "x/a.rs", "b.rs", "x/y/w.rs"];
        let tree = build_tree(&paths).unwrap();
        let mut got = leaves(&tree);
        let mut want: Vec<String> = paths.iter().map(|s| s.to_string()).collect();
        got.sort();
        want.sort();
        assert_eq!(got, want);
    }

    #[test]
    fn test_file_then_folder_conflicts() {
        assert_eq!(
            build_tree(&["x", "x/y"]),
            Err(TreeError::Conflict { path: "x".to_string() })
        );
    }

    #[test]
    fn test_folder_then_file_conflicts() {
        assert_eq!(
            build_tree(&["x/y", "x"]),
            Err(TreeError::Conflict { path: "x".to_string() })
        );
    }

    #[test]
    fn test_render_marks_current_file() {
        let tree = build_tree(&["a/b.go", "d.go"]).unwrap();
        let html = render_tree(&tree, Some("a/b.go"));
        assert_eq!(
            html,
            concat!(
                r#"<ul><li class="folder"><span>a</span><ul>"#,
                r#"<li class="current-file"><a href="../a/b.go.html">b.go</a></li></ul></li>"#,
                r#"<li><a href="../d.go.html">d.go</a></li></ul>"#
            )
        );
    }

    #[test]
    fn test_render_for_root() {
        let tree = build_tree(&["d.go"]).unwrap();
        assert_eq!(render_tree(&tree, None), r#"<ul><li><a href="d.go.html">d.go</a></li></ul>"#);
    }
}
