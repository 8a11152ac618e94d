//! Site generation pipeline.
//!
//! Stages, in order:
//! 1. read and index the dump
//! 2. plan documents (output paths, navigation tree)
//! 3. load sources and render every page on a bounded rayon pool
//! 4. clean the output directory and write everything through one join point
//! 5. optionally check the written pages

pub mod bench;
pub mod check;
pub mod sidecar;
pub mod writer;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub use bench::Stage;
pub use check::{CheckOutcome, check_html, check_pages};
pub use sidecar::{HoverEntry, HoverSidecar};
pub use writer::{OutputFile, clean_output, write_all};

use crate::annotate::merge;
use crate::config::SiteConfig;
use crate::error::{Result, SiteError};
use crate::lsif::{ElementId, IndexedGraph, MetaData};
use crate::paths::{PathMapper, file_name, root_prefix, source_path};
use crate::render::templates::{
    ASSET_DIR, SourcePage, default_assets, render_source_page, render_welcome_page,
};
use crate::render::{Highlighter, MarkupRenderer};
use crate::semantic::{HoverTable, Locator, ReferenceSets, SemanticExtractor};
use crate::source::{SourceMap, SourceText};
use crate::tree::{TreeNode, build_tree, render_tree};

/// Folder under the output root holding shared reference files.
pub const REFS_DIR: &str = "_data/refs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Pages generated.
    pub documents: usize,
    /// Documents left out because they map to no output path.
    pub skipped: usize,
    pub annotated_ranges: usize,
    pub reference_sets: usize,
    /// Present when the run asked for a check.
    pub check: Option<CheckOutcome>,
}

#[derive(Debug, Clone)]
struct PlannedDocument {
    id: ElementId,
    relative: String,
    source_path: PathBuf,
    language_id: String,
}

struct RenderedPage {
    relative: String,
    html: String,
    sidecar: String,
    annotated: usize,
}

struct RenderedSite {
    pages: Vec<RenderedPage>,
    welcome: String,
    refs: Vec<(ElementId, String)>,
}

pub struct SiteBuilder {
    highlighter: Arc<dyn Highlighter>,
    renderer: Arc<dyn MarkupRenderer>,
}

impl SiteBuilder {
    pub fn new(highlighter: Arc<dyn Highlighter>, renderer: Arc<dyn MarkupRenderer>) -> Self {
        Self {
            highlighter,
            renderer,
        }
    }

    pub async fn build(&self, config: &SiteConfig) -> Result<BuildReport> {
        let stage = Stage::start(config.bench, "read dump");
        let text = tokio::fs::read_to_string(&config.input)
            .await
            .map_err(|e| SiteError::io(&config.input, e))?;
        stage.end();

        let stage = Stage::start(config.bench, "index graph");
        let graph = tokio::task::spawn_blocking(move || IndexedGraph::parse(&text))
            .await
            .map_err(|e| SiteError::Task(e.to_string()))??;
        info!(
            "Indexed {} elements ({} edges), project root {}",
            graph.len(),
            graph.edge_count(),
            graph.project_root()
        );
        let meta = graph.meta_data();
        if let Some(version) = &meta.version {
            debug!("LSIF format version {}", version);
        }
        if let Some(message) = encoding_warning(meta) {
            warn!("{}", message);
        }
        stage.end();

        let stage = Stage::start(config.bench, "plan documents");
        let paths = PathMapper::new(graph.project_root(), config.uri_map.clone());
        let (planned, skipped) = plan_documents(&graph, &paths)?;
        let relatives: Vec<&str> = planned.iter().map(|d| d.relative.as_str()).collect();
        let tree = build_tree(&relatives)?;
        info!("Planned {} documents, skipped {}", planned.len(), skipped);
        stage.end();

        let highlighter = Arc::clone(&self.highlighter);
        let renderer = Arc::clone(&self.renderer);
        let jobs = config.jobs;
        let bench = config.bench;
        let site = tokio::task::spawn_blocking(move || {
            render_site(
                &graph,
                &paths,
                &planned,
                &tree,
                highlighter.as_ref(),
                renderer.as_ref(),
                jobs,
                bench,
            )
        })
        .await
        .map_err(|e| SiteError::Task(e.to_string()))??;

        let stage = Stage::start(config.bench, "write output");
        clean_output(&config.output).await?;
        let assets = match &config.dist {
            Some(dist) => {
                let dist = dist.clone();
                let target = config.output.join(ASSET_DIR);
                tokio::task::spawn_blocking(move || dist_files(&dist, &target))
                    .await
                    .map_err(|e| SiteError::Task(e.to_string()))??
            }
            None => default_assets()
                .into_iter()
                .map(|(name, contents)| {
                    OutputFile::new(config.output.join(ASSET_DIR).join(name), contents)
                })
                .collect(),
        };

        let report = BuildReport {
            documents: site.pages.len(),
            skipped,
            annotated_ranges: site.pages.iter().map(|p| p.annotated).sum(),
            reference_sets: site.refs.len(),
            check: None,
        };
        let page_paths: Vec<PathBuf> = std::iter::once(config.output.join("index.html"))
            .chain(site.pages.iter().map(|p| page_path(&config.output, &p.relative)))
            .collect();

        let files = output_files(&config.output, site, assets);
        let written = write_all(files, config.jobs).await?;
        info!("Wrote {} files to {}", written, config.output.display());
        stage.end();

        let check = if config.check {
            let stage = Stage::start(config.bench, "check");
            let outcome = tokio::task::spawn_blocking(move || check_pages(&page_paths))
                .await
                .map_err(|e| SiteError::Task(e.to_string()))??;
            stage.end();
            Some(outcome)
        } else {
            None
        };

        let report = BuildReport { check, ..report };
        info!(
            "Generated {} pages ({} skipped), {} annotated ranges, {} reference sets",
            report.documents, report.skipped, report.annotated_ranges, report.reference_sets
        );
        Ok(report)
    }
}

/// Output paths for every mappable document, sorted by path. Returns the
/// plan and the number of documents left out.
fn plan_documents(
    graph: &IndexedGraph,
    paths: &PathMapper,
) -> Result<(Vec<PlannedDocument>, usize)> {
    let mut planned = Vec::new();
    let mut seen = HashSet::new();
    let mut skipped = 0;

    for (id, doc) in graph.documents() {
        let Some(relative) = paths.relative(&doc.uri) else {
            warn!(
                "Skipping {}: outside the project root and uri map, or not a plain relative path",
                doc.uri
            );
            skipped += 1;
            continue;
        };
        if !seen.insert(relative.clone()) {
            warn!("Skipping {}: {} is already generated", doc.uri, relative);
            skipped += 1;
            continue;
        }
        planned.push(PlannedDocument {
            id: id.clone(),
            relative,
            source_path: source_path(&doc.uri)?,
            language_id: doc.language_id.clone(),
        });
    }

    planned.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok((planned, skipped))
}

#[allow(clippy::too_many_arguments)]
fn render_site(
    graph: &IndexedGraph,
    paths: &PathMapper,
    planned: &[PlannedDocument],
    tree: &[TreeNode],
    highlighter: &dyn Highlighter,
    renderer: &dyn MarkupRenderer,
    jobs: usize,
    bench: bool,
) -> Result<RenderedSite> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .map_err(|e| SiteError::Task(e.to_string()))?;

    pool.install(|| {
        let stage = Stage::start(bench, "load sources");
        let sources: SourceMap = planned
            .par_iter()
            .map(|doc| SourceText::read(&doc.source_path).map(|text| (doc.id.clone(), text)))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .collect();
        stage.end();

        let stage = Stage::start(bench, "render pages");
        let locator = Locator::new(graph, paths, &sources);
        let hovers = HoverTable::new();
        let references = ReferenceSets::new();
        let pages = planned
            .par_iter()
            .map(|doc| {
                let extractor =
                    SemanticExtractor::new(graph, &locator, renderer, &hovers, &references);
                render_page(doc, &extractor, &sources, tree, highlighter)
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("Rendered {} distinct hovers", hovers.len());
        stage.end();

        let refs = references
            .resolved()
            .into_iter()
            .map(|(id, set)| -> Result<(ElementId, String)> {
                Ok((id, serde_json::to_string(set.as_ref())?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RenderedSite {
            pages,
            welcome: render_welcome_page(&render_tree(tree, None)),
            refs,
        })
    })
}

fn render_page(
    doc: &PlannedDocument,
    extractor: &SemanticExtractor<'_>,
    sources: &SourceMap,
    tree: &[TreeNode],
    highlighter: &dyn Highlighter,
) -> Result<RenderedPage> {
    let source = sources
        .get(&doc.id)
        .ok_or_else(|| SiteError::Task(format!("source of {} was not loaded", doc.relative)))?;

    let semantics = extractor.extract(&doc.id)?;
    let highlighted = highlighter.highlight(source.text(), &doc.language_id)?;
    let annotated = merge(&highlighted, &semantics.insertions);

    let root_path = root_prefix(&doc.relative);
    let tree_html = render_tree(tree, Some(doc.relative.as_str()));
    let html = render_source_page(&SourcePage {
        filename: file_name(&doc.relative),
        root_path: &root_path,
        tree_html: &tree_html,
        source_html: &annotated,
        line_count: source.line_count(),
    });
    let sidecar = HoverSidecar::from_occurrences(&semantics.occurrences).to_json()?;
    debug!(
        "Rendered {} with {} annotated ranges",
        doc.relative,
        semantics.occurrences.len()
    );

    Ok(RenderedPage {
        relative: doc.relative.clone(),
        html,
        sidecar,
        annotated: semantics.occurrences.len(),
    })
}

/// Columns are read as UTF-16 code units; any other declared encoding is reported.
fn encoding_warning(meta: &MetaData) -> Option<String> {
    match meta.position_encoding.as_deref() {
        None => None,
        Some(encoding) if encoding.eq_ignore_ascii_case("utf-16") => None,
        Some(encoding) => Some(format!(
            "Dump declares position encoding {encoding}; columns are read as UTF-16"
        )),
    }
}

fn page_path(output: &Path, relative: &str) -> PathBuf {
    output.join(format!("{relative}.html"))
}

fn output_files(output: &Path, site: RenderedSite, assets: Vec<OutputFile>) -> Vec<OutputFile> {
    let mut files = vec![
        OutputFile::new(output.join("index.html"), site.welcome),
        OutputFile::new(output.join(".nojekyll"), Vec::<u8>::new()),
    ];
    files.extend(assets);
    for page in site.pages {
        files.push(OutputFile::new(
            output.join(format!("{}.hover.json", page.relative)),
            page.sidecar,
        ));
        files.push(OutputFile::new(page_path(output, &page.relative), page.html));
    }
    let refs_dir = output.join(REFS_DIR);
    for (id, json) in site.refs {
        files.push(OutputFile::new(
            refs_dir.join(format!("{}.json", id.file_stem())),
            json,
        ));
    }
    files
}

/// Files of a user-supplied asset folder, retargeted under `target`.
fn dist_files(dist: &Path, target: &Path) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dist) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dist).to_path_buf();
            SiteError::io(path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dist) else {
            continue;
        };
        let contents = std::fs::read(entry.path()).map_err(|e| SiteError::io(entry.path(), e))?;
        files.push(OutputFile::new(target.join(relative), contents));
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_files_stay_under_output() {
        let output = Path::new("/site/out");
        let site = RenderedSite {
            pages: Vec::new(),
            welcome: String::new(),
            refs: vec![
                (ElementId::from("../../../escaped"), "{}".to_string()),
                (ElementId::from(17), "{}".to_string()),
            ],
        };
        let files = output_files(output, site, Vec::new());
        let refs_dir = output.join(REFS_DIR);
        let refs: Vec<_> = files
            .iter()
            .filter(|f| f.path.starts_with(&refs_dir))
            .map(|f| f.path.clone())
            .collect();

        assert_eq!(refs.len(), 2);
        for path in &refs {
            assert_eq!(path.parent(), Some(refs_dir.as_path()));
        }
        assert_eq!(refs[1], refs_dir.join("17.json"));
    }

    #[test]
    fn test_non_utf16_encoding_is_reported() {
        let meta = |encoding: Option<&str>| MetaData {
            project_root: "file:///p/".to_string(),
            version: Some("0.6.0".to_string()),
            position_encoding: encoding.map(str::to_string),
        };

        assert_eq!(encoding_warning(&meta(None)), None);
        assert_eq!(encoding_warning(&meta(Some("utf-16"))), None);
        let warning = encoding_warning(&meta(Some("utf-8"))).unwrap();
        assert!(warning.contains("utf-8"));
    }
}
