mod build;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use sourcetree_core::config::{DEFAULT_INPUT, DEFAULT_OUTPUT, default_jobs};

#[derive(Parser)]
#[command(
    name = "sourcetree",
    version,
    about = "Turn an LSIF dump into a static, browsable source site",
    long_about = "Reads a line-delimited LSIF dump and the sources it describes, and writes one \
                  highlighted HTML page per document with hover documentation, go-to-definition \
                  and find-references wired up. The output is plain static files."
)]
pub struct Cli {
    /// LSIF dump to read
    #[arg(long, value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Output directory; removed and recreated on every run
    #[arg(long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Folder copied as the site's _dist assets instead of the bundled ones
    #[arg(long, value_name = "PATH")]
    pub dist: Option<PathBuf>,

    /// JSON object mapping document URI prefixes to output path prefixes
    #[arg(long, value_name = "PATH")]
    pub uri_map: Option<PathBuf>,

    /// Log the duration of every pipeline stage
    #[arg(long)]
    pub bench: bool,

    /// Check the generated pages for well-formed HTML
    #[arg(long)]
    pub check: bool,

    /// Worker threads for rendering and concurrent writes
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
}

pub fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let _guard = sourcetree_runtime::init_logging("cli", true);

    let jobs = cli.jobs.unwrap_or_else(default_jobs);
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(jobs.max(1))
        .enable_all()
        .build()?;

    rt.block_on(build::run(cli, jobs))
}
