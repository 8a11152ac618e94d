use std::process::ExitCode;
use std::time::Instant;

use sourcetree_core::{CheckOutcome, SiteConfig, UriMap};
use tracing::{error, info};

use crate::Cli;

pub async fn run(cli: Cli, jobs: usize) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let started = Instant::now();

    let uri_map = match &cli.uri_map {
        Some(path) => UriMap::load(path)?,
        None => UriMap::default(),
    };
    let config = SiteConfig {
        input: cli.input,
        output: cli.output,
        dist: cli.dist,
        uri_map,
        bench: cli.bench,
        check: cli.check,
        jobs,
    };

    info!("Building site from {} into {}", config.input.display(), config.output.display());
    let builder = sourcetree_runtime::build_default_site();
    let report = builder.build(&config).await?;

    let status = match &report.check {
        Some(CheckOutcome::Invalid { path, reason }) => {
            error!("{} is not well-formed: {}", path.display(), reason);
            ExitCode::from(2)
        }
        Some(CheckOutcome::Passed { files }) => {
            info!("Checked {} pages", files);
            ExitCode::SUCCESS
        }
        None => ExitCode::SUCCESS,
    };

    info!(
        "Finished building sourcetree for {} documents in {:.2} seconds",
        report.documents,
        started.elapsed().as_secs_f64()
    );
    Ok(status)
}
