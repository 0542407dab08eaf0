mod config;

use anyhow::{Context, Result};
use config::{parse_args, CliConfig};
use newsgraph_pipeline::util::config as pipeline_config;
use newsgraph_pipeline::util::config::PipelineConfig;
use newsgraph_pipeline::Dashboard;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

fn init_tracing() {
    // stdout carries the figure JSON
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &CliConfig) -> Result<PipelineConfig> {
    let mut cfg = match &cli.config_file {
        Some(path) => pipeline_config::load_from_path(path)?,
        None => pipeline_config::load_or_default(),
    };
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.clone();
    }
    if let Some(dir) = &cli.graph_dir {
        cfg.graph_dir = dir.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = parse_args()?;
    let cfg = load_config(&cli)?;

    tracing::info!(
        view = cli.request.view.as_str(),
        language = %cli.request.language,
        data_dir = %cfg.data_dir.display(),
        graph_dir = %cfg.graph_dir.display(),
        seeded = cli.seed.is_some(),
        "newsgraph starting"
    );

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let dashboard = Dashboard::new(cfg);
    let output = dashboard.run(&cli.request, &mut rng)?;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .context("failed to encode output")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("failed to write output")?;
    Ok(())
}
