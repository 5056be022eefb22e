//! brewgen - generate Homebrew formulas from GitHub releases

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use brewgen::{
    default_progress_fn, format_project_list, load_config, select_projects, Downloader, FormulaDir,
    Generator, ReleaseApi,
};

#[derive(Parser)]
#[command(name = "brewgen")]
#[command(author, version, about = "Generate Homebrew formulas from GitHub releases")]
struct Cli {
    /// Path to the projects.yaml config file
    #[arg(short, long, default_value = "projects.yaml")]
    config: PathBuf,

    /// Process only this project (repo, project name or repo name)
    #[arg(short, long)]
    project: Option<String>,

    /// List configured projects and exit
    #[arg(short, long)]
    list: bool,

    /// Print formulas to stdout instead of writing files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Directory to write formula files
    #[arg(short = 'd', long, default_value = "Formula")]
    formula_dir: PathBuf,

    /// GitHub token used as a bearer token for API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// GitHub API root
    #[arg(long, env = "BREWGEN_API_URL", default_value = brewgen::api::DEFAULT_API_URL)]
    api_url: String,

    /// Show debug output
    #[arg(short, long)]
    verbose: bool,
}

async fn run(cli: Cli) -> Result<bool> {
    let projects = load_config(&cli.config)?;

    if cli.list {
        print!("{}", format_project_list(&projects));
        return Ok(true);
    }

    let projects = select_projects(projects, cli.project.as_deref())?;

    let formula_dir = FormulaDir::new(&cli.formula_dir, cli.dry_run);
    formula_dir
        .ensure_exists()
        .context("cannot prepare formula directory")?;

    let mut api = ReleaseApi::new().set_base_url(&cli.api_url);
    if let Some(token) = &cli.token {
        api = api.set_token(token);
    }
    if !api.has_token() {
        tracing::debug!("no GITHUB_TOKEN set, using unauthenticated API requests");
    }

    let downloader = Downloader::new(api.clone()).set_progress(default_progress_fn());
    let summary = Generator::new(api, downloader, formula_dir)
        .run(projects)
        .await;

    Ok(summary.is_success())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
