use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::domain::{NavState, RunStatus, SampleKey, StepId};
use site_core::{
    Navigation, NavigatorConfig, Sample, SampleLibrary, SandboxConfig, SandboxController,
    SiteClient, TutorialNavigator,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod terminal;

use config::{load_settings, Settings, DEFAULT_CONFIG_FILE};
use terminal::{Stream, TerminalSurface};

#[derive(Parser, Debug)]
#[command(name = "docsite", about = "Walk the tutorial and run sandbox samples against a docs site")]
struct Args {
    /// Site root, overrides the config file and environment.
    #[arg(long)]
    site_url: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Print a JSON summary when done.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the tutorial and step through it.
    Tutorial {
        /// Step ids in tutorial order, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        steps: Vec<String>,
        /// Jump to this step after the first one loads.
        #[arg(long)]
        goto: Option<String>,
        /// Press "next" this many times.
        #[arg(long, default_value_t = 0)]
        advance: usize,
        /// Press "previous" this many times.
        #[arg(long, default_value_t = 0)]
        back: usize,
    },
    /// Submit one program to the sandbox runner.
    Run {
        #[arg(long, conflicts_with = "file")]
        sample: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List the sample library.
    Samples,
}

#[derive(Serialize)]
struct TutorialSummary {
    current: StepId,
    nav: Option<NavState>,
    cached: Vec<StepId>,
    redirected_to: Option<String>,
}

#[derive(Serialize)]
struct RunSummary {
    status: RunStatus,
    source_bytes: usize,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(site_url) = args.site_url {
        settings.site_url = site_url;
    }
    info!(
        "docsite: site={} config={}",
        settings.site_url,
        args.config.display()
    );

    match args.command {
        Command::Tutorial {
            steps,
            goto,
            advance,
            back,
        } => run_tutorial(&settings, steps, goto, advance, back, args.json).await,
        Command::Run { sample, file } => {
            let samples = load_samples(&settings)?;
            run_sandbox(&settings, samples, sample, file, args.json).await
        }
        Command::Samples => {
            list_samples(&load_samples(&settings)?, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_samples(settings: &Settings) -> Result<SampleLibrary> {
    match &settings.samples_file {
        Some(path) => SampleLibrary::load(path)
            .with_context(|| format!("failed to load samples from '{}'", path.display())),
        None => Ok(SampleLibrary::builtin()),
    }
}

fn site_client(settings: &Settings) -> Result<Arc<SiteClient>> {
    Ok(Arc::new(SiteClient::new(
        &settings.site_url,
        settings.request_timeout(),
    )?))
}

async fn settle(navigation: Navigation) -> bool {
    match navigation {
        Navigation::Fetching(fetch) => {
            fetch.finished().await;
            true
        }
        Navigation::Redirected => false,
        Navigation::Rejected => {
            warn!("docsite: step is not part of this tutorial");
            true
        }
        Navigation::Unchanged | Navigation::Rendered => true,
    }
}

/// Drive the navigator through the requested moves. Returns true once the tutorial redirected
/// away, after which no further moves are made.
async fn walk(
    navigator: &Arc<TutorialNavigator>,
    goto: Option<String>,
    advance: usize,
    back: usize,
) -> bool {
    settle(navigator.initialize().await).await;
    if let Some(step) = goto {
        settle(navigator.go_to(step).await).await;
    }
    for _ in 0..advance {
        if !settle(navigator.next().await).await {
            return true;
        }
    }
    for _ in 0..back {
        settle(navigator.previous().await).await;
    }
    false
}

async fn run_tutorial(
    settings: &Settings,
    steps: Vec<String>,
    goto: Option<String>,
    advance: usize,
    back: usize,
    json: bool,
) -> Result<ExitCode> {
    let client = site_client(settings)?;
    let surface = Arc::new(TerminalSurface::console(
        Stream::for_json(json),
        client.site_url().clone(),
    ));
    let navigator = TutorialNavigator::new(
        steps.into_iter().map(StepId::from),
        NavigatorConfig {
            examples_path: settings.examples_path.clone(),
        },
        client,
        surface.clone(),
    )?;

    if walk(&navigator, goto, advance, back).await {
        info!("docsite: left the tutorial");
    }

    if json {
        let summary = TutorialSummary {
            current: navigator.current_step().await,
            nav: navigator.nav_state().await,
            cached: navigator.cached_steps().await,
            redirected_to: surface.redirected_to(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_sandbox(
    settings: &Settings,
    samples: SampleLibrary,
    sample: Option<String>,
    file: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    let client = site_client(settings)?;
    let surface = Arc::new(TerminalSurface::console(
        Stream::for_json(json),
        client.site_url().clone(),
    ));
    let sandbox = SandboxController::new(
        SandboxConfig {
            language_name: settings.language_name.clone(),
        },
        samples,
        client,
        surface,
    );

    if let Some(key) = sample {
        if !sandbox.load_sample(&SampleKey::from(key.as_str())).await {
            bail!("unknown sample '{key}'");
        }
    }
    if let Some(path) = file {
        let source = fs::read_to_string(&path)
            .with_context(|| format!("failed to read source file '{}'", path.display()))?;
        sandbox.edit_source(source).await;
    }

    let status = sandbox.run().await;
    if json {
        let summary = RunSummary {
            status,
            source_bytes: sandbox.source().await.len(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(if status == RunStatus::Success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn list_samples(samples: &SampleLibrary, json: bool) -> Result<()> {
    if json {
        let all: Vec<&Sample> = samples.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }
    for sample in samples.iter() {
        println!(
            "{:<10} {} ({} lines)",
            sample.key.as_str(),
            sample.label,
            sample.source.lines().count()
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
