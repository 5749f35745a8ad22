//! CareDash - caretaker conversation dashboard
//!
//! A CLI that fetches caretakers, conversations and flags from the
//! monitoring backend and renders the dashboard, a caretaker's page or a
//! conversation's page.
//!
//! Exit codes:
//!   0 - Page loaded
//!   1 - Runtime error (bad arguments, config, client setup)
//!   2 - Page rendered in its error state
//!   130 - Interrupted while loading

mod analysis;
mod api;
mod cli;
mod config;
mod error;
mod models;
mod report;
mod routes;
mod views;

use anyhow::{Context, Result};
use api::{HttpRecordSource, RecordSource};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use routes::Route;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use views::PageState;

/// A page rendered in the requested format.
struct RenderedPage {
    body: String,
    is_error: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Config is read before logging starts so `[general] verbose` applies.
    let (mut config, origin) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config)?;

    info!("CareDash v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    origin.log();

    match run(args, config).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("CareDash failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .caredash.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE);
    println!("   Edit it to point at your backend and tune the summary window.");
    Ok(())
}

/// Initialize logging. RUST_LOG wins over the verbosity flags when set.
/// Logs go to stderr so stdout carries only the page.
fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::new(args.log_level(config.general.verbose).to_string()),
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load the selected page and write it out. Returns the exit code.
async fn run(args: Args, config: Config) -> Result<i32> {
    config.validate().map_err(anyhow::Error::msg)?;

    let route = args.target().map_err(anyhow::Error::msg)?;
    let source = HttpRecordSource::new(&config.api_config())?;
    info!("Backend: {}", source.base_url());

    let spinner = loading_spinner(args.quiet);

    // Ctrl-C abandons the in-flight requests; nothing is rendered.
    let rendered = tokio::select! {
        rendered = load_page(&route, &source, &config) => rendered?,
        _ = tokio::signal::ctrl_c() => {
            spinner.finish_and_clear();
            warn!("Interrupted while loading {}, discarding results", route);
            return Ok(130);
        }
    };
    spinner.finish_and_clear();

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &rendered.body)
                .with_context(|| format!("Failed to write page to {}", path.display()))?;
            info!("Page saved to {}", path.display());
        }
        None => println!("{}", rendered.body),
    }

    Ok(if rendered.is_error { 2 } else { 0 })
}

/// Assemble and render the page behind a route.
async fn load_page(
    route: &Route,
    source: &dyn RecordSource,
    config: &Config,
) -> Result<RenderedPage> {
    let format = config.general.format;

    match route {
        Route::Dashboard => {
            let now = Utc::now();
            let state = match config.dashboard.custom_window() {
                Some(window) => views::assemble_dashboard_within(source, now, window).await,
                None => views::assemble_dashboard(source, now).await,
            };
            render(&state, format, report::generate_dashboard_markdown)
        }
        Route::Person(name) => {
            let state = views::assemble_person(source, name).await;
            render(&state, format, report::generate_person_markdown)
        }
        Route::Conversation(id) => {
            let state = views::assemble_conversation(source, id).await;
            render(&state, format, report::generate_conversation_markdown)
        }
    }
}

fn render<T: Serialize>(
    state: &PageState<T>,
    format: OutputFormat,
    markdown: impl Fn(&T) -> String,
) -> Result<RenderedPage> {
    let body = match format {
        OutputFormat::Json => report::generate_json(state)?,
        OutputFormat::Markdown => report::generate_markdown(state, markdown),
    };

    Ok(RenderedPage {
        body,
        is_error: state.is_error(),
    })
}

/// Static loading placeholder on stderr; hidden in quiet mode.
fn loading_spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(report::LOADING_TEXT);
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));
    spinner
}

/// Where the configuration came from; logged once logging is up.
enum ConfigOrigin {
    Explicit(PathBuf),
    DefaultFile,
    Missing,
    Invalid(String),
}

impl ConfigOrigin {
    fn log(&self) {
        match self {
            ConfigOrigin::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigOrigin::DefaultFile => info!("Loaded default config from {}", config::CONFIG_FILE),
            ConfigOrigin::Missing => debug!("No config file found, using defaults"),
            ConfigOrigin::Invalid(e) => warn!("Failed to load config: {}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigOrigin)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigOrigin::Explicit(config_path.clone())));
    }

    // Try default location
    Ok(match Config::load_default() {
        Ok(Some(config)) => (config, ConfigOrigin::DefaultFile),
        Ok(None) => (Config::default(), ConfigOrigin::Missing),
        Err(e) => (Config::default(), ConfigOrigin::Invalid(format!("{:#}", e))),
    })
}
