//! Prisma - follower-gain attribution for LinkedIn creators
//!
//! A CLI tool that classifies scraped LinkedIn posts with a local Ollama
//! model, credits follower growth from the analytics export to the posts
//! that drove it, and writes a performance report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, unresolvable data, I/O, etc.)

mod analysis;
mod attribution;
mod cli;
mod config;
mod error;
mod ingest;
mod llm;
mod loader;
mod models;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use chrono::Local;
use cli::{Args, Command, OutputFormat};
use config::{Config, CONFIG_FILE};
use ingest::IngestOutcome;
use llm::classifier::{classify_file, ClassifyOptions};
use llm::{OllamaBackend, OllamaConfig};
use loader::AnalyticsExport;
use pipeline::{resolve_author, ReportRequest};
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Load configuration; `verbose` in the file affects logging too
    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(config.log_level(args.quiet));

    info!("Prisma v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    debug!("Configuration: {:?}", config);

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .prisma.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to set your data directory, model, attribution window, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Dispatch the subcommand.
async fn run(args: Args, mut config: Config) -> Result<()> {
    match args.command.clone() {
        Command::Ingest { payload } => run_ingest(&config, payload),
        Command::Classify {
            input,
            output,
            delay_ms,
        } => run_classify(&args, &config, input, output, delay_ms).await,
        Command::Report {
            classified,
            followers,
            top_posts,
            window_days,
            format,
            no_synthesis,
            no_charts,
        } => {
            if let Some(days) = window_days {
                config.attribution.window_days = days;
            }
            if no_synthesis {
                config.report.synthesis = false;
            }
            if no_charts {
                config.report.charts = false;
            }
            run_report(&config, classified, followers, top_posts, format).await
        }
        Command::InitConfig => handle_init_config(),
    }
}

/// Append one scraped-post payload to the author's log.
fn run_ingest(config: &Config, payload: Option<PathBuf>) -> Result<()> {
    let raw = match payload {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read payload {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read payload from stdin")?;
            buf
        }
    };

    match ingest::ingest(&raw, &config.general.data_dir)? {
        IngestOutcome::Stored(path) => println!("✅ Stored scraped post in {}", path.display()),
        IngestOutcome::Ignored => println!("ℹ️  Payload is not a scraped post; nothing stored."),
    }
    Ok(())
}

/// Classify every scraped post in the author's log.
async fn run_classify(
    args: &Args,
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    delay_ms: Option<u64>,
) -> Result<()> {
    let data_dir = &config.general.data_dir;
    let author = resolve_author(config.general.author.as_deref(), None, input.as_deref());
    let author = (author != pipeline::UNKNOWN_AUTHOR).then_some(author);

    let input = input.unwrap_or_else(|| ingest::scraped_log_path(data_dir, author.as_deref()));
    let output =
        output.unwrap_or_else(|| ingest::classified_log_path(data_dir, author.as_deref()));

    println!("🤖 Classifying posts...");
    println!("   Input: {}", input.display());
    println!("   Model: {}", config.model.name);
    println!("   Ollama: {}", config.model.ollama_url);

    let backend = OllamaBackend::new(OllamaConfig::from(&config.model))?;
    let options = ClassifyOptions {
        delay: Duration::from_millis(delay_ms.unwrap_or(config.model.rate_limit_delay_ms)),
        show_progress: !args.quiet,
    };

    let start_time = Instant::now();
    let stats = classify_file(&backend, &input, &output, &options).await?;

    println!("\n📊 Classification Summary:");
    println!("   Classified: {}", stats.classified);
    if stats.failed > 0 {
        println!("   ⚠️  Failed (kept with empty classification): {}", stats.failed);
    }
    if stats.skipped > 0 {
        println!("   Skipped (no post text): {}", stats.skipped);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Classified posts saved to: {}", output.display());
    Ok(())
}

/// Attribute follower gains and write the reports.
async fn run_report(
    config: &Config,
    classified: Option<PathBuf>,
    followers: Option<PathBuf>,
    top_posts: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let data_dir = &config.general.data_dir;

    let mut export = match followers {
        Some(path) => AnalyticsExport::from_followers(path),
        None => AnalyticsExport::locate_latest(data_dir)?,
    };
    if top_posts.is_some() {
        export.top_posts = top_posts;
    }
    if export.top_posts.is_none() {
        warn!("No top posts sheet found; posts without a publish date cannot be recovered");
    }

    let author = resolve_author(
        config.general.author.as_deref(),
        Some(&export),
        classified.as_deref(),
    );
    let classified = classified.unwrap_or_else(|| {
        let named = (author != pipeline::UNKNOWN_AUTHOR).then_some(author.as_str());
        ingest::classified_log_path(data_dir, named)
    });

    println!("📥 Loading data for {}", author);
    println!("   Classified posts: {}", classified.display());
    println!("   Followers: {}", export.followers.display());
    if let Some(ref path) = export.top_posts {
        println!("   Top posts: {}", path.display());
    }

    let request = ReportRequest {
        classified,
        export,
        author,
        reports_dir: config.general.reports_dir.clone(),
        window_days: config.attribution.window_days,
        top_posts: config.report.top_posts,
        outliers: config.report.outliers,
        format,
        charts: config.report.charts,
        synthesis: config.report.synthesis,
        generated_at: Local::now().naive_local(),
    };

    if request.synthesis {
        println!("🤖 Winning formula via {} at {}", config.model.name, config.model.ollama_url);
    }

    let backend = OllamaBackend::new(OllamaConfig::from(&config.model))?;
    let start_time = Instant::now();
    let artifacts = pipeline::run_report(&request, &backend).await?;
    let doc = &artifacts.document;

    println!("\n📊 Report Summary:");
    println!(
        "   Posts attributed: {} of {}",
        doc.posts_attributed, doc.posts_total
    );
    if doc.failed_merges > 0 {
        println!("   ⚠️  Posts without a publish date: {}", doc.failed_merges);
    }
    match doc.overall_median {
        Some(median) => println!(
            "   Overall median gain ({} days): {:.2}",
            doc.window_days, median
        ),
        None => println!("   Overall median gain: N/A (no attributed posts)"),
    }
    if artifacts.charts > 0 {
        println!("   Charts: {}", artifacts.charts);
    }
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());

    println!("\n📄 Text report: {}", artifacts.text_path.display());
    println!("📊 Document: {}", artifacts.document_path.display());
    if let Some(ref prompt) = artifacts.prompt_path {
        println!("📝 Synthesis prompt: {}", prompt.display());
    }
    println!("\n✅ Report complete!");
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up, so problems go straight to stderr.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}. Using defaults.", CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
