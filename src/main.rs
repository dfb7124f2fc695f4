use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pubmed_industry_filter::config::{find_config_file, load_config, BackendKind, Config};
use pubmed_industry_filter::report::{self, ReportFormat};
use pubmed_industry_filter::{
    build_backend, AffiliationClassifier, ArticleFilter, ArticleQuery, ArticleSource,
    PubMedSource,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch PubMed papers and list those with pharma/biotech (non-academic) authors
#[derive(Parser, Debug)]
#[command(name = "get-papers-list")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fetch PubMed papers and list those with pharma/biotech authors", long_about = None)]
struct Cli {
    /// PubMed search query
    #[arg(required_unless_present = "show_config")]
    query: Option<String>,

    /// Write results to this CSV file instead of printing them
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short)]
    debug: bool,

    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format when printing to the terminal
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classifier backend for affiliations the keyword rules cannot decide
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Classifier request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Maximum concurrent classifier requests
    #[arg(long)]
    concurrency: Option<usize>,

    /// Maximum number of PubMed results to fetch
    #[arg(long, short = 'n')]
    max_results: Option<usize>,

    /// Print the effective configuration and exit
    #[arg(long)]
    show_config: bool,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
    /// CSV on stdout
    Csv,
}

/// Available classifier backends
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Local Ollama server
    #[value(name = "ollama")]
    Ollama,
    /// OpenAI chat completions
    #[value(name = "openai")]
    OpenAi,
    /// Hugging Face zero-shot classification
    #[value(name = "huggingface")]
    HuggingFace,
    /// Keyword rules only
    #[value(name = "none")]
    None,
}

impl From<Backend> for BackendKind {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Ollama => BackendKind::Ollama,
            Backend::OpenAi => BackendKind::OpenAi,
            Backend::HuggingFace => BackendKind::HuggingFace,
            Backend::None => BackendKind::None,
        }
    }
}

fn resolve_format(format: OutputFormat, is_tty: bool) -> ReportFormat {
    match format {
        OutputFormat::Auto if is_tty => ReportFormat::Table,
        OutputFormat::Auto => ReportFormat::Json,
        OutputFormat::Table => ReportFormat::Table,
        OutputFormat::Json => ReportFormat::Json,
        OutputFormat::Plain => ReportFormat::Plain,
        OutputFormat::Csv => ReportFormat::Csv,
    }
}

fn log_level(cli: &Cli, config: &Config) -> String {
    if cli.quiet {
        return "error".to_string();
    }
    match (cli.verbose, cli.debug) {
        (0, false) => config.logging.level.clone(),
        (0, true) | (1, _) => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Apply command-line overrides on top of the loaded configuration
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(backend) = cli.backend {
        config.classifier.backend = backend.into();
    }
    if let Some(timeout) = cli.timeout {
        config.classifier.timeout_secs = timeout;
    }
    if let Some(concurrency) = cli.concurrency {
        config.classifier.concurrency = concurrency;
    }
    if let Some(max_results) = cli.max_results {
        config.pubmed.max_results = max_results;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).context("failed to load configuration")?;
    apply_overrides(&cli, &mut config);

    let level = log_level(&cli, &config);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| format!("pubmed_industry_filter={0},get_papers_list={0}", level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    if cli.show_config {
        print!("{}", config.to_redacted_toml()?);
        return Ok(());
    }

    let Some(query) = cli.query.as_deref() else {
        anyhow::bail!("a search query is required");
    };
    tracing::debug!(%query, file = ?cli.file, backend = %config.classifier.backend, "Starting run");

    let source = PubMedSource::new(&config.pubmed).context("failed to create PubMed client")?;
    let backend = build_backend(&config.classifier).context("failed to create classifier backend")?;
    let filter = ArticleFilter::new(AffiliationClassifier::new(backend))
        .concurrency(config.classifier.concurrency);

    let articles = source
        .fetch(&ArticleQuery::new(query).max_results(config.pubmed.max_results))
        .await
        .with_context(|| format!("failed to fetch articles from {}", source.id()))?;
    let rows = filter.filter(&articles).await;

    match &cli.file {
        Some(path) => {
            report::write_csv(&rows, path)
                .with_context(|| format!("failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!("Results saved to: {} ({} papers)", path.display(), rows.len());
            }
        }
        None => {
            let format = resolve_format(cli.output, std::io::stdout().is_terminal());
            println!("{}", report::render(&rows, format)?);
        }
    }

    Ok(())
}
