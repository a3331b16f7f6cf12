use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::layer::{Layered, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Layer, Registry};

use catalog_concierge::catalog::{filter_catalog, load_catalog, CatalogEntry};
use catalog_concierge::config::Config;
use catalog_concierge::discovery::ServiceResolver;
use catalog_concierge::display::{format_message, format_service_cards, EXAMPLE_QUESTIONS};
use catalog_concierge::error::ConciergeError;
use catalog_concierge::session::{ConversationSession, ExchangeOutcome, SubmitRejection};

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = catalog_concierge::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer with the relevant services
    Ask {
        /// The question to ask
        question: String,
    },
    /// Start an interactive conversation
    Chat {
        /// Question to submit before reading from stdin
        #[arg(long)]
        initial: Option<String>,
    },
    /// List the catalog entries the model can pick from, with their index
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging before the config loader reports what it reads
    let log_handles = init_logging(cli.log_level.as_deref())?;

    let config = Config::load(&cli.config, cli.log_level.clone()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    apply_logging_config(&log_handles, &config)?;
    info!("Configuration loaded from {}", cli.config.display());

    let catalog: Arc<[CatalogEntry]> = load_catalog(&config.catalog.path)
        .map_err(|e| {
            error!("Failed to load catalog: {}", e);
            e
        })?
        .into();

    match cli.command {
        Commands::Ask { question } => run_ask(&config, &catalog, &question, cli.format).await?,
        Commands::Chat { initial } => run_chat(&config, catalog, initial).await?,
        Commands::Catalog => print_catalog(&catalog, cli.format)?,
    }

    Ok(())
}

/// Single-shot resolve
async fn run_ask(
    config: &Config,
    catalog: &[CatalogEntry],
    question: &str,
    format: OutputFormat,
) -> Result<()> {
    let resolver = ServiceResolver::with_openai()?;
    let credentials = config.request_credentials();

    let call = resolver.resolve(question, catalog, &credentials);
    let result = match config.completion.request_timeout() {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| ConciergeError::response_timeout(limit))?,
        None => call.await,
    }?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => {
            println!("{}", result.answer);
            if let Some(cards) = format_service_cards(&result.relevant_services) {
                println!("\n{}", cards);
            }
        }
    }
    Ok(())
}

/// Interactive conversation over stdin
async fn run_chat(config: &Config, catalog: Arc<[CatalogEntry]>, initial: Option<String>) -> Result<()> {
    let mut session = ConversationSession::new(
        ServiceResolver::with_openai()?,
        catalog,
        config.credentials(),
    );
    if let Some(limit) = config.completion.request_timeout() {
        session = session.with_response_timeout(limit);
    }

    if !session.is_configured() {
        warn!("No credentials configured; set CONCIERGE_API_KEY or credentials.api_key");
        println!("Configure your API key and base URL first (see credentials in the config file).");
    }

    let mut relevant = session.subscribe_relevant_services();

    match initial {
        Some(question) => {
            println!("Processing your query...");
            submit_and_render(&session, &question, &mut relevant).await;
        }
        None => {
            println!("Ask me about our AI services. For example:");
            for example in EXAMPLE_QUESTIONS {
                println!("  \"{}\"", example);
            }
        }
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            info!("stdin closed, ending conversation");
            break;
        };
        let input = line.trim();
        if matches!(input, "exit" | "quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }

        submit_and_render(&session, input, &mut relevant).await;
    }

    Ok(())
}

async fn submit_and_render<C>(
    session: &ConversationSession<C>,
    input: &str,
    relevant: &mut tokio::sync::watch::Receiver<Vec<CatalogEntry>>,
) where
    C: catalog_concierge::discovery::CompletionClient,
{
    println!("Thinking...");
    match session.submit(input).await {
        Ok(exchange) => {
            println!("{}", format_message(&exchange.reply));
            if let ExchangeOutcome::Failed(e) = &exchange.outcome {
                error!("Resolve call failed ({}): {}", e.category(), e);
            }
            if relevant.has_changed().unwrap_or(false) {
                if let Some(cards) = format_service_cards(&relevant.borrow_and_update()) {
                    println!("{}", cards);
                }
            }
        }
        Err(SubmitRejection::BlankInput) => {}
        Err(rejection) => println!("{}", rejection),
    }
}

fn print_catalog(catalog: &[CatalogEntry], format: OutputFormat) -> Result<()> {
    let usable = filter_catalog(catalog);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&usable)?),
        OutputFormat::Text => {
            println!("{} of {} entries are usable", usable.len(), catalog.len());
            for (index, entry) in usable.iter().enumerate() {
                println!("[{}] {}", index, entry.usable_title().unwrap_or_default());
            }
        }
    }
    Ok(())
}

type FormatLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Reload handles for the subscriber installed by [`init_logging`]
struct LogHandles {
    filter: reload::Handle<EnvFilter, Layered<reload::Layer<FormatLayer, Registry>, Registry>>,
    format: reload::Handle<FormatLayer, Registry>,
}

/// Text logging to stderr at the CLI level (or `warn`); `RUST_LOG` wins
fn init_logging(level: Option<&str>) -> Result<LogHandles> {
    let (format_layer, format) = reload::Layer::new(text_layer());
    let (filter_layer, filter) = reload::Layer::new(env_filter(level.unwrap_or("warn")));

    tracing_subscriber::registry()
        .with(format_layer)
        .with(filter_layer)
        .try_init()?;

    Ok(LogHandles { filter, format })
}

/// Switch to the level and format of the loaded configuration
fn apply_logging_config(handles: &LogHandles, config: &Config) -> Result<()> {
    let logging = config.logging();
    handles.filter.reload(env_filter(&logging.level))?;
    if logging.is_json() {
        handles.format.reload(json_layer())?;
    }
    Ok(())
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn text_layer() -> FormatLayer {
    fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .boxed()
}

fn json_layer() -> FormatLayer {
    fmt::layer().json().with_writer(std::io::stderr).boxed()
}
