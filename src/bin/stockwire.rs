//! stockwire - quote enrichment CLI
//!
//! Looks up quotes and enriches news from the configured backend, printing
//! JSON to stdout. Logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use stockwire::types::validate_date;
use stockwire::{
    Article, ArticleSource, Config, HealthReport, HttpArticleSource, IdToken, MetricsReport,
    NewsByCategory, QuoteGateway, StockwireBuilder, StockwireError,
};

/// Stockwire CLI
#[derive(Parser)]
#[command(name = "stockwire")]
#[command(version = stockwire::PKG_VERSION)]
#[command(about = "Enrich news articles with stock quotes")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "STOCKWIRE_CONFIG")]
    config: Option<PathBuf>,

    /// Print cache state and request statistics to stderr when done.
    #[arg(long, global = true)]
    report: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a single ticker
    Lookup {
        /// Ticker symbol, e.g. AAPL
        ticker: String,
    },

    /// Fetch news for a date and enrich it with quotes
    Enrich {
        /// Date in YYYY-MM-DD format
        #[arg(short, long)]
        date: String,
        /// Use the full by-date listing instead of top news
        #[arg(long)]
        by_date: bool,
        /// List companies by display name or ticker
        #[arg(long, default_value = "name")]
        id_token: IdToken,
    },

    /// Fetch articles about a topic and enrich them
    Topic {
        #[arg(short, long)]
        topic: String,
    },

    /// Fetch one article and enrich it
    Article {
        /// Article ID
        #[arg(long)]
        id: String,
    },

    /// Enrich articles from a local JSON file (an array or a category map)
    EnrichFile {
        path: PathBuf,
        #[arg(long, default_value = "name")]
        id_token: IdToken,
    },

    /// Show version and build information
    Version,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    if let Command::Version = args.command {
        print_json(&stockwire::build_info())?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load(args.config.as_deref())?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(version = stockwire::version_string(), "stockwire starting");
    let gateway = StockwireBuilder::from_config(&config)?.build()?;
    let mut status = ExitCode::SUCCESS;

    match args.command {
        Command::Lookup { ticker } => {
            let (name, quote) = gateway
                .lookup_tracked(&ticker, stockwire::gateway::DIRECT_LOOKUP_LABEL)
                .await;
            if quote.is_error() {
                status = ExitCode::FAILURE;
            }
            let mut out = serde_json::Map::new();
            out.insert(name, serde_json::to_value(quote)?);
            print_json(&out)?;
        }

        Command::Enrich {
            date,
            by_date,
            id_token,
        } => {
            validate_date(&date)?;
            let source = article_source(&config)?;
            let (news, label) = if by_date {
                let label = match id_token {
                    IdToken::Name => "date-news-with-stock",
                    IdToken::Ticker => "date-news-with-stock-ticker",
                };
                (source.news_by_date(&date).await?, label)
            } else {
                (source.top_news(&date).await?, "news-with-stock")
            };
            let news = gateway.enrich_categories(news, id_token, label).await;
            print_json(&news)?;
        }

        Command::Topic { topic } => {
            if topic.trim().is_empty() {
                return Err(StockwireError::InvalidInput("topic must not be empty".into()).into());
            }
            let source = article_source(&config)?;
            let articles = source.news_by_topic(&topic).await?;
            let articles = gateway
                .enrich(articles, IdToken::Name, "news-by-topic-with-stock")
                .await;
            print_json(&articles)?;
        }

        Command::Article { id } => {
            let source = article_source(&config)?;
            let article = source.news_detail(&id).await?;
            let article = gateway
                .enrich_article(article, "news-content-with-stock")
                .await;
            print_json(&article)?;
        }

        Command::EnrichFile { path, id_token } => {
            enrich_file(&gateway, &path, id_token).await?;
        }

        // Printed before config load.
        Command::Version => {}
    }

    if args.report {
        let report = Report {
            health: gateway.health(),
            metrics: gateway.metrics_report(),
        };
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }

    gateway.shutdown();
    Ok(status)
}

/// State of the gateway after the command ran.
#[derive(Serialize)]
struct Report {
    health: HealthReport,
    metrics: MetricsReport,
}

fn article_source(config: &Config) -> Result<HttpArticleSource, StockwireError> {
    let url = config.backend.url.as_deref().ok_or_else(|| {
        StockwireError::Configuration(
            "backend URL is not set (backend.url or STOCKWIRE_BACKEND_URL)".into(),
        )
    })?;
    HttpArticleSource::new(url, config.backend_timeout())
}

async fn enrich_file(
    gateway: &QuoteGateway,
    path: &std::path::Path,
    id_token: IdToken,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    if value.is_array() {
        let articles: Vec<Article> = serde_json::from_value(value)?;
        let articles = gateway.enrich(articles, id_token, "news-with-stock").await;
        print_json(&articles)?;
    } else {
        let news: NewsByCategory = serde_json::from_value(value)?;
        let news = gateway
            .enrich_categories(news, id_token, "news-with-stock")
            .await;
        print_json(&news)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
