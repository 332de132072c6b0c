use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use postlens::config::{Config, SourceKind};
use postlens::correlation::{correlate, CorrelationMatrix};
use postlens::grouping::{GroupedPosts, Grouper, InvalidTimestampPolicy};
use postlens::posts::models::Post;
use postlens::source::{FileSource, GraphqlSource, PostSource, MAX_AMOUNT};

/// Postlens: monthly topic distribution and topic correlation for tagged posts.
///
/// Loads a batch of posts (from a JSON file or a GraphQL endpoint), groups
/// them by month and topic, and shows how often topics appear together.
#[derive(Parser)]
#[command(name = "postlens", version, about)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// Read posts from this JSON file (overrides POSTLENS_INPUT)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Fetch posts from this GraphQL endpoint (overrides POSTLENS_GRAPHQL_URL)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Maximum number of posts to load (default: 100, max: 1000)
    #[arg(long, global = true)]
    amount: Option<u32>,

    /// Topics count only above this likelihood (default: 0.2)
    #[arg(long, global = true)]
    min_likelihood: Option<f64>,

    /// Offset from UTC in minutes used to assign posts to months (default: 0)
    #[arg(long, global = true, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    /// Fail on posts with unusable timestamps instead of skipping them
    #[arg(long, global = true)]
    strict_timestamps: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many posts were published each month
    Months,

    /// Show each month's topic mix
    Topics,

    /// Show how strongly topics overlap
    Links,

    /// Show posts per author
    Authors,

    /// Write a markdown report with every view
    Report {
        /// Where to write the report
        #[arg(long, default_value = "output/postlens-report.md")]
        output: String,
    },

    /// Dump the grouped views and correlation matrix as JSON
    Export {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Shape of `postlens export`.
#[derive(Serialize)]
struct Export<'g, 'a> {
    grouped: &'g GroupedPosts<'a>,
    links: &'g CorrelationMatrix,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("postlens=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.source)?;

    let posts = fetch_posts(&config).await?;
    let grouped = group_posts(&config, &posts)?;

    match cli.command {
        Commands::Months => {
            postlens::output::terminal::display_month_frequency(&grouped);
        }

        Commands::Topics => {
            postlens::output::terminal::display_topic_shares(&grouped);
        }

        Commands::Links => {
            let matrix = correlate(grouped.topics(), grouped.min_likelihood());
            postlens::output::terminal::display_topic_links(&matrix);
        }

        Commands::Authors => {
            let summaries = postlens::grouping::authors::summarize_authors(&grouped);
            postlens::output::terminal::display_authors(&summaries);
        }

        Commands::Report { output } => {
            let matrix = correlate(grouped.topics(), grouped.min_likelihood());
            let report_path =
                postlens::output::markdown::generate_report(&grouped, &matrix, &output)?;
            postlens::output::terminal::display_skipped(&grouped);
            println!(
                "\n{}",
                format!("Markdown report saved to: {report_path}").bold()
            );
        }

        Commands::Export { output } => {
            let matrix = correlate(grouped.topics(), grouped.min_likelihood());
            let export = Export {
                grouped: &grouped,
                links: &matrix,
            };
            let json = serde_json::to_string_pretty(&export)
                .context("Failed to serialize export")?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

/// Environment config with command-line overrides applied.
fn load_config(args: &SourceArgs) -> Result<Config> {
    let mut config = Config::load()?;

    if let Some(input) = &args.input {
        config.input_path = Some(input.clone());
    }
    if let Some(endpoint) = &args.endpoint {
        // An explicit endpoint beats a file from the environment
        config.graphql_url = Some(endpoint.clone());
        if args.input.is_none() {
            config.input_path = None;
        }
    }
    if let Some(amount) = args.amount {
        config.amount = amount;
    }
    if let Some(min_likelihood) = args.min_likelihood {
        config.min_likelihood = min_likelihood;
    }
    if let Some(minutes) = args.utc_offset_minutes {
        config.utc_offset_minutes = minutes;
    }
    config.strict_timestamps = args.strict_timestamps;

    config.require_valid_threshold()?;
    Ok(config)
}

/// Fetch one batch of posts from the configured source.
async fn fetch_posts(config: &Config) -> Result<Vec<Post>> {
    let source: Box<dyn PostSource> = match config.require_source()? {
        SourceKind::File(path) => Box::new(FileSource::new(path)),
        SourceKind::Graphql(url) => Box::new(GraphqlSource::new(&url)?),
    };

    let amount = config.effective_amount();
    if amount != config.amount {
        warn!(
            requested = config.amount,
            using = amount,
            max = MAX_AMOUNT,
            "Requested amount out of range, clamping"
        );
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Loading up to {amount} posts from {}", source.describe()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = source.fetch_posts(amount).await;
    spinner.finish_and_clear();

    let posts = result?;
    info!(count = posts.len(), source = %source.describe(), "Loaded posts");
    Ok(posts)
}

/// Run the grouping pass with the configured threshold, offset and policy.
fn group_posts<'a>(config: &Config, posts: &'a [Post]) -> Result<GroupedPosts<'a>> {
    let policy = if config.strict_timestamps {
        InvalidTimestampPolicy::Reject
    } else {
        InvalidTimestampPolicy::Skip
    };

    let grouper = Grouper::new(config.min_likelihood)
        .with_utc_offset(config.utc_offset()?)
        .with_invalid_timestamps(policy);

    let grouped = grouper.group(posts)?;

    info!(
        posts = grouped.total_posts(),
        topics = grouped.topics().len(),
        skipped = grouped.skipped().len(),
        "Grouped posts"
    );

    Ok(grouped)
}
