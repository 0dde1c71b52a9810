//! jobboard CLI
//!
//! Command-line front end for the page enhancement library:
//! - Format relative timestamps
//! - Check signup form values
//! - Play a stat counter animation
//! - Poll the categories endpoint
//! - Show or toggle the stored theme

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::rc::Rc;
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobboard::categories::{self, CategoryId, HttpCategorySource};
use jobboard::config::{generate_default_config, LoggingConfig};
use jobboard::document::{Document, Element, MemoryDocument, MemoryElement, Selector};
use jobboard::forms::{check_confirmation, check_email, check_username, FieldState, PasswordStrength};
use jobboard::preferences::FileStore;
use jobboard::timefmt::{parse_timestamp, time_since};
use jobboard::{counter, AppPreferences, CategoryRefresher, Config, TokioScheduler};

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Job board page enhancements from the command line")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Site origin, overrides [api] base_url
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show how long ago a timestamp was
    TimeSince {
        /// ISO 8601 / RFC 3339 timestamp
        timestamp: String,
        /// Reference time (default: now)
        #[arg(long)]
        now: Option<String>,
    },

    /// Classify a password's strength
    Password {
        value: String,
    },

    /// Check signup form values
    Validate {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long, requires = "password2")]
        password1: Option<String>,
        #[arg(long, requires = "password1")]
        password2: Option<String>,
    },

    /// Play a stat counter animation
    Count {
        target: i64,
    },

    /// Refresh category job counts from the API
    Poll {
        /// Category ids to track
        #[arg(long = "category", required = true)]
        categories: Vec<String>,
        /// Fetch once and exit
        #[arg(long)]
        once: bool,
    },

    /// Show or toggle the stored theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Switch between light and dark
    Toggle,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }

    init_logging(&config.logging);

    match cli.command {
        Commands::TimeSince { timestamp, now } => {
            let now = match now.as_deref() {
                None => Utc::now(),
                Some(raw) => parse_timestamp(raw)
                    .with_context(|| format!("Invalid reference time: {}", raw))?,
            };
            match parse_timestamp(&timestamp) {
                Some(then) => println!("{}", time_since(then, now)),
                None => {
                    tracing::warn!("Unparsable timestamp {:?}", timestamp);
                    println!("Just now");
                }
            }
        }

        Commands::Password { value } => {
            println!("{}", PasswordStrength::classify(&value));
        }

        Commands::Validate {
            email,
            username,
            password1,
            password2,
        } => {
            let mut checks = Vec::new();
            if let Some(email) = email {
                checks.push(("email", check_email(&email)));
            }
            if let Some(username) = username {
                checks.push(("username", check_username(&username)));
            }
            if let (Some(password1), Some(password2)) = (password1, password2) {
                checks.push(("password2", check_confirmation(&password1, &password2)));
            }
            if checks.is_empty() {
                bail!("Nothing to validate; pass --email, --username or --password1/--password2");
            }

            for (field, state) in &checks {
                println!("{:<10} {}", field, describe(*state));
            }
        }

        Commands::Count { target } => {
            LocalSet::new().run_until(play_counter(target, &config)).await;
        }

        Commands::Poll { categories, once } => {
            LocalSet::new()
                .run_until(poll_categories(&categories, once, &config))
                .await?;
        }

        Commands::Theme { action } => {
            let path = config
                .preferences
                .store_path()
                .context("No config directory to keep the theme preference in")?;
            let prefs = AppPreferences::new(FileStore::new(&path));

            let theme = match action {
                Some(ThemeAction::Toggle) => {
                    let theme = prefs.theme().toggled();
                    prefs.set_theme(theme);
                    theme
                }
                None => prefs.theme(),
            };
            println!("{}", theme);
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            if let Some(path) = output {
                std::fs::write(&path, &content)
                    .with_context(|| format!("Failed to write {:?}", path))?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", content);
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("jobboard={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn describe(state: FieldState) -> &'static str {
    if state.is_valid() {
        "valid"
    } else {
        "invalid"
    }
}

async fn play_counter(target: i64, config: &Config) {
    let doc = MemoryDocument::new();
    let stat = doc.element("h3").text_content(&target.to_string()).append_to(&doc.root());
    let tick = config.counter.tick();

    let handle = counter::animate(stat.clone(), target, &TokioScheduler, tick, config.counter.steps);

    let mut shown = String::new();
    loop {
        tokio::time::sleep(tick).await;
        let text = stat.text();
        if text != shown {
            println!("{}", text);
            shown = text;
        }
        if handle.is_cancelled() {
            break;
        }
    }
}

fn category_id(raw: &str) -> CategoryId {
    raw.parse::<i64>()
        .map(CategoryId::from)
        .unwrap_or_else(|_| CategoryId::Text(raw.to_string()))
}

/// Build a page holding one labelled card per id
fn category_page(ids: &[CategoryId]) -> (MemoryDocument, Vec<(CategoryId, MemoryElement)>) {
    let doc = MemoryDocument::new();
    let body = doc.root();
    let labels = ids
        .iter()
        .map(|id| {
            let card = doc
                .element("div")
                .class(categories::CONTAINER_CLASS)
                .attr(categories::CATEGORY_ID_ATTR, &id.to_string())
                .append_to(&body);
            let label = doc
                .element("span")
                .class(categories::JOB_COUNT_CLASS)
                .text_content("-")
                .append_to(&card);
            (id.clone(), label)
        })
        .collect();
    (doc, labels)
}

fn print_counts(labels: &[(CategoryId, MemoryElement)]) {
    for (id, label) in labels {
        println!("{:<12} {}", id.to_string(), label.text());
    }
}

async fn poll_categories(raw_ids: &[String], once: bool, config: &Config) -> anyhow::Result<()> {
    let ids: Vec<CategoryId> = raw_ids.iter().map(|raw| category_id(raw)).collect();
    let (doc, labels) = category_page(&ids);

    let url = config.api.categories_url();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!("Set [api] base_url, JOBBOARD_API_URL or --api-url to poll {}", url);
    }
    let source = HttpCategorySource::new(url, config.api.request_timeout())?;
    let refresher = CategoryRefresher::new(doc.clone(), Rc::new(source), config.refresh.interval());

    if once {
        let summary = refresher.refresh().await?;
        print_counts(&labels);
        tracing::info!("{} updated, {} unmatched", summary.updated, summary.unmatched);
        return Ok(());
    }

    let handle = refresher
        .start(&TokioScheduler)
        .context("No category cards to refresh")?;

    tokio::signal::ctrl_c().await?;
    handle.cancel();
    tracing::info!("Stopped polling");

    print_counts(&labels);
    let missing = doc
        .query_all(&Selector::class(categories::JOB_COUNT_CLASS))
        .iter()
        .filter(|label| label.text() == "-")
        .count();
    if missing > 0 {
        tracing::warn!("{} categories never received a count", missing);
    }
    Ok(())
}
