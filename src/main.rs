mod fetch;
mod filter;
mod format;
mod logging;
mod models;
mod store;
mod theme;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};

use fetch::FeedClient;
use filter::{FilterCriteria, PriorityFilter};
use models::TriageStatus;
use store::StateStore;
use theme::Theme;

#[derive(Parser)]
#[command(name = "geier")]
#[command(about = "Job feed viewer - filter, triage, and track postings")]
struct Cli {
    /// Base URL serving config.json and jobs.json (default: GEIER_BASE_URL
    /// env var, then the production feed)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the feed interactively
    Browse,

    /// List filtered jobs
    List {
        /// Free-text search over title and URL
        #[arg(short, long)]
        term: Option<String>,

        /// Priority filter
        #[arg(short, long, value_enum, default_value = "all")]
        priority: PriorityFilter,
    },

    /// Show the configured search terms
    Terms,

    /// Triage a job by URL
    Triage {
        #[command(subcommand)]
        command: TriageCommands,
    },

    /// Show the triage buckets against the current feed
    Status,

    /// Show or flip the color theme
    Theme {
        /// Flip to the other theme and persist it
        #[arg(long)]
        toggle: bool,
    },
}

#[derive(Subcommand)]
enum TriageCommands {
    /// Mark as todo (marking again clears it)
    Todo {
        /// Job URL
        url: String,
    },

    /// Mark as done
    Done {
        /// Job URL
        url: String,
    },

    /// Mark as skipped (hidden from all listings)
    Skip {
        /// Job URL
        url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_url = cli
        .base_url
        .or_else(|| std::env::var("GEIER_BASE_URL").ok())
        .unwrap_or_else(|| fetch::DEFAULT_BASE_URL.to_string());
    let client = FeedClient::new(&base_url);

    let mut store = StateStore::open()?;
    logging::initialize(store.dir());

    match cli.command {
        Commands::Browse => {
            tui::run_browse(&client, store)?;
        }

        Commands::List { term, priority } => {
            let jobs = match client.load_jobs() {
                Ok(jobs) => jobs,
                Err(err) => {
                    log::warn!("Jobs fetch failed: {:#}", err);
                    println!("Failed to load jobs.");
                    return Ok(());
                }
            };

            let criteria = FilterCriteria {
                term: term.unwrap_or_default(),
                priority,
            };
            let filtered = filter::apply(&jobs, &criteria, store.triage());

            if filtered.is_empty() {
                println!("No hits for these filters.");
            } else {
                println!("{:<6} {:<40} {:<18} {:<14} URL", "PRIO", "TITLE", "SOURCE", "FOUND");
                println!("{}", "-".repeat(100));
                for job in &filtered {
                    let prio = if job.priority == 2 { "high" } else { "normal" };
                    let fetched = format::short_datetime_opt(job.fetched_at.as_deref());
                    println!(
                        "{:<6} {:<40} {:<18} {:<14} {}",
                        prio,
                        truncate(&job.title, 38),
                        truncate(job.source.as_deref().unwrap_or("-"), 16),
                        if fetched.is_empty() { "-".to_string() } else { fetched },
                        job.url
                    );
                }
                println!("\n{} hit(s)", filtered.len());
            }
        }

        Commands::Terms => match client.load_config() {
            Ok(cfg) if cfg.search_terms.is_empty() => {
                println!("No search terms defined.");
            }
            Ok(cfg) => {
                for term in cfg.search_terms {
                    println!("{}", term);
                }
            }
            Err(err) => {
                log::warn!("Config fetch failed: {:#}", err);
                println!("Could not load config.");
            }
        },

        Commands::Triage { command } => match command {
            TriageCommands::Todo { url } => match store.toggle_todo(&url)? {
                Some(_) => println!("Marked '{}' as TODO.", url),
                None => println!("Cleared todo mark on '{}'.", url),
            },
            TriageCommands::Done { url } => {
                store.mark(&url, TriageStatus::Done)?;
                println!("Marked '{}' as DONE.", url);
            }
            TriageCommands::Skip { url } => {
                store.mark(&url, TriageStatus::Skip)?;
                println!("Marked '{}' as SKIP.", url);
            }
        },

        Commands::Status => {
            if store.triage().is_empty() {
                println!("Nothing triaged yet.");
                return Ok(());
            }

            // Resolve titles against the feed when it is reachable; the
            // buckets themselves live locally and print either way.
            let jobs = match client.load_jobs() {
                Ok(jobs) => jobs,
                Err(err) => {
                    log::warn!("Jobs fetch failed: {:#}", err);
                    println!("(Feed unreachable - showing URLs only)\n");
                    Vec::new()
                }
            };

            for status in [TriageStatus::Todo, TriageStatus::Done, TriageStatus::Skip] {
                let mut entries: Vec<String> = store
                    .triage()
                    .iter()
                    .filter(|(_, s)| **s == status)
                    .map(|(url, _)| {
                        jobs.iter()
                            .find(|job| &job.url == url)
                            .map(|job| format!("{} ({})", job.title, url))
                            .unwrap_or_else(|| url.clone())
                    })
                    .collect();
                entries.sort();

                println!("{} ({})", status.label().to_uppercase(), entries.len());
                for entry in entries {
                    println!("  {}", entry);
                }
                println!();
            }
        }

        Commands::Theme { toggle } => {
            let current = Theme::resolve(store.theme());
            if toggle {
                let next = current.toggle();
                store.set_theme(next)?;
                println!("Theme set to {}.", next.label());
            } else {
                println!("{}", current.label());
            }
        }
    }

    Ok(())
}

// Counts chars, not bytes: feed titles are German and a byte cut can land
// inside an umlaut.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
