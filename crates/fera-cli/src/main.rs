//! Fera CLI - grounded web search with follow-up conversations
//!
//! Searches go through the Fera API; every session is kept in a local
//! history blob so past conversations can be listed and replayed.

mod api;
mod config;
mod flow;
mod store;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Input;

use api::FeraClient;
use config::Config;
use flow::{SearchFlow, SearchOutcome};
use store::HistoryStore;

#[derive(Parser)]
#[command(name = "fera")]
#[command(about = "Fera CLI - ask anything, get a grounded answer with sources", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the web and chain follow-up questions
    Search {
        /// The query to search for
        query: Vec<String>,
        /// Print the first answer and exit without the follow-up prompt
        #[arg(long)]
        no_follow_up: bool,
    },

    /// Browse and manage past search sessions
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show or change configuration
    Config {
        /// Set the Fera API base URL
        #[arg(long)]
        set_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List stored sessions, newest first
    List,
    /// Replay a session's conversation
    Show {
        /// Session id (prefix is enough)
        id: String,
    },
    /// Delete a session
    Delete {
        /// Session id (prefix is enough)
        id: String,
    },
    /// Delete all sessions
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, no_follow_up } => cmd_search(query, no_follow_up).await,
        Commands::History { action } => cmd_history(action),
        Commands::Config { set_url } => cmd_config(set_url),
    }
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_search(query: Vec<String>, no_follow_up: bool) -> Result<()> {
    let query = query.join(" ");
    if query.trim().is_empty() {
        bail!("Query is required");
    }

    let config = Config::load()?;
    let client = FeraClient::new(&config.base_url);
    let mut store = HistoryStore::open(HistoryStore::default_path()?);
    let mut flow = SearchFlow::new(client);

    println!("{}", "Searching...".dimmed());
    let outcome = flow
        .search(&mut store, query.trim())
        .await
        .with_context(|| format!("Search failed (is the server at {} up?)", config.base_url))?;
    print_outcome(&outcome);

    if no_follow_up {
        return Ok(());
    }

    loop {
        let follow_up: String = Input::new()
            .with_prompt("Follow-up (empty to quit)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read follow-up")?;

        let follow_up = follow_up.trim().to_string();
        if follow_up.is_empty() {
            break;
        }

        println!("{}", "Thinking...".dimmed());
        match flow.follow_up(&mut store, &follow_up).await {
            Ok(outcome) => print_outcome(&outcome),
            Err(err) => eprintln!("{} {}", "Error:".red(), err),
        }
    }

    Ok(())
}

fn cmd_history(action: HistoryAction) -> Result<()> {
    let mut store = HistoryStore::open(HistoryStore::default_path()?);

    match action {
        HistoryAction::List => {
            let sessions = &store.history().sessions;
            if sessions.is_empty() {
                println!("No search history.");
                return Ok(());
            }

            println!("{}", "Sessions:".bold());
            for session in sessions {
                let current = store.history().current_session_id.as_deref() == Some(&session.id);
                let marker = if current { " (current)".green().to_string() } else { String::new() };
                println!(
                    "  {} {} [{} turns] {}{}",
                    session.id[..8].dimmed(),
                    session.original_query.cyan(),
                    session.conversations.len(),
                    session.last_updated.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                    marker
                );
            }
        }

        HistoryAction::Show { id } => {
            let session_id = resolve_session(&store, &id)?;
            let session = store
                .history()
                .get_session(&session_id)
                .context("Session disappeared")?
                .clone();

            println!("{} {}", "Session:".bold(), session.original_query.cyan());
            for entry in &session.conversations {
                println!("\n{} {}", ">".green().bold(), entry.query.bold());
                println!("{}", entry.response);
                print_sources(&entry.sources);
            }

            store.set_current_session(Some(session_id))?;
        }

        HistoryAction::Delete { id } => {
            let session_id = resolve_session(&store, &id)?;
            if store.delete_session(&session_id)? {
                println!("{} Session deleted", "✓".green());
            }
        }

        HistoryAction::Clear => {
            store.clear()?;
            println!("{} History cleared", "✓".green());
        }
    }

    Ok(())
}

fn cmd_config(set_url: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(url) = set_url {
        config.base_url = url.trim_end_matches('/').to_string();
        config.save()?;
        println!("{} Base URL set to {}", "✓".green(), config.base_url.cyan());
        return Ok(());
    }

    println!("{}", "Configuration:".bold());
    println!("  base_url: {}", config.base_url.cyan());
    println!("  config:   {:?}", Config::config_path()?);
    println!("  history:  {:?}", HistoryStore::default_path()?);

    Ok(())
}

// ============================================
// Helpers
// ============================================

fn resolve_session(store: &HistoryStore, prefix: &str) -> Result<String> {
    let matches: Vec<&str> = store
        .history()
        .sessions
        .iter()
        .filter(|s| s.id.starts_with(prefix))
        .map(|s| s.id.as_str())
        .collect();

    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => bail!("No session matches '{}'", prefix),
        _ => bail!("Session id '{}' is ambiguous", prefix),
    }
}

fn print_outcome(outcome: &SearchOutcome) {
    println!();
    println!("{}", outcome.summary);
    print_sources(&outcome.sources);
    println!();
}

fn print_sources(sources: &[fera::Source]) {
    if sources.is_empty() {
        return;
    }

    println!("\n{}", "Sources:".bold());
    for (index, source) in sources.iter().enumerate() {
        println!("  {}. {} {}", index + 1, source.title.cyan(), source.url.dimmed());
        if !source.snippet.is_empty() {
            println!("     {}", source.snippet.dimmed());
        }
    }
}
