//! book-finder CLI: title search and autocomplete over Open Library.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use book_finder::catalog::{BookRecord, Suggestion};
use book_finder::config::FinderConfig;
use book_finder::controller::resolve_query;
use book_finder::logging::{self, LogTarget};
use book_finder::pagination::{PageWindow, render_strip};
use book_finder::paths::FinderPaths;
use book_finder::provider::{BookProvider, OpenLibraryProvider};
use book_finder::tui::FinderTui;

#[derive(Parser)]
#[command(name = "book-finder", version, about = "Search books by title from the terminal")]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/book-finder/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive search with live suggestions (the default).
    Tui,

    /// Fetch one page of results.
    Search {
        /// Title to search for; blank searches the default term.
        #[arg(num_args = 0..)]
        text: Vec<String>,

        /// 1-based page number.
        #[arg(long, default_value = "1")]
        page: u32,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Fetch autocomplete suggestions for a partial title.
    Suggest {
        #[arg(num_args = 1..)]
        text: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Print the pagination strip for a page position.
    Pages {
        #[arg(long)]
        current: u32,

        #[arg(long)]
        total: u32,
    },

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write a config file with the default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Serialize)]
struct SearchReport<'a> {
    query: &'a str,
    page: u32,
    total_pages: u32,
    total_match_count: u64,
    records: &'a [BookRecord],
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs go to a file.
    let log_target = if matches!(command, Commands::Tui) {
        let paths = FinderPaths::resolve()?;
        paths.ensure_state_dir()?;
        LogTarget::File(paths.log_file())
    } else {
        LogTarget::Stderr
    };
    logging::init(&log_target)?;

    let explicit_config = cli.config.as_deref();

    match command {
        Commands::Tui => {
            let config = FinderConfig::resolve(explicit_config)?.config;
            let provider: Arc<dyn BookProvider> =
                Arc::new(OpenLibraryProvider::from_config(&config));
            FinderTui::new(&config, provider).run()?;
        }

        Commands::Search { text, page, json } => {
            let config = FinderConfig::resolve(explicit_config)?.config;
            let provider = OpenLibraryProvider::from_config(&config);
            let query = resolve_query(&text.join(" "), &config.default_query);
            let page = page.max(1);

            let mut result = provider.search_page(&query, page, config.page_size)?;
            result.records.truncate(config.page_size as usize);
            let total_pages = result.total_pages(config.page_size);

            if json {
                let report = SearchReport {
                    query: &query,
                    page,
                    total_pages,
                    total_match_count: result.total_match_count,
                    records: &result.records,
                };
                println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            } else if result.records.is_empty() {
                println!("No books found for \"{query}\".");
            } else {
                print_records(&result.records);
                println!(
                    "\n\"{query}\": page {page} of {total_pages} ({} matches)",
                    result.total_match_count
                );
                if let Some(window) = PageWindow::compute_with(
                    page,
                    total_pages,
                    config.page_cap,
                    config.max_visible_pages,
                ) {
                    println!("{}", render_strip(&window));
                }
            }
        }

        Commands::Suggest { text, json } => {
            let config = FinderConfig::resolve(explicit_config)?.config;
            let provider = OpenLibraryProvider::from_config(&config);
            let query = text.join(" ");
            let query = query.trim();
            let suggestions: Vec<Suggestion> = if query.is_empty() {
                Vec::new()
            } else {
                provider.suggest(query, config.suggestion_limit)?
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&suggestions).into_diagnostic()?
                );
            } else if suggestions.is_empty() {
                println!("No suggestions.");
            } else {
                for s in &suggestions {
                    println!("{} by {}", s.title, s.author_summary);
                }
            }
        }

        Commands::Pages { current, total } => {
            let config = FinderConfig::resolve(explicit_config)?.config;
            let capped = total.min(config.page_cap).max(1);
            if current == 0 || current > capped {
                miette::bail!("--current must be between 1 and {capped}");
            }
            match PageWindow::compute_with(
                current,
                total,
                config.page_cap,
                config.max_visible_pages,
            ) {
                Some(window) => println!("{}", render_strip(&window)),
                None => println!("(single page, no controls)"),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let resolved = FinderConfig::resolve(explicit_config)?;
                println!("# {}", resolved.path.display());
                print!("{}", resolved.config.to_toml(&resolved.path)?);
            }
            ConfigAction::Init { force } => {
                let path = FinderConfig::config_path(explicit_config)?;
                FinderConfig::write_defaults(&path, force)?;
                println!("Wrote default config to {}", path.display());
            }
        },
    }

    Ok(())
}

fn print_records(records: &[BookRecord]) {
    let title_width = records
        .iter()
        .map(|r| r.title.chars().count())
        .max()
        .unwrap_or(0)
        .clamp(5, 60);
    println!("{:<title_width$}  {:<40}  First Publish Year", "Title", "Author(s)");
    for record in records {
        println!(
            "{:<title_width$}  {:<40}  {}",
            truncate(&record.title, title_width),
            truncate(&record.author_summary(), 40),
            record.year_label(),
        );
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}
