//! # Taskdue
//!
//! A terminal task list with deadlines and live countdowns. Taskdue combines a
//! CLI for quick entry with an interactive TUI that ticks every task's
//! countdown once per second.
//!
//! ## Usage
//!
//! ### Interactive Mode (TUI)
//!
//! Run without arguments (or with `ui`) to launch the interactive view.
//!
//! *   `a`: Add new task (name, description, deadline, priority)
//! *   `Space`: Toggle completion of the selected task
//! *   `d`: Delete selected task
//! *   `s` / `c` / `f`: Cycle the status / category / date filter
//! *   `q`: Quit
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! taskdue add "Report" --deadline "2025-12-01 10:00" --priority high
//! taskdue list --status pending --date this-week
//! taskdue toggle <ID>
//! taskdue remove <ID>
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved as `tasks.json` in your local data directory
//! (`~/.local/share/taskdue/` on Linux). Override it with `TASKDUE_DIR`.
//! Logs go to `taskdue.log` in the same directory; set `RUST_LOG` to adjust.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use chrono::Local;
use std::io;
use std::process::ExitCode;
use tracing::error;

use taskdue::commands::*;
use taskdue::config::{init_logging, Config};
use taskdue::filter::{CategoryFilter, DateFilter, Filters, StatusFilter};
use taskdue::models::Priority;
use taskdue::storage::FileStorage;
use taskdue::store::TaskStore;
use taskdue::tui::run_tui;

#[derive(Parser)]
#[command(name = "taskdue")]
#[command(about = "Terminal task list with deadline countdowns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Longer description
        #[arg(short = 'D', long)]
        description: Option<String>,
        /// Deadline, e.g. "2025-12-01 10:00" or 2025-12-01
        #[arg(short, long)]
        deadline: String,
        /// Priority (none, medium, high)
        #[arg(short, long, default_value_t = Priority::None)]
        priority: Priority,
    },
    /// List tasks
    List {
        /// Status filter (all, completed, pending)
        #[arg(short, long, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        /// Category filter (all or a category name)
        #[arg(short, long, default_value_t = CategoryFilter::All)]
        category: CategoryFilter,
        /// Date filter (all, today, tomorrow, this-week, next-week)
        #[arg(short, long, default_value_t = DateFilter::All)]
        date: DateFilter,
    },
    /// Toggle the completion of a task
    Toggle {
        id: u64,
    },
    /// Remove a task
    Remove {
        id: u64,
    },
    /// List the categories in use
    Categories,
    /// Delete all tasks
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
    /// Open interactive TUI
    Ui,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::from_env();
    init_logging(&config);

    let mut store = TaskStore::new(FileStorage::new(config.data_dir.clone()));
    let now = Local::now().naive_local();

    let res = match cli.command {
        Some(Commands::Add { name, description, deadline, priority }) => {
            cmd_add(&mut store, name, description, &deadline, priority).map(|_| ())
        }
        Some(Commands::List { status, category, date }) => {
            cmd_list(&mut store, Filters { status, category, date }, now);
            Ok(())
        }
        Some(Commands::Toggle { id }) => cmd_toggle(&mut store, id),
        Some(Commands::Remove { id }) => cmd_remove(&mut store, id),
        Some(Commands::Categories) => {
            cmd_categories(&mut store);
            Ok(())
        }
        Some(Commands::Reset { force }) => cmd_reset(&mut store, force),
        Some(Commands::Completions { shell }) => {
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "powershell" => Shell::PowerShell,
                "elvish" => Shell::Elvish,
                _ => {
                    eprintln!("Unsupported shell: {}", shell);
                    return ExitCode::FAILURE;
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "taskdue", &mut io::stdout());
            Ok(())
        }
        Some(Commands::Ui) | None => {
            if let Err(e) = run_tui(store, config.tick_rate) {
                eprintln!("Error running TUI: {}", e);
                return ExitCode::FAILURE;
            }
            Ok(())
        }
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "command failed");
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
