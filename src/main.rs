use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todostore::{Backend, Config, Task, TaskListStore, Theme, ThemePreference};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - A to-do list kept in a durable key-value store")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the store (overrides the config file)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend (overrides the config file)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show all tasks
    List,

    /// Add a task
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Flip a task between open and done
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Replace a task's text; empty text deletes the task
    Edit {
        /// Task id or unique id prefix
        id: String,
        text: Vec<String>,
    },

    /// Delete a task
    Delete {
        /// Task id or unique id prefix
        id: String,
    },

    /// Show or change the light/dark preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
    Set { theme: Theme },
}

fn main() -> Result<()> {
    // Task output goes to stdout; only warnings and errors reach stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?.with_overrides(cli.store_path, cli.backend);
    let durable = config.open_durable()?;

    match cli.command.unwrap_or(Commands::List) {
        Commands::Theme { action } => {
            let mut pref = ThemePreference::load(durable);
            let theme = match action.unwrap_or(ThemeAction::Show) {
                ThemeAction::Show => pref.current(),
                ThemeAction::Toggle => pref.toggle(),
                ThemeAction::Set { theme } => pref.set(theme),
            };
            println!("{}", theme);
        }
        command => {
            let mut store = TaskListStore::load(durable);
            match command {
                Commands::List | Commands::Theme { .. } => {}
                Commands::Add { text } => {
                    store.add(&text.join(" "));
                }
                Commands::Toggle { id } => {
                    let id = store.resolve_id(&id)?;
                    store.toggle_completed(&id);
                }
                Commands::Edit { id, text } => {
                    let id = store.resolve_id(&id)?;
                    store.start_edit(&id);
                    store.set_edit_text(&text.join(" "));
                    store.commit_edit();
                }
                Commands::Delete { id } => {
                    let id = store.resolve_id(&id)?;
                    store.delete(&id);
                }
            }
            print_tasks(store.tasks());
        }
    }

    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks yet.".dimmed());
        return;
    }

    for task in tasks {
        let id = task.id.as_str();
        if task.completed {
            println!("[x] {} {}", id.cyan(), task.text.strikethrough().dimmed());
        } else {
            println!("[ ] {} {}", id.cyan(), task.text);
        }
    }
}
