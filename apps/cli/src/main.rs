use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{EditOutcome, HttpTodoStore, TodoListController};
use shared::domain::{FilterMode, TodoId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{load_settings, DEFAULT_CONFIG_FILE};

#[derive(Parser, Debug)]
#[command(name = "todos", about = "Manage a remote todo list")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    user_id: Option<i64>,
    /// Which todos to print after the command runs.
    #[arg(long, global = true, default_value_t = FilterMode::All)]
    filter: FilterMode,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Add {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    Toggle {
        id: i64,
    },
    /// Renames a todo; an empty title deletes it.
    Edit {
        id: i64,
        title: String,
    },
    Delete {
        id: i64,
    },
    ClearCompleted,
    ToggleAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    if let Some(user_id) = cli.user_id {
        settings.user_id = Some(user_id);
    }

    let store_config = settings.store_config()?;
    info!(api_url = %store_config.base_url, owner = %store_config.owner, "using todo store");
    let store = HttpTodoStore::new(store_config).context("failed to build http client")?;
    let controller = TodoListController::new(Arc::new(store));
    controller.set_filter(cli.filter);

    if let Err(err) = controller.load().await {
        print!("{}", render::render(&controller.snapshot()));
        return Err(err).context("could not load todos");
    }

    let result = execute(&controller, cli.command).await;
    print!("{}", render::render(&controller.snapshot()));
    result
}

async fn execute(controller: &TodoListController, command: Command) -> Result<()> {
    match command {
        Command::List => {}
        Command::Add { title } => {
            controller.add_item(&title.join(" ")).await?;
        }
        Command::Toggle { id } => {
            controller.toggle_item(TodoId(id)).await?;
        }
        Command::Edit { id, title } => {
            controller.begin_edit(TodoId(id))?;
            controller.set_draft(&title)?;
            match controller.submit_edit().await? {
                EditOutcome::Unchanged => info!(id, "title unchanged"),
                EditOutcome::Renamed(todo) => info!(id, title = %todo.title, "renamed todo"),
                EditOutcome::Removed => info!(id, "empty title, todo deleted"),
                EditOutcome::Busy => bail!("todo {id} is busy, try again"),
            }
        }
        Command::Delete { id } => {
            if !controller.remove_item(TodoId(id)).await {
                bail!("could not delete todo {id}");
            }
        }
        Command::ClearCompleted => {
            let outcome = controller.clear_completed().await;
            if outcome.failed > 0 {
                bail!(
                    "{} of {} completed todos could not be removed",
                    outcome.failed,
                    outcome.failed + outcome.succeeded
                );
            }
        }
        Command::ToggleAll => {
            let outcome = controller.toggle_all().await;
            if outcome.failed > 0 {
                bail!(
                    "{} of {} todos could not be updated",
                    outcome.failed,
                    outcome.failed + outcome.succeeded
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_filter_after_subcommand() {
        let cli = Cli::try_parse_from(["todos", "--user-id", "3", "list", "--filter", "completed"])
            .expect("parse");
        assert_eq!(cli.filter, FilterMode::Completed);
        assert_eq!(cli.user_id, Some(3));
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn add_joins_words_into_one_title() {
        let cli = Cli::try_parse_from(["todos", "add", "buy", "oat", "milk"]).expect("parse");
        match cli.command {
            Command::Add { title } => assert_eq!(title.join(" "), "buy oat milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn edit_accepts_empty_title() {
        let cli = Cli::try_parse_from(["todos", "edit", "4", ""]).expect("parse");
        assert!(matches!(cli.command, Command::Edit { id: 4, ref title } if title.is_empty()));
    }

    #[test]
    fn rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["todos", "--filter", "done", "list"]).is_err());
    }
}
