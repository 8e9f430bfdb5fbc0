//! SimpleTodo CLI - list, add, edit and delete to-do items

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use simpletodo::config::{self, TodoConfig};
use simpletodo::output::{json_failure, json_success, OutputMode};
use simpletodo::{contract, ui};
use simpletodo::{ChangeBus, ContentUri, ItemFields, Priority, SqliteStore, Status, TodoProvider};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "simpletodo")]
#[command(version)]
#[command(about = "Simple to-do list backed by SQLite")]
#[command(long_about = r#"
SimpleTodo keeps a single list of to-do items in a local SQLite file.
Every item is addressed by a content URI:
  content://com.codepath.simpletodo/todo      the whole list
  content://com.codepath.simpletodo/todo/3    item 3

Example usage:
  simpletodo add --name "Buy milk" --priority high
  simpletodo list --status todo
  simpletodo edit 1 --status done
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default simpletodo.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// List items
    List {
        /// Only show items with this status (todo, in_progress, done)
        #[arg(short, long)]
        status: Option<String>,

        /// Column to sort by
        #[arg(long, default_value = "_id")]
        sort: String,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Show a single item
    Show {
        id: i64,
    },

    /// Add a new item
    Add {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'N', long)]
        notes: Option<String>,

        /// low, medium or high
        #[arg(short, long)]
        priority: Option<String>,

        /// todo, in_progress or done
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Change fields of an existing item
    Edit {
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 'N', long)]
        notes: Option<String>,

        #[arg(short, long)]
        priority: Option<String>,

        #[arg(short, long)]
        status: Option<String>,
    },

    /// Delete a single item
    Delete {
        id: i64,
    },

    /// Delete every item
    DeleteAll {
        /// Confirm deleting everything
        #[arg(long)]
        yes: bool,
    },

    /// Insert a sample item
    Seed,

    /// Print the type string for a content URI
    Type {
        uri: String,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::List { .. } => "list",
            Commands::Show { .. } => "show",
            Commands::Add { .. } => "add",
            Commands::Edit { .. } => "edit",
            Commands::Delete { .. } => "delete",
            Commands::DeleteAll { .. } => "delete-all",
            Commands::Seed => "seed",
            Commands::Type { .. } => "type",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let command_name = cli.command.name();

    if let Err(err) = run(cli) {
        if output_mode.is_human() {
            ui::error(&format!("{:#}", err));
        } else {
            match json_failure(command_name, &format!("{:#}", err)) {
                Ok(json) => println!("{}", json),
                Err(_) => eprintln!("{:#}", err),
            }
        }

        let invalid = err
            .downcast_ref::<simpletodo::Error>()
            .is_some_and(simpletodo::Error::is_invalid_argument);
        std::process::exit(if invalid { 2 } else { 1 });
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = config::load_config(cli.config.as_deref())?;
    init_logging(cli.verbose, settings.as_ref());

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };

    let open = || open_provider(cli.database.as_deref(), settings.as_ref());

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.clone().unwrap_or_else(config::default_config_path);
            run_init(&path, cli.database.as_deref(), force, output_mode)?;
        }

        Commands::List { status, sort, desc } => {
            if !contract::is_known_column(&sort) {
                anyhow::bail!("cannot sort by unknown column {}", sort);
            }
            let order = format!("{} {}", sort, if desc { "DESC" } else { "ASC" });
            let provider = open()?;

            let items = match status {
                Some(s) => {
                    let status: Status = s.parse()?;
                    let code = status.code().to_string();
                    provider.items(Some("status = ?"), &[code.as_str()], Some(order.as_str()))?
                }
                None => provider.items(None, &[], Some(order.as_str()))?,
            };

            if output_mode.is_human() {
                if items.is_empty() {
                    ui::empty("No items.");
                } else {
                    println!("{}", ui::items_table(&items));
                }
            } else {
                println!("{}", json_success("list", &items)?);
            }
        }

        Commands::Show { id } => {
            let provider = open()?;
            let item = provider
                .item(id)?
                .ok_or_else(|| anyhow::anyhow!("no item with id {}", id))?;

            if output_mode.is_human() {
                ui::header(&ContentUri::item(id).to_uri_string());
                println!("{}", ui::item_detail_table(&item));
            } else {
                println!("{}", json_success("show", &item)?);
            }
        }

        Commands::Add { name, notes, priority, status } => {
            let provider = open()?;
            let fields = parse_fields(name, notes, priority, status)?;
            if fields.is_blank() {
                ui::warn("Nothing to save: every field is blank.");
                return Ok(());
            }

            match provider.insert(&ContentUri::collection(), &fields.to_values())? {
                Some(uri) => {
                    if output_mode.is_human() {
                        ui::item_added(&uri.to_uri_string());
                        ui::success("Item saved");
                    } else {
                        let data = serde_json::json!({ "uri": uri, "id": uri.parse_id() });
                        println!("{}", json_success("add", data)?);
                    }
                }
                None => anyhow::bail!("Error with saving item"),
            }
        }

        Commands::Edit { id, name, notes, priority, status } => {
            let provider = open()?;
            let fields = parse_fields(name, notes, priority, status)?;
            let uri = ContentUri::item(id);
            let rows = provider.update(&uri, &fields.to_values(), None, &[])?;

            if rows == 0 && fields != ItemFields::default() {
                anyhow::bail!("Error with updating item {}", id);
            }
            if output_mode.is_human() {
                if rows == 0 {
                    ui::empty("Nothing to change.");
                } else {
                    ui::item_updated(&uri.to_uri_string());
                    ui::success("Item updated");
                }
            } else {
                println!("{}", json_success("edit", serde_json::json!({ "uri": uri, "rows": rows }))?);
            }
        }

        Commands::Delete { id } => {
            let provider = open()?;
            let uri = ContentUri::item(id);
            let rows = provider.delete(&uri, None, &[])?;
            if rows == 0 {
                anyhow::bail!("Error with deleting item {}", id);
            }

            if output_mode.is_human() {
                ui::item_deleted(&uri.to_uri_string());
                ui::success("Item deleted");
            } else {
                println!("{}", json_success("delete", serde_json::json!({ "uri": uri, "rows": rows }))?);
            }
        }

        Commands::DeleteAll { yes } => {
            if !yes {
                anyhow::bail!("refusing to delete every item without --yes");
            }
            let provider = open()?;
            let rows = provider.delete(&ContentUri::collection(), None, &[])?;
            tracing::info!("{} rows deleted from todo database", rows);

            if output_mode.is_human() {
                ui::item_deleted(&format!("{} item(s)", rows));
            } else {
                println!("{}", json_success("delete-all", serde_json::json!({ "rows": rows }))?);
            }
        }

        Commands::Seed => {
            let provider = open()?;
            let fields = ItemFields::new("Sample Task")
                .notes("Notes")
                .priority(Priority::Low)
                .status(Status::Todo);
            let uri = provider
                .insert(&ContentUri::collection(), &fields.to_values())?
                .ok_or_else(|| anyhow::anyhow!("Error with saving sample item"))?;

            if output_mode.is_human() {
                ui::item_added(&uri.to_uri_string());
            } else {
                println!("{}", json_success("seed", serde_json::json!({ "uri": uri }))?);
            }
        }

        Commands::Type { uri } => {
            let provider = open()?;
            let parsed = ContentUri::parse(&uri)?;
            let mime = match provider.get_type(&parsed) {
                Ok(mime) => mime,
                Err(simpletodo::Error::IllegalState(_)) => {
                    return Err(simpletodo::Error::InvalidArgument(format!("Unknown URI {}", uri)).into());
                }
                Err(e) => return Err(e.into()),
            };

            if output_mode.is_human() {
                println!("{}", mime);
            } else {
                println!("{}", json_success("type", serde_json::json!({ "uri": parsed, "type": mime }))?);
            }
        }
    }

    Ok(())
}

fn run_init(path: &Path, database: Option<&Path>, force: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let database = database
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config::default_database_path_in(Path::new(".")));
    let settings = TodoConfig {
        database: Some(database.to_string_lossy().to_string()),
        log_level: Some("warn".to_string()),
    };
    config::write_config(path, &settings, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
        ui::info("Database", &database.display().to_string());
    } else {
        println!("{}", json_success("init", serde_json::json!({ "config": path, "database": database }))?);
    }
    Ok(())
}

fn open_provider(database: Option<&Path>, settings: Option<&TodoConfig>) -> anyhow::Result<TodoProvider> {
    let cwd = std::env::current_dir()?;
    let db_path = config::resolve_database_path(database, settings, &cwd);
    config::ensure_db_dir(&db_path)?;
    tracing::debug!("Using database {}", db_path.display());

    Ok(TodoProvider::new(Arc::new(SqliteStore::new(&db_path)), Arc::new(ChangeBus::new())))
}

fn parse_fields(
    name: Option<String>,
    notes: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> anyhow::Result<ItemFields> {
    Ok(ItemFields {
        name,
        notes,
        priority: priority.map(|p| p.parse::<Priority>()).transpose()?,
        status: status.map(|s| s.parse::<Status>()).transpose()?,
    })
}

fn init_logging(verbose: bool, settings: Option<&TodoConfig>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(settings.and_then(|c| c.log_level.as_deref()).unwrap_or("warn"))
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
