use anyhow::Context;
use clap::{Parser, Subcommand};
use kalium_incident_tracker::{
    config::Config,
    error::AppError,
    forms::{ContentBlockForm, IncidentForm},
    models::{Attachment, IncidentPatch, IncidentStatus, NewContentBlock, Settings},
    query::{IncidentQuery, IncidentStats, PriorityFilter, QueryEngine, SortMode, StatusFilter},
    state::{create_backend, StorageKeys, Store},
};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "kalium")]
#[command(about = "Kalium Network incident tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// File a new incident report
    Report {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        description: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        server: String,

        #[arg(short, long)]
        priority: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        discord: Option<String>,
    },

    /// List incidents
    List {
        /// Free-text search over every field
        #[arg(short, long, default_value = "")]
        query: String,

        #[arg(long, default_value = "all")]
        status: StatusFilter,

        #[arg(long, default_value = "all")]
        priority: PriorityFilter,

        #[arg(long, default_value = "by-date")]
        sort: SortMode,
    },

    /// Show one incident
    Show {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,
    },

    /// Edit incident fields
    Update {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        priority: Option<String>,
    },

    /// Move an incident to another status
    Status {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,

        /// open, in_progress, resolved or closed
        status: IncidentStatus,
    },

    /// Delete an incident
    Delete {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,
    },

    /// Attach a file reference to an incident
    Attach {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,

        #[arg(long)]
        name: String,

        #[arg(long, default_value = "application/octet-stream")]
        mime_type: String,

        #[arg(long, default_value = "0")]
        size: u64,

        #[arg(long)]
        url: String,
    },

    /// Remove an attachment
    Detach {
        #[arg(value_name = "INCIDENT_ID")]
        id: Uuid,

        #[arg(value_name = "ATTACHMENT_ID")]
        attachment_id: Uuid,
    },

    /// Counters per status and priority
    Stats,

    /// Manage Markdown content blocks
    Blocks {
        #[command(subcommand)]
        command: BlockCommands,
    },

    /// Manage the category, server and priority vocabulary
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

#[derive(Subcommand)]
enum BlockCommands {
    List,

    New {
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        body: Option<String>,
    },

    Edit {
        #[arg(value_name = "BLOCK_ID")]
        id: Uuid,

        #[arg(long)]
        title: String,

        #[arg(long)]
        body: String,
    },

    Delete {
        #[arg(value_name = "BLOCK_ID")]
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,

    /// Replace the vocabulary; omitted lists keep their current values
    Set {
        #[arg(long, value_delimiter = ',')]
        categories: Option<Vec<String>>,

        #[arg(long, value_delimiter = ',')]
        servers: Option<Vec<String>>,

        /// Ascending severity
        #[arg(long, value_delimiter = ',')]
        priorities: Option<Vec<String>>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    let backend = create_backend(&config.storage).context("opening storage backend")?;
    let store = Arc::new(Store::open(
        backend,
        StorageKeys::with_prefix(&config.storage.key_prefix),
        config.settings.clone(),
    ));

    run(cli.command, &store)?;

    let failures = store.persist_failures();
    if failures > 0 {
        anyhow::bail!("{} write(s) to storage failed; changes were not saved", failures);
    }
    Ok(())
}

fn init_tracing(config: &Config) {
    let json = config.observability.json_logs;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "kalium_incident_tracker={0},kalium={0}",
                    config.observability.log_level
                )
                .into()
            }),
        )
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn run(command: Commands, store: &Store) -> anyhow::Result<()> {
    match command {
        Commands::Report {
            title,
            description,
            category,
            server,
            priority,
            email,
            discord,
        } => {
            let fields = IncidentForm {
                title,
                description,
                category,
                server,
                priority,
                email,
                discord,
                attachments: Vec::new(),
            }
            .into_new_incident()?;

            warn_unknown_labels(&store.settings(), &fields.category, &fields.server, &fields.priority);
            print_json(&store.create_incident(fields))?;
        }

        Commands::List {
            query,
            status,
            priority,
            sort,
        } => {
            let mut engine = QueryEngine::new(
                IncidentQuery::new()
                    .with_text(query.trim())
                    .with_status(status)
                    .with_priority(priority)
                    .with_sort(sort),
            );
            print_json(&engine.view(store))?;
        }

        Commands::Show { id } => {
            let incident = store.incident(&id).ok_or_else(|| incident_not_found(&id))?;
            print_json(&incident)?;
        }

        Commands::Update {
            id,
            title,
            description,
            category,
            server,
            priority,
        } => {
            let patch = IncidentPatch {
                title,
                description,
                category,
                server,
                priority,
                ..Default::default()
            };
            let incident = store
                .update_incident(&id, patch)
                .ok_or_else(|| incident_not_found(&id))?;
            print_json(&incident)?;
        }

        Commands::Status { id, status } => {
            let incident = store
                .set_status(&id, status)
                .ok_or_else(|| incident_not_found(&id))?;
            print_json(&incident)?;
        }

        Commands::Delete { id } => {
            if !store.delete_incident(&id) {
                return Err(incident_not_found(&id).into());
            }
            println!("Deleted incident {}", id);
        }

        Commands::Attach {
            id,
            name,
            mime_type,
            size,
            url,
        } => {
            let attachment = Attachment::new(name, mime_type, size, url);
            let incident = store
                .add_attachment(&id, attachment)
                .ok_or_else(|| incident_not_found(&id))?;
            print_json(&incident)?;
        }

        Commands::Detach { id, attachment_id } => {
            if !store.remove_attachment(&id, &attachment_id) {
                return Err(AppError::NotFound(format!(
                    "Attachment {} on incident {}",
                    attachment_id, id
                ))
                .into());
            }
            println!("Removed attachment {}", attachment_id);
        }

        Commands::Stats => {
            let stats = store.with_incidents(|snapshot| IncidentStats::collect(snapshot.incidents));
            print_json(&stats)?;
        }

        Commands::Blocks { command } => match command {
            BlockCommands::List => print_json(&store.content_blocks())?,

            BlockCommands::New { title, body } => {
                print_json(&store.create_content_block(NewContentBlock { title, body }))?
            }

            BlockCommands::Edit { id, title, body } => {
                let patch = ContentBlockForm { title, body }.into_patch()?;
                let block = store
                    .update_content_block(&id, patch)
                    .ok_or_else(|| AppError::NotFound(format!("Content block {}", id)))?;
                print_json(&block)?;
            }

            BlockCommands::Delete { id } => {
                if !store.delete_content_block(&id) {
                    return Err(AppError::NotFound(format!("Content block {}", id)).into());
                }
                println!("Deleted content block {}", id);
            }
        },

        Commands::Settings { command } => match command {
            SettingsCommands::Show => print_json(&store.settings())?,

            SettingsCommands::Set {
                categories,
                servers,
                priorities,
            } => {
                let current = store.settings();
                let settings = Settings {
                    categories: categories.unwrap_or(current.categories),
                    servers: servers.unwrap_or(current.servers),
                    priorities: priorities.unwrap_or(current.priorities),
                };
                store.update_settings(settings);
                print_json(&store.settings())?;
            }
        },
    }

    Ok(())
}

fn incident_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Incident {}", id))
}

/// Labels outside the vocabulary are accepted but will not rank or filter as expected
fn warn_unknown_labels(settings: &Settings, category: &str, server: &str, priority: &str) {
    if !settings.categories.iter().any(|c| c == category) {
        tracing::warn!(category, "Category is not in the configured vocabulary");
    }
    if !settings.servers.iter().any(|s| s == server) {
        tracing::warn!(server, "Server is not in the configured vocabulary");
    }
    if settings.priority_rank(priority).is_none() {
        tracing::warn!(priority, "Priority is not in the configured vocabulary and will sort last");
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
