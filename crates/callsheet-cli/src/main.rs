//! Callsheet - contact list ingestion and agent distribution CLI
//!
//! The `callsheet` command uploads contact spreadsheets and spreads them
//! across the agent pool.
//!
//! ## Commands
//!
//! - `upload`: Ingest a csv/xls/xlsx file and assign its contacts
//! - `agents`: List or register agents
//! - `lists`: Show stored contacts grouped by agent
//! - `redistribute`: Rebalance all contacts evenly over the current pool

use anyhow::{Context, Result};
use callsheet_core::{
    DistributedContact, DistributionService, EngineConfig, EngineError, UploadMode,
    UploadOutcome, METRICS,
};
use callsheet_state::SurrealRoster;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "callsheet")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Contact list ingestion and agent distribution", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Minimum pool size enforced on upload
    #[arg(long, global = true, env = "CALLSHEET_MIN_AGENTS")]
    min_agents: Option<usize>,

    /// Name prefix for placeholder agents
    #[arg(long, global = true, env = "CALLSHEET_AGENT_PREFIX")]
    agent_prefix: Option<String>,

    /// Whether an upload replaces or extends the stored contacts
    #[arg(long, global = true, env = "CALLSHEET_UPLOAD_MODE")]
    upload_mode: Option<UploadMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a contact file and distribute it across agents
    Upload {
        /// Path to a .csv, .xls or .xlsx file
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Manage agents
    Agents {
        #[command(subcommand)]
        action: AgentAction,
    },

    /// Show distributed contacts grouped by agent
    Lists {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Rebalance every stored contact over the current pool
    Redistribute {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },
}

#[derive(Subcommand)]
enum AgentAction {
    /// List agents in registration order
    List,
    /// Register a new agent
    Add {
        /// Display name
        name: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::default();
        if let Some(min_agents) = self.min_agents {
            config = config.with_min_agents(min_agents);
        }
        if let Some(prefix) = &self.agent_prefix {
            config = config.with_placeholder_prefix(prefix.trim());
        }
        if let Some(mode) = self.upload_mode {
            config = config.with_upload_mode(mode);
        }
        config.validate().context("Invalid engine configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    callsheet_core::init_tracing(cli.json, level);

    let config = cli.engine_config()?;

    // Initialize database connection
    let store = SurrealRoster::from_env()
        .await
        .context("Failed to connect to Callsheet database")?;
    let service = DistributionService::new(Arc::new(store), config);

    let result = match cli.command {
        Commands::Upload { file, output } => cmd_upload(&service, &file, output).await,
        Commands::Agents { action } => match action {
            AgentAction::List => cmd_agents_list(&service).await,
            AgentAction::Add { name } => cmd_agents_add(&service, &name).await,
        },
        Commands::Lists { output } => cmd_lists(&service, output).await,
        Commands::Redistribute { output } => cmd_redistribute(&service, output).await,
    };

    METRICS.flush();
    result
}

/// Attach the stable reason code so scripts can match on it.
fn with_code(err: EngineError) -> anyhow::Error {
    let code = err.code();
    anyhow::Error::new(err).context(format!("[{}]", code))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Upload a contact file
async fn cmd_upload(service: &DistributionService, path: &Path, output: OutputFormat) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    info!("Uploading {}", path.display());
    let outcome = service
        .upload_reader(&file_name, BufReader::new(file))
        .await
        .map_err(with_code)?;

    match output {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => print!("{}", render_upload(&outcome, service.config())),
    }
    Ok(())
}

fn render_upload(outcome: &UploadOutcome, config: &EngineConfig) -> String {
    let mut out = format!(
        "Uploaded {} contacts from {} ({}), batch {}\n",
        outcome.contacts.len(),
        outcome.source_name,
        outcome.format,
        &outcome.batch_digest[..12.min(outcome.batch_digest.len())],
    );
    if outcome.dropped_rows > 0 {
        out.push_str(&format!(
            "Skipped {} rows without a first name or phone\n",
            outcome.dropped_rows
        ));
    }
    if outcome.pool_replaced {
        out.push_str(&format!(
            "Agent pool was below {}; replaced with {} placeholder agents\n",
            config.min_agents,
            outcome.agents.len()
        ));
    }
    for (agent, contacts) in group_by_agent(&outcome.contacts) {
        out.push_str(&format!("  {:<20} {}\n", agent, contacts.len()));
    }
    out
}

/// List agents
async fn cmd_agents_list(service: &DistributionService) -> Result<()> {
    let agents = service.agents().await.map_err(with_code)?;
    if agents.is_empty() {
        println!("No agents registered");
        return Ok(());
    }
    for agent in agents {
        println!("{}  {}", agent.id, agent.name);
    }
    Ok(())
}

/// Register an agent
async fn cmd_agents_add(service: &DistributionService, name: &str) -> Result<()> {
    let agent = service.add_agent(name).await.map_err(with_code)?;
    println!("Added agent {} ({})", agent.name, agent.id);
    Ok(())
}

/// Show contacts grouped by agent
async fn cmd_lists(service: &DistributionService, output: OutputFormat) -> Result<()> {
    let contacts = service.distributed_contacts().await.map_err(with_code)?;
    match output {
        OutputFormat::Json => print_json(&contacts)?,
        OutputFormat::Text => print!("{}", render_lists(&contacts)),
    }
    Ok(())
}

fn render_lists(contacts: &[DistributedContact]) -> String {
    let mut out = String::new();
    for (agent, group) in group_by_agent(contacts) {
        out.push_str(&format!("{} ({})\n", agent, group.len()));
        for entry in group {
            let c = &entry.contact;
            if c.notes.is_empty() {
                out.push_str(&format!("  {:<20} {}\n", c.first_name, c.phone));
            } else {
                out.push_str(&format!("  {:<20} {:<16} {}\n", c.first_name, c.phone, c.notes));
            }
        }
    }
    out
}

/// Rebalance contacts across the pool
async fn cmd_redistribute(service: &DistributionService, output: OutputFormat) -> Result<()> {
    let report = service.rebalance().await.map_err(with_code)?;
    match output {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            println!("{}", report.summary());
            for quota in &report.quotas {
                println!("  {:<20} {}", quota.agent_name, quota.count);
            }
        }
    }
    Ok(())
}

/// Group contacts by agent name, in first-seen order.
fn group_by_agent(contacts: &[DistributedContact]) -> Vec<(&str, Vec<&DistributedContact>)> {
    let mut groups: Vec<(&str, Vec<&DistributedContact>)> = Vec::new();
    for contact in contacts {
        let agent = contact.agent_name.as_deref().unwrap_or("(unassigned)");
        match groups.iter_mut().find(|(name, _)| *name == agent) {
            Some((_, members)) => members.push(contact),
            None => groups.push((agent, vec![contact])),
        }
    }
    groups
}
