//! xcrud — build and run dual-mode insert statements
//!
//! # Usage
//!
//! ```bash
//! # Show the SQL for a request
//! xcrud build request.json
//!
//! # Fetch id variables from the server, build and execute
//! xcrud exec request.json --database-url mysql://root@localhost/shop
//! ```

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use xcrud::prelude::*;

#[derive(Parser)]
#[command(name = "xcrud")]
#[command(version)]
#[command(about = "Build INSERT statements for tables and document collections", long_about = None)]
#[command(after_help = "EXAMPLES:
    xcrud build books.json
    xcrud build books.json --prefix 7 --offset 1 --increment 2
    xcrud exec books.json --database-url mysql://root@localhost/shop")]
struct Cli {
    /// Path to xcrud.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database connection URL
    #[arg(long, env = "XCRUD_DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the statement without a server
    Build {
        /// Insert request (JSON)
        request: PathBuf,
        /// Document id unique prefix
        #[arg(long, default_value_t = 0)]
        prefix: u16,
        /// auto_increment_offset
        #[arg(long, default_value_t = 1)]
        offset: u16,
        /// auto_increment_increment
        #[arg(long, default_value_t = 1)]
        increment: u16,
    },
    /// Build the statement with server variables and execute it
    Exec {
        /// Insert request (JSON)
        request: PathBuf,
    },
    /// Describe a request
    Explain {
        /// Insert request (JSON)
        request: PathBuf,
    },
}

/// Hands out `prefix | start time | serial` ids, the serial stepping by
/// `auto_increment_increment` from `auto_increment_offset`.
struct SequenceIdGenerator {
    timestamp: u32,
    serial: u64,
}

impl SequenceIdGenerator {
    fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        Self {
            timestamp,
            serial: 0,
        }
    }
}

impl DocumentIdGenerator for SequenceIdGenerator {
    fn generate(&mut self, v: &Variables) -> String {
        self.serial = if self.serial == 0 {
            u64::from(v.offset.max(1))
        } else {
            self.serial + u64::from(v.increment.max(1))
        };
        format!("{:04x}{:08x}{:016x}", v.prefix, self.timestamp, self.serial)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let directive = if cli.verbose { "xcrud=debug" } else { "xcrud=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::discover(cli.config.as_deref())?;

    match &cli.command {
        Commands::Build {
            request,
            prefix,
            offset,
            increment,
        } => {
            let request = load_request(request)?;
            let mut session = FixedSession::new(vec![vec![
                FieldValue::UInt(u64::from(*prefix)),
                FieldValue::UInt(u64::from(*offset)),
                FieldValue::UInt(u64::from(*increment)),
            ]]);
            let stmt = insert(
                &mut session,
                &mut SequenceIdGenerator::new(),
                &request,
                &config.builder,
            )?;
            print_statement(&stmt, &cli.format, None)?;
        }
        Commands::Exec { request } => {
            let request = load_request(request)?;
            let url = cli
                .database_url
                .clone()
                .or(config.database.url.clone())
                .context("No database URL. Use --database-url, XCRUD_DATABASE_URL or xcrud.toml")?;
            if cli.verbose {
                println!("{} {}", "Connecting to:".dimmed(), url);
            }
            let db = Database::connect(&url).await?;
            // Variables and the insert must see the same server session.
            let mut session = db.acquire().await?;
            let stmt = insert(
                &mut session,
                &mut SequenceIdGenerator::new(),
                &request,
                &config.builder,
            )?;
            let affected = session.execute(&stmt.sql).await?;
            print_statement(&stmt, &cli.format, Some(affected))?;
        }
        Commands::Explain { request } => explain_request(&load_request(request)?),
    }
    Ok(())
}

fn load_request(path: &Path) -> anyhow::Result<InsertRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let request = xcrud::parse(&content)
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(request)
}

fn print_statement(
    stmt: &InsertStatement,
    format: &OutputFormat,
    affected: Option<u64>,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let mut value = serde_json::to_value(stmt)?;
            if let Some(n) = affected {
                value["rows_affected"] = n.into();
            }
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("{}", "Generated SQL:".green().bold());
            println!("{}", stmt.sql.white());
            if !stmt.document_ids.is_empty() {
                println!();
                println!("{}", "Generated document ids:".cyan());
                for id in &stmt.document_ids {
                    println!("  {}", id.yellow());
                }
            }
            if let Some(n) = affected {
                println!();
                println!("{} {} rows affected", "✓".green(), n);
            }
        }
    }
    Ok(())
}

fn explain_request(request: &InsertRequest) {
    println!("{}", "Insert Request".cyan().bold());
    println!();
    let target = match &request.collection.schema {
        Some(schema) => format!("{}.{}", schema, request.collection.name),
        None => request.collection.name.clone(),
    };
    println!("  {} {}", "Target:".dimmed(), target.white());
    println!(
        "  {} {}",
        "Data model:".dimmed(),
        request.data_model.to_string().cyan()
    );
    if !request.projection.is_empty() {
        println!("  {}", "Projection:".dimmed());
        for col in &request.projection {
            println!("    • {}", col.name.white());
        }
    }
    println!("  {} {}", "Rows:".dimmed(), request.rows.len());
    for (i, row) in request.rows.iter().enumerate() {
        println!("    [{}] {} field(s)", i, row.fields.len());
    }
    if !request.args.is_empty() {
        println!("  {} {}", "Bound args:".dimmed(), request.args.len());
    }
    println!(
        "  {} {}",
        "Upsert:".dimmed(),
        if request.upsert { "yes".yellow() } else { "no".normal() }
    );
}
