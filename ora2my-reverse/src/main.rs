//! CLI entry point for ora2my-reverse

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ora2my_reverse::catalog::{CatalogReader, SnapshotCatalog};
use ora2my_reverse::config::ReverseConfig;
use ora2my_reverse::Reverser;

#[derive(Parser)]
#[command(name = "ora2my-reverse")]
#[command(about = "Synthesize MySQL/TiDB DDL from an Oracle catalog snapshot")]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the JSON catalog snapshot (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Oracle schema to reverse (overrides config)
    #[arg(short, long)]
    schema: Option<String>,

    /// MySQL schema name (overrides config, defaults to the Oracle schema)
    #[arg(long)]
    target_schema: Option<String>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of tables synthesized concurrently (overrides config)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Dry run - synthesize everything without writing files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reverse every selected table (default)
    Reverse,
    /// Print the DDL of one table to stdout
    Table {
        /// Oracle table name
        name: String,
    },
    /// Inspect the catalog snapshot (list tables with their counts)
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (before logging, so we can use config.log_level)
    let mut config = ReverseConfig::load(cli.config.as_deref())?;

    // Initialize logging
    // Priority: RUST_LOG env var > config.log_level > default (debug for dev, info for release)
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    let log_level = config.log_level.as_deref().unwrap_or(default_level);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    // Apply CLI overrides
    if let Some(catalog) = cli.catalog {
        config.catalog_file = catalog;
    }
    if let Some(schema) = cli.schema {
        config.source_schema = schema;
    }
    if let Some(target_schema) = cli.target_schema {
        config.target_schema = Some(target_schema);
    }
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(threads) = cli.threads {
        config.threads = threads;
    }
    if cli.dry_run {
        config.dry_run = true;
    }

    // Validate configuration
    config.validate()?;

    let catalog = SnapshotCatalog::from_file(&config.catalog_file)?;

    match cli.command {
        Some(Commands::Table { name }) => print_table(config, &catalog, &name).await,
        Some(Commands::Inspect) => inspect_catalog(&config, &catalog).await,
        Some(Commands::Reverse) | None => {
            info!("Reversing schema {} from {:?}", config.source_schema, config.catalog_file);
            let summary = Reverser::new(config).run(Arc::new(catalog)).await?;

            for failure in &summary.failed {
                eprintln!("FAILED {}: {}", failure.table, failure.error);
            }
            println!(
                "{} tables: {} succeeded, {} failed, {} skipped, {} warnings",
                summary.tables,
                summary.succeeded,
                summary.failed.len(),
                summary.skipped,
                summary.warnings
            );
            if !summary.is_success() {
                bail!("{} of {} tables were not reversed", summary.tables - summary.succeeded, summary.tables);
            }
            Ok(())
        }
    }
}

async fn print_table(config: ReverseConfig, catalog: &SnapshotCatalog, name: &str) -> Result<()> {
    let bundle = Reverser::new(config).reverse_table(catalog, name).await?;

    println!("{}", bundle.primary_sql());
    let compat = bundle.compatibility_sql();
    if !compat.is_empty() {
        println!("-- compatibility");
        println!("{}", compat);
    }
    for warning in &bundle.warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(())
}

async fn inspect_catalog(config: &ReverseConfig, catalog: &SnapshotCatalog) -> Result<()> {
    println!(
        "Schema {} (target version {})\n",
        catalog.schema,
        catalog.target_version().await?
    );

    let names = catalog.table_names(&config.source_schema).await?;
    println!("{} tables:\n", names.len());
    for name in &names {
        let table = catalog.table(&config.source_schema, name).await?;
        println!("Table: {}", table.table_name);
        println!("  Columns:     {}", table.columns.len());
        println!("  Constraints: {}", table.constraint_count());
        println!("  Indexes:     {}", table.index_count());
        for col in &table.columns {
            let nullable = if col.is_nullable() { "NULL" } else { "NOT NULL" };
            println!("    - {} {} {}", col.column_name, col.data_type, nullable);
        }
        println!();
    }

    Ok(())
}
