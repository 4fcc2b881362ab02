//! Run orchestration: one task per table, bounded by a semaphore, feeding the output writer

mod writer;

pub use writer::*;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::catalog::CatalogReader;
use crate::config::ReverseConfig;
use crate::error::{ErrorScope, ReverseError, Result};
use crate::reverse::{synthesize, DdlBundle, TableRequest, VersionInfo};

/// A table whose synthesis failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    pub table: String,
    pub error: String,
}

/// What a run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Tables selected for the run
    pub tables: usize,
    pub succeeded: usize,
    pub failed: Vec<TableFailure>,
    /// Tables not scheduled because the run stopped early
    pub skipped: usize,
    pub warnings: usize,
    /// Files written; `None` for a dry run
    pub outputs: Option<OutputPaths>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }
}

/// Reverses every selected table of one schema
pub struct Reverser {
    config: Arc<ReverseConfig>,
}

impl Reverser {
    pub fn new(config: ReverseConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ReverseConfig {
        &self.config
    }

    /// Synthesize every selected table and write the three output files
    ///
    /// Table-scope errors are recorded in the summary. A run-scope error stops
    /// scheduling and is returned once the tasks already running have finished.
    pub async fn run(&self, catalog: Arc<dyn CatalogReader>) -> Result<RunSummary> {
        let config = &self.config;
        let schema = config.source_schema.as_str();

        let version = Arc::new(VersionInfo::parse(&catalog.target_version().await?));
        info!(
            "Reversing oracle schema {} into {} (target version {}, tidb={})",
            schema,
            config.target_schema(),
            version.raw,
            version.is_tidb
        );

        let all_tables = catalog.table_names(schema).await?;
        let tables = filter_tables(all_tables, &config.include_tables, &config.exclude_tables);
        info!("Selected {} tables", tables.len());

        let (sinks, outputs) = if config.dry_run {
            info!("Dry run, nothing will be written");
            (OutputSinks::discard(), None)
        } else {
            tokio::fs::create_dir_all(&config.output_dir).await?;
            let paths = OutputPaths::new(&config.output_dir, schema);
            (OutputSinks::create(&paths).await?, Some(paths))
        };
        let (tx, writer) = spawn_writer(WriterActor::new(sinks), config.threads * 2);

        let semaphore = Arc::new(Semaphore::new(config.threads));
        let stop = Arc::new(AtomicBool::new(false));
        let mut handles = Vec::with_capacity(tables.len());

        for (seq, table) in tables.iter().enumerate() {
            if stop.load(Ordering::SeqCst) {
                warn!("Run stopped, not scheduling remaining tables");
                break;
            }
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            // A task finishing while we waited for the permit may have stopped the run
            if stop.load(Ordering::SeqCst) {
                break;
            }

            let config = self.config.clone();
            let version = version.clone();
            let catalog = catalog.clone();
            let stop = stop.clone();
            let tx = tx.clone();
            let name = table.clone();

            let handle = tokio::spawn(async move {
                let result = reverse_one(&config, &version, catalog.as_ref(), &name).await;

                let message = match &result {
                    Ok(bundle) => Ok(bundle.clone()),
                    Err(e) => {
                        error!("Table {} failed: {}", name, e);
                        if e.scope() == ErrorScope::Run || config.fail_fast {
                            stop.store(true, Ordering::SeqCst);
                        }
                        Err(e.to_string())
                    }
                };
                // Released only after the stop flag is set, so the scheduler sees it
                drop(permit);

                let outcome = TableOutcome {
                    seq,
                    table: name.clone(),
                    result: message,
                };
                if tx.send(outcome).await.is_err() {
                    warn!("Output writer stopped before table {} was written", name);
                }
                result
            });
            handles.push((table.clone(), handle));
        }
        drop(tx);

        let mut summary = RunSummary {
            tables: tables.len(),
            skipped: tables.len() - handles.len(),
            ..Default::default()
        };
        let mut run_error = None;

        for (table, handle) in handles {
            match handle.await {
                Ok(Ok(bundle)) => {
                    info!(
                        "Table {} done: {} primary, {} compatibility statements",
                        table,
                        bundle.primary.len() + 1,
                        bundle.compatibility_count()
                    );
                    summary.succeeded += 1;
                    summary.warnings += bundle.warnings.len();
                }
                Ok(Err(e)) => {
                    summary.failed.push(TableFailure {
                        table,
                        error: e.to_string(),
                    });
                    if e.scope() == ErrorScope::Run && run_error.is_none() {
                        run_error = Some(e);
                    }
                }
                Err(e) => {
                    error!("Table {} task aborted: {}", table, e);
                    summary.failed.push(TableFailure {
                        table,
                        error: e.to_string(),
                    });
                }
            }
        }

        match writer.await {
            Ok(result) => result?,
            Err(e) => return Err(ReverseError::Io(std::io::Error::other(e))),
        }

        if let Some(e) = run_error {
            return Err(e);
        }

        if let Some(paths) = &outputs {
            info!("Reverse SQL written to {}", paths.primary.display());
            info!("Compatibility SQL written to {}", paths.compatibility.display());
            info!("Run log written to {}", paths.log.display());
        }
        info!(
            "Reverse finished: {} succeeded, {} failed, {} skipped",
            summary.succeeded,
            summary.failed.len(),
            summary.skipped
        );

        summary.outputs = outputs;
        Ok(summary)
    }

    /// Synthesize one table without writing anything
    pub async fn reverse_table(&self, catalog: &dyn CatalogReader, table: &str) -> Result<DdlBundle> {
        let version = VersionInfo::parse(&catalog.target_version().await?);
        reverse_one(&self.config, &version, catalog, table).await
    }
}

async fn reverse_one(
    config: &ReverseConfig,
    version: &VersionInfo,
    catalog: &dyn CatalogReader,
    table: &str,
) -> Result<DdlBundle> {
    let metadata = catalog.table(&config.source_schema, table).await?;
    let target_table = config.target_table(&metadata.table_name);
    let request = TableRequest {
        source_schema: &config.source_schema,
        target_schema: config.target_schema(),
        target_table: &target_table,
        table_option: &config.table_option,
        catalog: &metadata,
        rules: config.override_rules(),
        version,
    };
    synthesize(&request)
}

/// Filter table names by include/exclude lists (case-insensitive)
pub fn filter_tables(tables: Vec<String>, include: &str, exclude: &str) -> Vec<String> {
    let include_all = include.trim() == "*" || include.trim().is_empty();
    let include_set: HashSet<String> = if include_all {
        HashSet::new()
    } else {
        include.split(',').map(|s| s.trim().to_uppercase()).collect()
    };
    let exclude_set: HashSet<String> = exclude
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect();

    tables
        .into_iter()
        .filter(|t| {
            let name = t.to_uppercase();
            let included = include_all || include_set.contains(&name);
            let excluded = exclude_set.contains(&name);
            included && !excluded
        })
        .collect()
}
