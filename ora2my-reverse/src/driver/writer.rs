//! Single-writer output actor
//!
//! Table tasks finish in any order. They send their outcome to one writer
//! task, which holds outcomes back until every earlier sequence number has
//! arrived, so the three output files always list tables in catalog order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::Result;
use crate::reverse::DdlBundle;

/// Boxed byte sink: a file, or `tokio::io::sink()` for dry runs
pub type OutputSink = Box<dyn AsyncWrite + Unpin + Send>;

/// Paths of the three files a run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub primary: PathBuf,
    pub compatibility: PathBuf,
    pub log: PathBuf,
}

impl OutputPaths {
    /// `reverse_<schema>.sql`, `compatibility_<schema>.sql`, `reverse_<schema>.log`
    pub fn new(dir: &Path, schema: &str) -> Self {
        Self {
            primary: dir.join(format!("reverse_{}.sql", schema)),
            compatibility: dir.join(format!("compatibility_{}.sql", schema)),
            log: dir.join(format!("reverse_{}.log", schema)),
        }
    }
}

/// The writer's three sinks
pub struct OutputSinks {
    primary: OutputSink,
    compatibility: OutputSink,
    log: OutputSink,
}

impl OutputSinks {
    /// Create (truncate) the three files
    pub async fn create(paths: &OutputPaths) -> Result<Self> {
        Ok(Self {
            primary: Box::new(tokio::fs::File::create(&paths.primary).await?),
            compatibility: Box::new(tokio::fs::File::create(&paths.compatibility).await?),
            log: Box::new(tokio::fs::File::create(&paths.log).await?),
        })
    }

    /// Discard everything
    pub fn discard() -> Self {
        Self {
            primary: Box::new(tokio::io::sink()),
            compatibility: Box::new(tokio::io::sink()),
            log: Box::new(tokio::io::sink()),
        }
    }
}

/// Result of one table task, tagged with its catalog position
pub struct TableOutcome {
    pub seq: usize,
    pub table: String,
    /// The bundle, or the error text of a failed table
    pub result: std::result::Result<DdlBundle, String>,
}

impl fmt::Debug for TableOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOutcome")
            .field("seq", &self.seq)
            .field("table", &self.table)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

/// Drains table outcomes into the output sinks in sequence order
pub struct WriterActor {
    sinks: OutputSinks,
    pending: BTreeMap<usize, TableOutcome>,
    next_seq: usize,
}

impl WriterActor {
    pub fn new(sinks: OutputSinks) -> Self {
        Self {
            sinks,
            pending: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Buffer one outcome and write every outcome that is now in order
    pub async fn handle(&mut self, outcome: TableOutcome) -> Result<()> {
        self.pending.insert(outcome.seq, outcome);
        while let Some(ready) = self.pending.remove(&self.next_seq) {
            self.write(&ready).await?;
            self.next_seq += 1;
        }
        Ok(())
    }

    /// Write whatever is still buffered and flush
    ///
    /// Gaps are left by tables that were never scheduled; the remaining
    /// outcomes keep their relative order.
    pub async fn on_stop(&mut self) -> Result<()> {
        let rest = std::mem::take(&mut self.pending);
        for outcome in rest.into_values() {
            self.write(&outcome).await?;
        }
        self.sinks.primary.flush().await?;
        self.sinks.compatibility.flush().await?;
        self.sinks.log.flush().await?;
        Ok(())
    }

    async fn write(&mut self, outcome: &TableOutcome) -> Result<()> {
        let line = match &outcome.result {
            Ok(bundle) => {
                self.sinks
                    .primary
                    .write_all(format!("{}\n", bundle.primary_sql()).as_bytes())
                    .await?;
                let compat = bundle.compatibility_sql();
                if !compat.is_empty() {
                    self.sinks
                        .compatibility
                        .write_all(format!("{}\n", compat).as_bytes())
                        .await?;
                }
                format!(
                    "[{}] {} -> {}: ok, primary={}, compatibility={}, warnings={}\n",
                    outcome.seq,
                    bundle.source,
                    bundle.target,
                    bundle.primary.len() + 1,
                    bundle.compatibility_count(),
                    bundle.warnings.len()
                )
            }
            Err(message) => format!("[{}] {}: failed, {}\n", outcome.seq, outcome.table, message),
        };
        self.sinks.log.write_all(line.as_bytes()).await?;
        debug!("Wrote outcome of table {}", outcome.table);
        Ok(())
    }
}

/// Spawn the writer loop; dropping every sender ends it
pub fn spawn_writer(
    mut actor: WriterActor,
    mailbox_capacity: usize,
) -> (mpsc::Sender<TableOutcome>, JoinHandle<Result<()>>) {
    let (tx, mut rx) = mpsc::channel::<TableOutcome>(mailbox_capacity.max(1));

    let handle = tokio::spawn(async move {
        while let Some(outcome) = rx.recv().await {
            if let Err(e) = actor.handle(outcome).await {
                error!("Output writer failed: {}", e);
                return Err(e);
            }
        }
        actor.on_stop().await
    });

    (tx, handle)
}
