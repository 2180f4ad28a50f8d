//! Append-only audit sinks
//!
//! Sinks only ever append whole lines. Writers are serialized through an
//! async mutex so concurrent pipeline executions cannot interleave partial
//! records; the guard is dropped on every exit path.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use core_kernel::DomainPort;

use crate::entry::AuditEntry;
use crate::error::AuditError;

/// Durable, append-only record store for audit entries
#[async_trait]
pub trait AuditSink: DomainPort {
    /// Appends one entry as a single newline-terminated line
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError>;

    /// Reads back every entry in append order
    async fn read_all(&self) -> Result<Vec<AuditEntry>, AuditError>;

    /// Human-readable location, for logs and errors
    fn describe(&self) -> String;
}

/// Newline-delimited JSON file opened in append mode for every write
#[derive(Debug)]
pub struct FileAuditSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, source: std::io::Error) -> AuditError {
        AuditError::unavailable(self.path.display().to_string(), source)
    }
}

impl DomainPort for FileAuditSink {}

#[async_trait]
impl AuditSink for FileAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let _guard = self.lock.lock().await;

        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.unavailable(e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.unavailable(e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.unavailable(e))?;
        file.flush().await.map_err(|e| self.unavailable(e))?;
        file.sync_data().await.map_err(|e| self.unavailable(e))?;

        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let _guard = self.lock.lock().await;

        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.unavailable(e)),
        };

        parse_lines(contents.lines())
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}

/// In-process sink holding serialized lines
///
/// Useful for embedding and tests; stores exactly what a file would.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the raw lines appended so far
    pub async fn lines(&self) -> Vec<String> {
        self.lines.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }
}

impl DomainPort for MemoryAuditSink {}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        let mut lines = self.lines.lock().await;
        lines.push(serde_json::to_string(entry)?);
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<AuditEntry>, AuditError> {
        let lines = self.lines.lock().await;
        parse_lines(lines.iter().map(String::as_str))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a str>) -> Result<Vec<AuditEntry>, AuditError> {
    lines
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|e| AuditError::Corrupt {
                line: index + 1,
                message: e.to_string(),
            })
        })
        .collect()
}
