// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tracing::error;

use crate::types::OutputRecord;

/// Newline-delimited JSON sink, one record per line
pub struct JsonLinesWriter {
    writer: BufWriter<File>,
}

impl JsonLinesWriter {
    /// Create or truncate `path`
    pub async fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to open output file: {:?}", path))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    pub async fn write(&mut self, record: &OutputRecord) -> Result<()> {
        let mut line = serde_json::to_vec(record).context("Failed to encode record")?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .await
            .context("Failed to write record")?;
        Ok(())
    }

    /// Write every record until the stream closes, then flush.
    /// Rows that fail are logged and skipped; returns rows written.
    pub async fn drain(&mut self, mut records: mpsc::Receiver<OutputRecord>) -> Result<u64> {
        let mut written = 0u64;
        while let Some(record) = records.recv().await {
            match self.write(&record).await {
                Ok(()) => written += 1,
                Err(e) => error!(domain = %record.domain, error = %format!("{:#}", e), "write file"),
            }
        }
        self.writer.flush().await.context("Failed to flush output file")?;
        Ok(written)
    }
}
