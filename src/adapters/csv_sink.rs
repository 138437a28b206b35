use crate::domain::model::{AsteroidRecord, AsteroidTable};
use crate::domain::ports::Sink;
use crate::utils::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Appends rows to a local CSV file, writing the header only into a new or empty file.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> Result<Vec<AsteroidRecord>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<AsteroidRecord>, csv::Error>>()?;
        Ok(rows)
    }

    async fn needs_header(&self) -> Result<bool> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}

impl Sink for CsvSink {
    async fn append(&self, table: &AsteroidTable) -> Result<u64> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(self.needs_header().await?)
            .from_writer(Vec::new());
        for record in table {
            writer.serialize(record)?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| EtlError::Io(e.into_error()))?;

        tracing::debug!(
            "Appending {} rows ({} bytes) to {}",
            table.len(),
            data.len(),
            self.path.display()
        );

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&data).await?;
        file.flush().await?;

        Ok(table.len() as u64)
    }

    fn describe(&self) -> String {
        format!("csv file `{}`", self.path.display())
    }
}
