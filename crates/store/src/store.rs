//! The record store: CRUD over the backing CSV file.

use std::path::{Path, PathBuf};

use friends_core::record::{JsonFields, Record};
use friends_core::types::RecordId;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::table::Table;

/// CRUD operations over one CSV file.
///
/// Constructed once at startup and shared behind an `Arc`. The file is read
/// fresh for every operation. Mutations hold `write_lock` for the whole
/// read-modify-write so concurrent requests in this process never lose an
/// update. Reads take no lock: the file is replaced by an atomic rename, so a
/// reader sees either the old or the new complete file.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the current contents of the backing file.
    pub async fn load(&self) -> StoreResult<Table> {
        let result = match tokio::fs::read(&self.path).await {
            Ok(bytes) => Table::parse(&bytes),
            Err(source) => Err(StoreError::Io {
                path: self.path.clone(),
                source,
            }),
        };

        match &result {
            Ok(table) => tracing::info!(
                path = %self.path.display(),
                rows = table.len(),
                "CSV file loaded"
            ),
            Err(e) => tracing::error!(path = %self.path.display(), error = %e, "Error loading CSV file"),
        }
        result
    }

    /// Replace the backing file with `table`.
    ///
    /// The new contents go to a sibling temp file which is then renamed over
    /// the original, so a failed write leaves the previous file untouched.
    async fn persist(&self, table: &Table) -> StoreResult<()> {
        let bytes = table.to_csv()?;
        let tmp = self.temp_path();

        if let Err(source) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Io { path: tmp, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        tracing::info!(path = %self.path.display(), rows = table.len(), "CSV file written");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Succeeds when the backing file can be read and parsed.
    pub async fn health_check(&self) -> StoreResult<()> {
        self.load().await.map(|_| ())
    }

    /// All records in file order.
    pub async fn list(&self) -> StoreResult<Vec<Record>> {
        Ok(self.load().await?.into_records())
    }

    /// The record with the given id.
    pub async fn get(&self, id: RecordId) -> StoreResult<Record> {
        self.load()
            .await?
            .find(id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    /// Append a new record and return it with its assigned id.
    pub async fn create(&self, fields: &JsonFields) -> StoreResult<Record> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        let record = table.insert(fields)?.clone();
        self.persist(&table).await?;

        tracing::debug!(id = ?record.id(), "Record created");
        Ok(record)
    }

    /// Merge `partial` onto the record with the given id.
    ///
    /// Columns not in the header are ignored without being converted and `id`
    /// is never changed. Other rows are written back exactly as they were read.
    pub async fn update(&self, id: RecordId, partial: &JsonFields) -> StoreResult<Record> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        let record = table.update(id, partial)?.clone();
        self.persist(&table).await?;

        tracing::debug!(id, "Record updated");
        Ok(record)
    }

    /// Remove the record with the given id and return it.
    pub async fn delete(&self, id: RecordId) -> StoreResult<Record> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        let removed = table.remove(id)?;
        self.persist(&table).await?;

        tracing::debug!(id, "Record deleted");
        Ok(removed)
    }
}
