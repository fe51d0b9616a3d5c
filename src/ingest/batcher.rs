use crate::record::{AliasRecord, ContentRecord};
use crate::store::{ContentStore, IngestBatch, StorageError};
use crate::types::PageId;

pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Accumulates operations and flushes them to the store in bounded atomic batches.
///
/// Batches already flushed stay committed if a later one fails.
pub(crate) struct Batcher<'a> {
    store: &'a dyn ContentStore,
    pending: IngestBatch,
    batch_size: usize,
    flushed: usize,
}

impl<'a> Batcher<'a> {
    pub(crate) fn new(store: &'a dyn ContentStore, batch_size: usize) -> Self {
        Self {
            store,
            pending: IngestBatch::default(),
            batch_size: batch_size.max(1),
            flushed: 0,
        }
    }

    pub(crate) async fn upsert(
        &mut self,
        record: ContentRecord,
        aliases: Vec<AliasRecord>,
    ) -> Result<(), StorageError> {
        self.pending.upsert(record, aliases);
        self.flush_if_full().await
    }

    pub(crate) async fn delete(&mut self, page_id: PageId) -> Result<(), StorageError> {
        self.pending.delete(page_id);
        self.flush_if_full().await
    }

    async fn flush_if_full(&mut self) -> Result<(), StorageError> {
        if self.pending.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub(crate) async fn flush(&mut self) -> Result<(), StorageError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = self.pending.take();
        self.store.apply_batch(&batch).await?;
        self.flushed += 1;
        tracing::debug!(
            upserts = batch.upserts.len(),
            deletes = batch.deletes.len(),
            aliases = batch.aliases.len(),
            batch = self.flushed,
            "flushed ingest batch"
        );
        Ok(())
    }

    /// Flushes the trailing partial batch and returns how many batches were committed.
    pub(crate) async fn finish(mut self) -> Result<usize, StorageError> {
        self.flush().await?;
        Ok(self.flushed)
    }
}
