use std::path::Path;
use std::sync::Arc;

use super::batcher::{Batcher, DEFAULT_BATCH_SIZE};
use super::lines::LineStream;
use super::IngestError;
use crate::record::{AliasRecord, DeltaOp, DeltaRow, TopicClassifier};
use crate::store::ContentStore;

/// Streams `upsert`/`delete` operations from a delta file into the store.
pub struct DeltaApplier {
    store: Arc<dyn ContentStore>,
    classifier: Arc<dyn TopicClassifier>,
    batch_size: usize,
}

impl DeltaApplier {
    pub fn new(store: Arc<dyn ContentStore>, classifier: Arc<dyn TopicClassifier>) -> Self {
        Self {
            store,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Applies every operation in `delta_file` and returns how many were applied.
    ///
    /// A decode error stops the stream; batches flushed before it stay committed.
    pub async fn apply(&self, delta_file: &Path) -> Result<usize, IngestError> {
        let mut lines = LineStream::spawn(delta_file)?;
        let mut batcher = Batcher::new(self.store.as_ref(), self.batch_size);
        let mut applied = 0;

        while let Some((line_no, line)) = lines.next().await? {
            match DeltaRow::decode(line_no, &line)? {
                DeltaOp::Upsert { article, aliases } => {
                    let record = article.into_record(self.classifier.as_ref());
                    let aliases = aliases
                        .into_iter()
                        .map(|alias| AliasRecord::for_record(&record, alias))
                        .collect();
                    batcher.upsert(record, aliases).await?;
                }
                DeltaOp::Delete(page_id) => batcher.delete(page_id).await?,
            }
            applied += 1;
        }

        let batches = batcher.finish().await?;
        tracing::info!(
            file = %delta_file.display(),
            ops = applied,
            batches,
            "applied delta"
        );
        Ok(applied)
    }
}
