use crate::record::{AliasRecord, ContentRecord};
use crate::types::PageId;

/// One atomic unit of ingestion work.
///
/// Applying a batch writes every upsert, replaces the alias rows of every upserted
/// page with `aliases`, then removes every page in `deletes`.
#[derive(Debug, Default, Clone)]
pub struct IngestBatch {
    pub upserts: Vec<ContentRecord>,
    pub aliases: Vec<AliasRecord>,
    pub deletes: Vec<PageId>,
}

impl IngestBatch {
    pub fn upsert(&mut self, record: ContentRecord, aliases: Vec<AliasRecord>) {
        self.upserts.push(record);
        self.aliases.extend(aliases);
    }

    pub fn delete(&mut self, page_id: PageId) {
        self.deletes.push(page_id);
    }

    /// Combined upserts and deletes; aliases do not count toward the flush threshold.
    pub fn len(&self) -> usize {
        self.upserts.len() + self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deletes.is_empty()
    }

    pub fn upserted_page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.upserts.iter().map(|r| r.page_id)
    }

    pub fn take(&mut self) -> IngestBatch {
        std::mem::take(self)
    }
}
