use super::{DocumentStore, MAX_BATCH_WRITES};
use crate::firestore::FirestoreError;
use tracing::info;

/// Accumulates document deletes and commits them in groups of at most `limit`.
///
/// The buffer flushes as soon as it reaches the limit, so it never holds more than
/// `limit` pending deletes and no single commit exceeds it. Atomicity only holds within
/// one commit.
pub struct DeleteBuffer<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    pending: Vec<String>,
    limit: usize,
    commits: usize,
    committed: usize,
}

impl<'s, S: DocumentStore + ?Sized> DeleteBuffer<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self::with_limit(store, MAX_BATCH_WRITES)
    }

    /// A buffer with a custom flush threshold, clamped to `1..=MAX_BATCH_WRITES`.
    pub fn with_limit(store: &'s S, limit: usize) -> Self {
        let limit = limit.clamp(1, MAX_BATCH_WRITES);
        Self {
            store,
            pending: Vec::with_capacity(limit),
            limit,
            commits: 0,
            committed: 0,
        }
    }

    /// Queues a delete, committing the buffer if that makes it full.
    ///
    /// Returns `true` when a commit happened.
    pub async fn delete(&mut self, document_path: String) -> Result<bool, FirestoreError> {
        self.pending.push(document_path);
        if self.pending.len() >= self.limit {
            self.flush().await?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Commits whatever is queued. Returns the number of deletes committed (zero when the
    /// buffer was empty). The buffer is empty afterwards even if the commit failed.
    pub async fn flush(&mut self) -> Result<usize, FirestoreError> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let writes = std::mem::replace(&mut self.pending, Vec::with_capacity(self.limit));
        self.store.commit_deletes(&writes).await?;

        self.commits += 1;
        self.committed += writes.len();
        info!(operations = writes.len(), commit = self.commits, "batch committed");
        Ok(writes.len())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Successful commits so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Deletes committed successfully so far.
    pub fn committed(&self) -> usize {
        self.committed
    }
}
