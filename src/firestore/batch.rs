use super::models::{
    CommitRequest, CommitResponse, Document, DocumentMask, FieldTransform, Precondition,
    ServerValue, Write, WriteOperation, WriteResult,
};
use super::reference::{convert_serializable_to_fields, database_documents_name};
use super::FirestoreError;
use crate::core::parse_error_response;
use reqwest::header;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Represents a Firestore Write Batch.
///
/// The queued writes are applied atomically by a single `commit`. Firestore rejects a
/// commit carrying more than 500 writes; callers are expected to flush before that.
///
/// # Examples
///
/// ```rust,no_run
/// # use firebase_user_purge::firestore::FirebaseFirestore;
/// # async fn run(firestore: FirebaseFirestore) -> Result<(), Box<dyn std::error::Error>> {
/// let batch = firestore.batch();
/// batch.delete("users/u1/orders/o1")?;
/// batch.delete("users/u1")?;
/// batch.commit().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct WriteBatch<'a> {
    client: &'a ClientWithMiddleware,
    base_url: &'a str,
    writes: Arc<Mutex<Vec<Write>>>,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(client: &'a ClientWithMiddleware, base_url: &'a str) -> Self {
        Self {
            client,
            base_url,
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Updates fields in the document referred to by `document_path`.
    ///
    /// Only the fields present in `value` are touched. If the document does not exist,
    /// the commit will fail.
    pub fn update<T: Serialize>(
        &self,
        document_path: &str,
        value: &T,
    ) -> Result<&Self, FirestoreError> {
        self.update_with_server_timestamp(document_path, value, &[])
    }

    /// Like `update`, additionally setting each of `timestamp_fields` to the commit time
    /// as computed by the server.
    pub fn update_with_server_timestamp<T: Serialize>(
        &self,
        document_path: &str,
        value: &T,
        timestamp_fields: &[&str],
    ) -> Result<&Self, FirestoreError> {
        let fields = convert_serializable_to_fields(value)?;
        let field_paths = fields.keys().cloned().collect();

        let update_transforms = if timestamp_fields.is_empty() {
            None
        } else {
            Some(
                timestamp_fields
                    .iter()
                    .map(|field| FieldTransform {
                        field_path: (*field).to_string(),
                        set_to_server_value: ServerValue::RequestTime,
                    })
                    .collect(),
            )
        };

        let write = Write {
            operation: WriteOperation::Update(Document {
                name: self.resource_name(document_path),
                fields,
                create_time: None,
                update_time: None,
            }),
            update_mask: Some(DocumentMask { field_paths }),
            update_transforms,
            current_document: Some(Precondition {
                exists: Some(true),
                update_time: None,
            }),
        };

        self.push(write)
    }

    /// Deletes the document referred to by `document_path`.
    pub fn delete(&self, document_path: &str) -> Result<&Self, FirestoreError> {
        let write = Write {
            operation: WriteOperation::Delete(self.resource_name(document_path)),
            update_mask: None,
            update_transforms: None,
            current_document: None,
        };

        self.push(write)
    }

    /// Number of writes queued and not yet committed.
    pub fn len(&self) -> usize {
        self.writes.lock().map(|w| w.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, write: Write) -> Result<&Self, FirestoreError> {
        self.writes
            .lock()
            .map_err(|_| FirestoreError::BatchPoisoned)?
            .push(write);
        Ok(self)
    }

    fn resource_name(&self, document_path: &str) -> String {
        format!("{}/{}", database_documents_name(self.base_url), document_path)
    }

    /// Commits the batch of writes. The queue is emptied whether or not the commit succeeds.
    pub async fn commit(&self) -> Result<Vec<WriteResult>, FirestoreError> {
        let writes = {
            let mut guard = self
                .writes
                .lock()
                .map_err(|_| FirestoreError::BatchPoisoned)?;
            std::mem::take(&mut *guard)
        };

        if writes.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}:commit", self.base_url);

        let request = CommitRequest { writes };

        let response = self
            .client
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FirestoreError::ApiError(
                parse_error_response(response, "Commit batch failed").await,
            ));
        }

        let result: CommitResponse = response.json().await?;
        Ok(result.write_results)
    }
}
