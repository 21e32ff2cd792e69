//! Cloud Firestore module.
//!
//! A thin REST client over the Firestore v1 API covering what the purge jobs need:
//! paged collection reads (including nested subcollections) and atomic write batches
//! with deletes, masked updates and server-timestamp transforms.
//!
//! Documents are addressed by their slash-separated path relative to the database root,
//! e.g. `users/u1` or `users/u1/orders/o1`.

pub mod batch;
pub mod models;
pub mod reference;
pub mod snapshot;


use self::batch::WriteBatch;
use self::reference::CollectionReference;
use reqwest_middleware::ClientWithMiddleware;
use thiserror::Error;

const FIRESTORE_V1_API: &str =
    "https://firestore.googleapis.com/v1/projects/{project_id}/databases/(default)/documents";

/// Errors that can occur during Firestore operations.
#[derive(Error, Debug)]
pub enum FirestoreError {
    /// Wrapper for `reqwest::Error`.
    #[error("HTTP Request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// Wrapper for `reqwest_middleware::Error`.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),
    /// Errors returned by the Firestore API.
    #[error("API error: {0}")]
    ApiError(String),
    /// Wrapper for `serde_json::Error`.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    /// A document name or payload that does not have the expected shape.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// A thread panicked while holding the write batch lock.
    #[error("Write batch lock poisoned")]
    BatchPoisoned,
}

/// Client for interacting with Cloud Firestore.
#[derive(Clone)]
pub struct FirebaseFirestore {
    client: ClientWithMiddleware,
    base_url: String,
}

impl FirebaseFirestore {
    /// Creates a new `FirebaseFirestore` instance for the `(default)` database of a project.
    ///
    /// This is typically called via `FirebaseApp::firestore()`.
    pub fn new(client: ClientWithMiddleware, project_id: &str) -> Self {
        let base_url = FIRESTORE_V1_API.replace("{project_id}", project_id);
        Self { client, base_url }
    }

    /// Creates a new `FirebaseFirestore` instance with a custom base URL (useful for testing).
    pub fn new_with_url(client: ClientWithMiddleware, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Gets a `CollectionReference` instance that refers to the collection at the specified path.
    ///
    /// # Arguments
    ///
    /// * `collection_path` - The path of the collection (e.g., "users" or "users/u1/orders").
    pub fn collection(&self, collection_path: &str) -> CollectionReference<'_> {
        CollectionReference {
            client: &self.client,
            base_url: &self.base_url,
            path: collection_path.to_string(),
        }
    }

    /// Creates a write batch, used for performing multiple writes as a single atomic operation.
    pub fn batch(&self) -> WriteBatch<'_> {
        WriteBatch::new(&self.client, &self.base_url)
    }
}
