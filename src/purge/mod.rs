//! Cascading user removal.
//!
//! Three independent operations share this module:
//!
//! - [`handler::handle_marker_created`] reacts to a new `deleted_users/{id}` marker by
//!   removing the matching Auth account and writing the outcome back onto the marker.
//! - [`accounts::purge_accounts`] deletes every Auth account, page by page.
//! - [`documents::purge_documents`] deletes every `users/{id}` document together with its
//!   named subcollections, then clears `deleted_users`.
//!
//! The operations only talk to the platform through [`AccountDirectory`] and
//! [`DocumentStore`], implemented in [`store`] by the REST clients.

pub mod accounts;
pub mod buffer;
pub mod documents;
pub mod handler;
pub mod models;
pub mod store;

#[cfg(test)]
pub(crate) mod fakes;

use crate::auth::models::{ListUsersResponse, UserRecord};
use crate::auth::AuthError;
use crate::firestore::snapshot::DocumentSnapshot;
use crate::firestore::FirestoreError;
use async_trait::async_trait;

pub use self::models::{DeletionMarker, MarkerOutcome, UserDocument};

pub const USERS_COLLECTION: &str = "users";
pub const DELETED_USERS_COLLECTION: &str = "deleted_users";

/// Subcollections nested under every `users/{id}` document.
pub const USER_SUBCOLLECTIONS: [&str; 7] = [
    "addresses",
    "paymentMethods",
    "favorites",
    "cart",
    "orders",
    "wallet",
    "notifications",
];

/// Accounts requested per listing call.
pub const LIST_USERS_PAGE_SIZE: u32 = 1000;

/// Firestore rejects commits carrying more writes than this.
pub const MAX_BATCH_WRITES: usize = 500;

/// The Auth operations the purge needs.
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, AuthError>;

    async fn delete_user(&self, uid: &str) -> Result<(), AuthError>;

    async fn list_users(
        &self,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<ListUsersResponse, AuthError>;
}

/// The Firestore operations the purge needs. Paths are relative to the database root.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every existing document in the collection at `collection_path`.
    async fn list_documents(
        &self,
        collection_path: &str,
    ) -> Result<Vec<DocumentSnapshot>, FirestoreError>;

    /// Deletes all `document_paths` in one atomic commit. Callers keep it at or under
    /// [`MAX_BATCH_WRITES`].
    async fn commit_deletes(&self, document_paths: &[String]) -> Result<(), FirestoreError>;

    /// Writes the handler outcome onto the marker at `marker_path`.
    async fn record_marker_outcome(
        &self,
        marker_path: &str,
        outcome: &MarkerOutcome,
    ) -> Result<(), FirestoreError>;
}
