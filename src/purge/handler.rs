use super::models::{DeletionMarker, MarkerOutcome};
use super::{AccountDirectory, DocumentStore};
use crate::auth::AuthError;
use crate::firestore::snapshot::DocumentSnapshot;
use crate::firestore::FirestoreError;
use thiserror::Error;
use tracing::{error, info, instrument};

/// Why the account behind a marker could not be removed. Its message ends up in the
/// marker's `error` field.
#[derive(Error, Debug)]
pub enum RemovalError {
    #[error("{0}")]
    InvalidMarker(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Handles the creation of one `deleted_users/{id}` marker.
///
/// Resolves the Auth account by the marker's email and deletes it, then records exactly
/// one outcome on the marker: `authDeleted = true` with a server-side `authDeletedAt`, or
/// `authDeleted = false` with `error`. "Not found" and provider failures are recorded the
/// same way. There is a single attempt; nothing is retried.
///
/// Only a failure to write the outcome is returned as an error.
#[instrument(skip_all, fields(marker = %marker.path()))]
pub async fn handle_marker_created<D, S>(
    directory: &D,
    store: &S,
    marker: &DocumentSnapshot,
) -> Result<MarkerOutcome, FirestoreError>
where
    D: AccountDirectory + ?Sized,
    S: DocumentStore + ?Sized,
{
    let outcome = match remove_account(directory, marker).await {
        Ok(uid) => {
            info!(uid = %uid, "auth account deleted");
            MarkerOutcome::Deleted
        }
        Err(e) => {
            error!(error = %e, "auth account deletion failed");
            MarkerOutcome::Failed(e.to_string())
        }
    };

    store.record_marker_outcome(marker.path(), &outcome).await?;
    Ok(outcome)
}

async fn remove_account<D>(directory: &D, marker: &DocumentSnapshot) -> Result<String, RemovalError>
where
    D: AccountDirectory + ?Sized,
{
    let marker = DeletionMarker::from_snapshot(marker).map_err(RemovalError::InvalidMarker)?;
    info!(email = %marker.email, user_id = %marker.user_id, "removing deleted user");

    let account = directory.get_user_by_email(&marker.email).await?;
    directory.delete_user(&account.local_id).await?;
    Ok(account.local_id)
}
