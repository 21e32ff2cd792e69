use super::models::AUTH_DELETED_AT_FIELD;
use super::{AccountDirectory, DocumentStore, MarkerOutcome};
use crate::auth::models::{ListUsersResponse, UserRecord};
use crate::auth::{AuthError, FirebaseAuth};
use crate::firestore::snapshot::DocumentSnapshot;
use crate::firestore::{FirebaseFirestore, FirestoreError};
use async_trait::async_trait;

#[async_trait]
impl AccountDirectory for FirebaseAuth {
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, AuthError> {
        FirebaseAuth::get_user_by_email(self, email).await
    }

    async fn delete_user(&self, uid: &str) -> Result<(), AuthError> {
        FirebaseAuth::delete_user(self, uid).await
    }

    async fn list_users(
        &self,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<ListUsersResponse, AuthError> {
        FirebaseAuth::list_users(self, max_results, page_token).await
    }
}

#[async_trait]
impl DocumentStore for FirebaseFirestore {
    async fn list_documents(
        &self,
        collection_path: &str,
    ) -> Result<Vec<DocumentSnapshot>, FirestoreError> {
        self.collection(collection_path).get().await
    }

    async fn commit_deletes(&self, document_paths: &[String]) -> Result<(), FirestoreError> {
        let batch = self.batch();
        for path in document_paths {
            batch.delete(path)?;
        }
        batch.commit().await?;
        Ok(())
    }

    async fn record_marker_outcome(
        &self,
        marker_path: &str,
        outcome: &MarkerOutcome,
    ) -> Result<(), FirestoreError> {
        let batch = self.batch();
        match outcome {
            MarkerOutcome::Deleted => {
                batch.update_with_server_timestamp(
                    marker_path,
                    &outcome.patch(),
                    &[AUTH_DELETED_AT_FIELD],
                )?;
            }
            MarkerOutcome::Failed(_) => {
                batch.update(marker_path, &outcome.patch())?;
            }
        }
        batch.commit().await?;
        Ok(())
    }
}
