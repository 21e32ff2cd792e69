//! In-memory stand-ins for Auth and Firestore used by the purge tests.

use super::{AccountDirectory, DocumentStore, MarkerOutcome};
use crate::auth::models::{ListUsersResponse, UserRecord};
use crate::auth::AuthError;
use crate::firestore::models::{Document, Value, ValueType};
use crate::firestore::snapshot::DocumentSnapshot;
use crate::firestore::FirestoreError;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

const DATABASE: &str = "projects/test/databases/(default)/documents";

#[derive(Default)]
pub(crate) struct FakeDirectory {
    accounts: Mutex<BTreeMap<String, UserRecord>>,
    pub(crate) failing_deletes: BTreeSet<String>,
    pub(crate) fail_listing: bool,
    pub(crate) list_calls: Mutex<Vec<Option<String>>>,
    pub(crate) delete_calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    pub(crate) fn with_accounts(count: usize) -> Self {
        let directory = Self::default();
        for i in 0..count {
            directory.insert(&format!("uid-{:05}", i), Some(&format!("user{}@x.com", i)));
        }
        directory
    }

    pub(crate) fn insert(&self, uid: &str, email: Option<&str>) {
        let record = UserRecord {
            local_id: uid.to_string(),
            email: email.map(str::to_string),
            ..Default::default()
        };
        self.accounts.lock().unwrap().insert(uid.to_string(), record);
    }

    pub(crate) fn contains(&self, uid: &str) -> bool {
        self.accounts.lock().unwrap().contains_key(uid)
    }

    pub(crate) fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    async fn get_user_by_email(&self, email: &str) -> Result<UserRecord, AuthError> {
        self.accounts
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn delete_user(&self, uid: &str) -> Result<(), AuthError> {
        self.delete_calls.lock().unwrap().push(uid.to_string());
        if self.failing_deletes.contains(uid) {
            return Err(AuthError::ApiError(format!("INTERNAL_ERROR deleting {}", uid)));
        }
        match self.accounts.lock().unwrap().remove(uid) {
            Some(_) => Ok(()),
            None => Err(AuthError::ApiError("USER_NOT_FOUND".to_string())),
        }
    }

    // Keyset paging on the uid, as Identity Toolkit does, so deleting while paging skips nothing.
    async fn list_users(
        &self,
        max_results: u32,
        page_token: Option<&str>,
    ) -> Result<ListUsersResponse, AuthError> {
        self.list_calls
            .lock()
            .unwrap()
            .push(page_token.map(str::to_string));
        if self.fail_listing {
            return Err(AuthError::ApiError("UNAVAILABLE".to_string()));
        }

        let accounts = self.accounts.lock().unwrap();
        let users: Vec<UserRecord> = accounts
            .values()
            .filter(|u| page_token.map_or(true, |t| u.local_id.as_str() > t))
            .take(max_results as usize)
            .cloned()
            .collect();

        let next_page_token = if users.len() == max_results as usize {
            users.last().map(|u| u.local_id.clone())
        } else {
            None
        };

        Ok(ListUsersResponse {
            users: if users.is_empty() { None } else { Some(users) },
            next_page_token,
        })
    }
}

#[derive(Default)]
pub(crate) struct FakeStore {
    documents: Mutex<BTreeMap<String, HashMap<String, Value>>>,
    pub(crate) failing_collections: BTreeSet<String>,
    /// Commit attempts (1-based) that fail.
    pub(crate) failing_commits: BTreeSet<usize>,
    pub(crate) fail_outcome_writes: bool,
    pub(crate) commits: Mutex<Vec<Vec<String>>>,
    pub(crate) outcomes: Mutex<Vec<(String, MarkerOutcome)>>,
}

impl FakeStore {
    pub(crate) fn insert(&self, path: &str, fields: &[(&str, &str)]) {
        let fields = fields
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    Value {
                        value_type: ValueType::StringValue(v.to_string()),
                    },
                )
            })
            .collect();
        self.documents
            .lock()
            .unwrap()
            .insert(path.to_string(), fields);
    }

    pub(crate) fn contains(&self, path: &str) -> bool {
        self.documents.lock().unwrap().contains_key(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub(crate) fn field(&self, path: &str, name: &str) -> Option<Value> {
        self.documents
            .lock()
            .unwrap()
            .get(path)
            .and_then(|fields| fields.get(name).cloned())
    }

    pub(crate) fn snapshot(&self, path: &str) -> DocumentSnapshot {
        let fields = self
            .documents
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_default();
        DocumentSnapshot::from_document(Document {
            name: format!("{}/{}", DATABASE, path),
            fields,
            create_time: None,
            update_time: None,
        })
        .unwrap()
    }

    pub(crate) fn commit_sizes(&self) -> Vec<usize> {
        self.commits.lock().unwrap().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn list_documents(
        &self,
        collection_path: &str,
    ) -> Result<Vec<DocumentSnapshot>, FirestoreError> {
        if self.failing_collections.contains(collection_path) {
            return Err(FirestoreError::ApiError(format!(
                "PERMISSION_DENIED listing {}",
                collection_path
            )));
        }

        let depth = collection_path.split('/').count() + 1;
        let prefix = format!("{}/", collection_path);
        let paths: Vec<String> = self
            .documents
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.starts_with(&prefix) && p.split('/').count() == depth)
            .cloned()
            .collect();

        Ok(paths.iter().map(|p| self.snapshot(p)).collect())
    }

    async fn commit_deletes(&self, document_paths: &[String]) -> Result<(), FirestoreError> {
        assert!(document_paths.len() <= super::MAX_BATCH_WRITES, "oversized commit");

        let attempt = {
            let mut commits = self.commits.lock().unwrap();
            commits.push(document_paths.to_vec());
            commits.len()
        };
        if self.failing_commits.contains(&attempt) {
            return Err(FirestoreError::ApiError("ABORTED".to_string()));
        }

        let mut documents = self.documents.lock().unwrap();
        for path in document_paths {
            documents.remove(path);
        }
        Ok(())
    }

    async fn record_marker_outcome(
        &self,
        marker_path: &str,
        outcome: &MarkerOutcome,
    ) -> Result<(), FirestoreError> {
        if self.fail_outcome_writes {
            return Err(FirestoreError::ApiError("NOT_FOUND".to_string()));
        }

        let mut documents = self.documents.lock().unwrap();
        let fields = documents
            .get_mut(marker_path)
            .ok_or_else(|| FirestoreError::ApiError("NOT_FOUND".to_string()))?;

        match outcome {
            MarkerOutcome::Deleted => {
                fields.insert(
                    "authDeleted".to_string(),
                    Value { value_type: ValueType::BooleanValue(true) },
                );
                fields.insert(
                    "authDeletedAt".to_string(),
                    Value {
                        value_type: ValueType::TimestampValue("2024-01-01T00:00:00Z".to_string()),
                    },
                );
            }
            MarkerOutcome::Failed(message) => {
                fields.insert(
                    "authDeleted".to_string(),
                    Value { value_type: ValueType::BooleanValue(false) },
                );
                fields.insert(
                    "error".to_string(),
                    Value { value_type: ValueType::StringValue(message.clone()) },
                );
            }
        }

        self.outcomes
            .lock()
            .unwrap()
            .push((marker_path.to_string(), outcome.clone()));
        Ok(())
    }
}
