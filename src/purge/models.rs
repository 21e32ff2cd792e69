use crate::firestore::snapshot::DocumentSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A `deleted_users/{id}` document, written upstream when a user is removed by an admin.
///
/// `email` and `userId` are required; the rest is filled in by the handler.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionMarker {
    pub email: String,
    pub user_id: String,
    #[serde(default)]
    pub auth_deleted: Option<bool>,
    #[serde(default)]
    pub auth_deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DeletionMarker {
    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> Result<Self, String> {
        snapshot
            .data()
            .map_err(|e| format!("invalid deletion marker {}: {}", snapshot.path(), e))
    }
}

/// Terminal state written onto a marker. Exactly one is recorded per handled marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerOutcome {
    /// The account was found and deleted; recorded with a server timestamp.
    Deleted,
    /// Lookup or deletion failed; the message is stored in `error`.
    Failed(String),
}

/// Field patch applied to the marker. `authDeletedAt` is a server transform, not a field.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MarkerPatch<'a> {
    pub auth_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

pub(crate) const AUTH_DELETED_AT_FIELD: &str = "authDeletedAt";

impl MarkerOutcome {
    pub(crate) fn patch(&self) -> MarkerPatch<'_> {
        match self {
            MarkerOutcome::Deleted => MarkerPatch {
                auth_deleted: true,
                error: None,
            },
            MarkerOutcome::Failed(message) => MarkerPatch {
                auth_deleted: false,
                error: Some(message),
            },
        }
    }
}

/// A `users/{id}` document. Its fields belong to the application and are not read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDocument {
    pub id: String,
    pub path: String,
}

impl UserDocument {
    /// Path of one of the user's subcollections, e.g. `users/u1/orders`.
    pub fn subcollection_path(&self, name: &str) -> String {
        format!("{}/{}", self.path, name)
    }
}

impl From<&DocumentSnapshot> for UserDocument {
    fn from(snapshot: &DocumentSnapshot) -> Self {
        Self {
            id: snapshot.id().to_string(),
            path: snapshot.path().to_string(),
        }
    }
}
