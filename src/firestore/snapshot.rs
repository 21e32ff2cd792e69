use super::models::Document;
use super::reference::{convert_fields_to_serde_value, relative_document_path};
use super::FirestoreError;
use serde::de::DeserializeOwned;

/// A snapshot of a document in Firestore.
///
/// It contains data read from a document in your Firestore database.
/// The data can be extracted with `.data()`.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub(crate) id: String,
    pub(crate) path: String,
    pub(crate) document: Document,
}

impl DocumentSnapshot {
    /// Wraps a document returned by the API, deriving its id and relative path from the
    /// resource name.
    pub fn from_document(document: Document) -> Result<Self, FirestoreError> {
        let path = relative_document_path(&document.name)?.to_string();
        let id = path.rsplit('/').next().unwrap_or_default().to_string();
        Ok(Self { id, path, document })
    }

    /// The ID of the document.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The slash-separated path relative to the database root (e.g. `users/u1`).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The time the document was created, when the server reported it.
    pub fn create_time(&self) -> Option<&str> {
        self.document.create_time.as_deref()
    }

    /// Retrieves all fields in the document as a specific type.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, FirestoreError> {
        let serde_value = convert_fields_to_serde_value(self.document.fields.clone())?;
        let obj = serde_json::from_value(serde_value)?;
        Ok(obj)
    }
}
