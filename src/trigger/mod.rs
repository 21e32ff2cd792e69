//! HTTP surface for the deletion-event handler.
//!
//! Firestore "document created" events for `deleted_users/{docId}` are delivered as JSON
//! (`{"value": Document, "oldValue": Document?}`) to `POST /`. Each request runs the handler
//! once; a `2xx` answer means the outcome was written onto the marker.


use crate::firestore::models::Document;
use crate::firestore::snapshot::DocumentSnapshot;
use crate::purge::handler::handle_marker_created;
use crate::purge::{AccountDirectory, DocumentStore, DELETED_USERS_COLLECTION};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, warn};

/// Payload of a Firestore document event in its JSON encoding.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEventData {
    pub value: Option<Document>,
    #[serde(default)]
    pub old_value: Option<Document>,
}

#[derive(Clone)]
pub struct TriggerState {
    pub directory: Arc<dyn AccountDirectory>,
    pub store: Arc<dyn DocumentStore>,
}

pub fn router(state: TriggerState) -> Router {
    Router::new()
        .route("/", post(on_document_created))
        .with_state(state)
}

async fn on_document_created(State(state): State<TriggerState>, body: Bytes) -> StatusCode {
    let event: DocumentEventData = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "undecodable document event");
            return StatusCode::BAD_REQUEST;
        }
    };

    let Some(document) = event.value else {
        warn!("document event without a created document");
        return StatusCode::BAD_REQUEST;
    };

    let marker = match DocumentSnapshot::from_document(document) {
        Ok(marker) => marker,
        Err(e) => {
            warn!(error = %e, "document event with an invalid name");
            return StatusCode::BAD_REQUEST;
        }
    };

    let in_markers = marker
        .path()
        .strip_prefix(DELETED_USERS_COLLECTION)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|id| !id.is_empty() && !id.contains('/'));
    if !in_markers {
        warn!(path = %marker.path(), "event for a document outside {}", DELETED_USERS_COLLECTION);
        return StatusCode::BAD_REQUEST;
    }

    match handle_marker_created(state.directory.as_ref(), state.store.as_ref(), &marker).await {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(e) => {
            error!(path = %marker.path(), error = %e, "failed to record marker outcome");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
