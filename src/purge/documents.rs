use super::buffer::DeleteBuffer;
use super::models::UserDocument;
use super::{DocumentStore, DELETED_USERS_COLLECTION, USERS_COLLECTION, USER_SUBCOLLECTIONS};
use crate::firestore::FirestoreError;
use tracing::{error, info, warn};

/// Result of a bulk Firestore purge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentPurgeReport {
    /// User documents found when the run started.
    pub total_users: usize,
    /// Users whose every queued delete was committed.
    pub processed_users: usize,
    /// `(user id, error message)` for users whose deletes did not all commit.
    pub failed_users: Vec<(String, String)>,
    /// Subcollection paths that could not be listed and were left untouched.
    pub skipped_subcollections: Vec<String>,
    /// Successful commits, including the marker cleanup.
    pub commits: usize,
    /// `deleted_users` documents removed by the cleanup step.
    pub markers_cleared: usize,
    /// Why the cleanup step stopped, if it did.
    pub marker_cleanup_error: Option<String>,
}

/// Deletes every user document and its subcollections, then clears `deleted_users`.
///
/// The set of users is fixed by a single listing taken before any deletion. Users are
/// handled one at a time: the entries of each subcollection in [`USER_SUBCOLLECTIONS`]
/// are queued first and the user document last, so a user's children always precede it
/// in the commit stream. A user only counts as processed once the commit carrying its
/// own document delete succeeds.
///
/// Only the initial `users` listing is fatal. Subcollection listing failures skip that
/// subcollection; commit failures fail the users whose deletes were in that commit.
pub async fn purge_documents<S>(store: &S) -> Result<DocumentPurgeReport, FirestoreError>
where
    S: DocumentStore + ?Sized,
{
    info!("listing all user documents");
    let users: Vec<UserDocument> = store
        .list_documents(USERS_COLLECTION)
        .await?
        .iter()
        .map(UserDocument::from)
        .collect();

    if users.is_empty() {
        info!("no user documents found");
    } else {
        info!(users = users.len(), "found user documents");
    }

    let mut run = UserPurge {
        store,
        buffer: DeleteBuffer::new(store),
        awaiting: Vec::new(),
        report: DocumentPurgeReport {
            total_users: users.len(),
            ..Default::default()
        },
    };

    for (index, user) in users.iter().enumerate() {
        info!(
            user = %user.id,
            progress = %format!("{}/{}", index + 1, users.len()),
            "purging user"
        );
        match run.purge_user(user).await {
            Ok(()) => run.awaiting.push(user.id.clone()),
            Err(e) => {
                error!(user = %user.id, error = %e, "failed to purge user");
                run.fail_awaiting(&e);
                run.report.failed_users.push((user.id.clone(), e.to_string()));
            }
        }
    }

    match run.buffer.flush().await {
        Ok(_) => run.settle(),
        Err(e) => {
            error!(error = %e, "final batch commit failed");
            run.fail_awaiting(&e);
        }
    }

    let mut report = run.finish();
    info!(
        processed = report.processed_users,
        total = report.total_users,
        failed = report.failed_users.len(),
        "user documents purged"
    );

    clear_markers(store, &mut report).await;
    Ok(report)
}

struct UserPurge<'s, S: DocumentStore + ?Sized> {
    store: &'s S,
    buffer: DeleteBuffer<'s, S>,
    // Users whose own delete is queued but not yet committed.
    awaiting: Vec<String>,
    report: DocumentPurgeReport,
}

impl<'s, S: DocumentStore + ?Sized> UserPurge<'s, S> {
    async fn purge_user(&mut self, user: &UserDocument) -> Result<(), FirestoreError> {
        for name in USER_SUBCOLLECTIONS {
            let path = user.subcollection_path(name);
            let entries = match self.store.list_documents(&path).await {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(subcollection = %path, error = %e, "skipping subcollection");
                    self.report.skipped_subcollections.push(path);
                    continue;
                }
            };

            if !entries.is_empty() {
                info!(subcollection = name, documents = entries.len(), "found documents");
            }
            for entry in entries {
                self.enqueue(entry.path().to_string()).await?;
            }
        }

        self.enqueue(user.path.clone()).await
    }

    async fn enqueue(&mut self, path: String) -> Result<(), FirestoreError> {
        if self.buffer.delete(path).await? {
            self.settle();
        }
        Ok(())
    }

    // Everything queued so far has been committed.
    fn settle(&mut self) {
        for id in self.awaiting.drain(..) {
            info!(user = %id, "user purged");
            self.report.processed_users += 1;
        }
    }

    // The pending commit was lost, taking the awaiting users' deletes with it.
    fn fail_awaiting(&mut self, e: &FirestoreError) {
        for id in self.awaiting.drain(..) {
            warn!(user = %id, "user deletes lost with failed commit");
            self.report.failed_users.push((id, e.to_string()));
        }
    }

    fn finish(mut self) -> DocumentPurgeReport {
        self.report.commits = self.buffer.commits();
        self.report
    }
}

async fn clear_markers<S>(store: &S, report: &mut DocumentPurgeReport)
where
    S: DocumentStore + ?Sized,
{
    let mut buffer = DeleteBuffer::new(store);
    if let Err(e) = delete_markers(store, &mut buffer).await {
        warn!(error = %e, "failed to clear {}", DELETED_USERS_COLLECTION);
        report.marker_cleanup_error = Some(e.to_string());
    }
    report.markers_cleared = buffer.committed();
    report.commits += buffer.commits();
}

async fn delete_markers<S>(store: &S, buffer: &mut DeleteBuffer<'_, S>) -> Result<(), FirestoreError>
where
    S: DocumentStore + ?Sized,
{
    let markers = store.list_documents(DELETED_USERS_COLLECTION).await?;
    if markers.is_empty() {
        return Ok(());
    }

    info!(documents = markers.len(), "clearing {}", DELETED_USERS_COLLECTION);
    for marker in markers {
        buffer.delete(marker.path().to_string()).await?;
    }
    buffer.flush().await?;

    info!("{} cleared", DELETED_USERS_COLLECTION);
    Ok(())
}
