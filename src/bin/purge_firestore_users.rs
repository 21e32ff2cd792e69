//! Deletes every `users/{id}` document with its subcollections, then clears `deleted_users`.
//!
//! Credentials come from `GOOGLE_APPLICATION_CREDENTIALS` (default `serviceAccountKey.json`).
//! Exits 0 once the run ends, even when some users could not be purged.

use firebase_user_purge::config::PurgeConfig;
use firebase_user_purge::core::init_tracing;
use firebase_user_purge::purge::documents::purge_documents;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app = PurgeConfig::from_env()?.load_app().await?;
    let firestore = app.firestore();

    match purge_documents(&firestore).await {
        Ok(report) => {
            for (user, reason) in &report.failed_users {
                warn!(user = %user, reason = %reason, "user not purged");
            }
            info!(
                processed = report.processed_users,
                total = report.total_users,
                markers_cleared = report.markers_cleared,
                commits = report.commits,
                "purged {}/{} users from Firestore",
                report.processed_users,
                report.total_users
            );
        }
        Err(e) => error!(error = %e, "document purge aborted"),
    }

    Ok(())
}
