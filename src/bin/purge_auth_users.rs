//! Deletes every Firebase Auth account of the configured project.
//!
//! Credentials come from `GOOGLE_APPLICATION_CREDENTIALS` (default `serviceAccountKey.json`).
//! Exits 0 once the run ends, even when individual deletions or the listing failed.

use firebase_user_purge::config::PurgeConfig;
use firebase_user_purge::core::init_tracing;
use firebase_user_purge::purge::accounts::purge_accounts;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app = PurgeConfig::from_env()?.load_app().await?;
    let auth = app.auth();

    match purge_accounts(&auth).await {
        Ok(report) => {
            info!(
                deleted = report.deleted,
                failed = report.failed.len(),
                "deleted {} accounts in total",
                report.deleted
            );
        }
        Err(e) => error!(error = %e, "account purge aborted"),
    }

    Ok(())
}
