use super::{AccountDirectory, LIST_USERS_PAGE_SIZE};
use crate::auth::AuthError;
use tracing::{info, warn};

/// Result of a bulk Auth purge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccountPurgeReport {
    /// Listing calls made.
    pub pages: usize,
    /// Accounts a deletion was attempted for.
    pub attempted: usize,
    /// Accounts deleted without error.
    pub deleted: usize,
    /// `(uid, error message)` for every failed deletion.
    pub failed: Vec<(String, String)>,
}

/// Deletes every account known to Auth.
///
/// Pages of [`LIST_USERS_PAGE_SIZE`] are fetched until the listing stops returning a
/// continuation token. Each account gets exactly one deletion attempt; a failure is logged
/// and recorded without stopping the run. A failed listing call aborts the run.
pub async fn purge_accounts<D>(directory: &D) -> Result<AccountPurgeReport, AuthError>
where
    D: AccountDirectory + ?Sized,
{
    let mut report = AccountPurgeReport::default();
    let mut page_token: Option<String> = None;

    info!("listing all accounts");

    loop {
        let page = directory
            .list_users(LIST_USERS_PAGE_SIZE, page_token.as_deref())
            .await?;
        report.pages += 1;

        let users = page.users.unwrap_or_default();
        info!(page = report.pages, accounts = users.len(), "fetched account page");

        for (index, user) in users.iter().enumerate() {
            report.attempted += 1;
            match directory.delete_user(&user.local_id).await {
                Ok(()) => {
                    report.deleted += 1;
                    info!(
                        account = user.label(),
                        progress = %format!("{}/{}", index + 1, users.len()),
                        total_deleted = report.deleted,
                        "account deleted"
                    );
                }
                Err(e) => {
                    warn!(account = user.label(), error = %e, "failed to delete account");
                    report.failed.push((user.local_id.clone(), e.to_string()));
                }
            }
        }

        match page.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    info!(
        deleted = report.deleted,
        failed = report.failed.len(),
        pages = report.pages,
        "account purge finished"
    );
    Ok(report)
}
