pub mod auth;
pub mod config;
pub mod core;
pub mod firestore;
pub mod purge;
pub mod trigger;

pub use yup_oauth2;

use auth::FirebaseAuth;
use firestore::FirebaseFirestore;
use reqwest_middleware::ClientWithMiddleware;
use yup_oauth2::ServiceAccountKey;

/// Process-wide handle to one Firebase project.
///
/// Built once at startup from explicit credentials; the clients it hands out share a
/// single authenticated HTTP stack.
pub struct FirebaseApp {
    client: ClientWithMiddleware,
    project_id: String,
}

impl FirebaseApp {
    pub fn new(service_account_key: ServiceAccountKey, project_id: String) -> Self {
        Self {
            client: crate::core::build_client(service_account_key),
            project_id,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn auth(&self) -> FirebaseAuth {
        FirebaseAuth::new(self.client.clone(), &self.project_id)
    }

    pub fn firestore(&self) -> FirebaseFirestore {
        FirebaseFirestore::new(self.client.clone(), &self.project_id)
    }
}
