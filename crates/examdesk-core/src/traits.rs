//! Seams between the session manager and the outside world.
//!
//! [`AuthBackend`] is implemented over HTTP by `examdesk-client` and by a
//! mock for tests; [`CredentialStore`] persists the refresh credential.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::model::{ClassMembership, User};
use crate::validation::SignUpRequest;

/// Key under which the refresh credential is persisted.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// The credential and profile endpoints the session manager drives.
///
/// Implementations make exactly one call per method: no refresh, no replay.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<(), ClientError>;

    /// Exchange username and password for a refresh credential.
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, ClientError>;

    /// Exchange a refresh credential for an access credential.
    async fn exchange_token(&self, refresh_token: &str) -> Result<String, ClientError>;

    /// Tell the backend the refresh credential is no longer in use.
    async fn sign_out(&self, refresh_token: &str) -> Result<(), ClientError>;

    /// Profile of the user owning `access_token`.
    async fn get_me(&self, access_token: &str) -> Result<User, ClientError>;

    /// Classes the user owning `access_token` belongs to.
    async fn get_my_classes(&self, access_token: &str)
        -> Result<Vec<ClassMembership>, ClientError>;
}

/// A single persisted slot for the refresh credential. Last writer wins.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, ClientError>;

    fn save(&self, refresh_token: &str) -> Result<(), ClientError>;

    /// Remove the credential. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), ClientError>;
}
