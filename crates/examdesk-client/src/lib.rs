//! examdesk-client: session management and REST bindings.
//!
//! [`SessionManager`] owns the sign-in lifecycle and token refresh;
//! [`ApiClient`] layers the class, exam and submission endpoints on top,
//! refreshing and replaying requests the backend denies.

pub mod api;
pub mod config;
pub mod mock;
pub mod session;
pub mod store;
pub mod transport;

pub use api::ApiClient;
pub use config::{create_credential_store, load_config, load_config_from, ClientConfig};
pub use session::{
    GuardDecision, RouteKind, SessionHandle, SessionManager, SessionState, DEFAULT_MAX_AUTH_RETRIES,
};
pub use store::{FileCredentialStore, MemoryCredentialStore};
pub use transport::HttpBackend;
