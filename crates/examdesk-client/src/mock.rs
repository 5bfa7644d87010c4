//! Mock backend for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use examdesk_core::error::ClientError;
use examdesk_core::model::{ClassMembership, ClassSummary, MembershipInfo, User};
use examdesk_core::traits::AuthBackend;
use examdesk_core::validation::SignUpRequest;

/// An in-process [`AuthBackend`] for exercising the session manager
/// without a server.
///
/// Every call is counted; failures are switched on with the builder methods.
#[derive(Debug, Default)]
pub struct MockBackend {
    reject_sign_in: bool,
    reject_exchange: bool,
    fail_profile: bool,
    fail_sign_out: bool,
    exchange_delay: Option<Duration>,
    denied_token: Option<String>,
    sign_up_calls: AtomicU32,
    sign_in_calls: AtomicU32,
    exchange_calls: AtomicU32,
    sign_out_calls: AtomicU32,
    get_me_calls: AtomicU32,
    classes_calls: AtomicU32,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sign-in answers with bad credentials.
    pub fn reject_sign_in(mut self) -> Self {
        self.reject_sign_in = true;
        self
    }

    /// Token exchange answers as if the refresh credential were revoked.
    pub fn reject_exchange(mut self) -> Self {
        self.reject_exchange = true;
        self
    }

    /// Profile fetch answers with a server error.
    pub fn fail_profile(mut self) -> Self {
        self.fail_profile = true;
        self
    }

    /// Sign-out notification fails with a network error.
    pub fn fail_sign_out(mut self) -> Self {
        self.fail_sign_out = true;
        self
    }

    /// Hold every token exchange for `delay` before answering.
    pub fn with_exchange_delay(mut self, delay: Duration) -> Self {
        self.exchange_delay = Some(delay);
        self
    }

    /// Profile and class fetches answer 403 for this access credential.
    pub fn deny_access_token(mut self, token: &str) -> Self {
        self.denied_token = Some(token.to_string());
        self
    }

    fn is_denied(&self, access_token: &str) -> bool {
        access_token.is_empty() || self.denied_token.as_deref() == Some(access_token)
    }

    pub fn sign_up_calls(&self) -> u32 {
        self.sign_up_calls.load(Ordering::Relaxed)
    }

    pub fn sign_in_calls(&self) -> u32 {
        self.sign_in_calls.load(Ordering::Relaxed)
    }

    pub fn exchange_calls(&self) -> u32 {
        self.exchange_calls.load(Ordering::Relaxed)
    }

    pub fn sign_out_calls(&self) -> u32 {
        self.sign_out_calls.load(Ordering::Relaxed)
    }

    pub fn get_me_calls(&self) -> u32 {
        self.get_me_calls.load(Ordering::Relaxed)
    }

    pub fn classes_calls(&self) -> u32 {
        self.classes_calls.load(Ordering::Relaxed)
    }
}

/// The profile every successful `get_me` returns.
pub fn sample_user() -> User {
    User {
        id: "user-1".into(),
        username: "student01".into(),
        email: "student01@example.com".into(),
        first_name: "An".into(),
        last_name: "Nguyen".into(),
        gender: "female".into(),
        birth: "2007-03-09".into(),
        role: "user".into(),
        is_verified: true,
        bio: String::new(),
        create_at: None,
        update_at: None,
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn sign_up(&self, _request: &SignUpRequest) -> Result<(), ClientError> {
        self.sign_up_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn sign_in(&self, username: &str, _password: &str) -> Result<String, ClientError> {
        let n = self.sign_in_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if self.reject_sign_in {
            return Err(ClientError::AuthenticationFailed(
                "invalid username or password".into(),
            ));
        }
        Ok(format!("rt-{username}-{n}"))
    }

    async fn exchange_token(&self, refresh_token: &str) -> Result<String, ClientError> {
        let n = self.exchange_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(delay) = self.exchange_delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_exchange || refresh_token.is_empty() {
            return Err(ClientError::AuthenticationFailed(
                "refresh token revoked".into(),
            ));
        }
        Ok(format!("at-{n}"))
    }

    async fn sign_out(&self, _refresh_token: &str) -> Result<(), ClientError> {
        self.sign_out_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_sign_out {
            return Err(ClientError::NetworkError("connection reset".into()));
        }
        Ok(())
    }

    async fn get_me(&self, access_token: &str) -> Result<User, ClientError> {
        self.get_me_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_profile {
            return Err(ClientError::ApiError {
                status: 500,
                message: "profile service unavailable".into(),
            });
        }
        if self.is_denied(access_token) {
            return Err(ClientError::Denied { status: 403 });
        }
        Ok(sample_user())
    }

    async fn get_my_classes(
        &self,
        access_token: &str,
    ) -> Result<Vec<ClassMembership>, ClientError> {
        self.classes_calls.fetch_add(1, Ordering::Relaxed);
        if self.is_denied(access_token) {
            return Err(ClientError::Denied { status: 403 });
        }
        Ok(vec![ClassMembership {
            info: MembershipInfo {
                user_id: "user-1".into(),
                class_id: "class-1".into(),
                role: "member".into(),
                joined_at: None,
            },
            class: ClassSummary {
                name: "Math 10A".into(),
                max_mem: Some(40),
                description: None,
            },
        }])
    }
}
