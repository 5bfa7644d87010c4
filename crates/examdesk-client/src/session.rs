//! Session manager: the single in-memory record of who is signed in.
//!
//! The access credential lives only in memory; the refresh credential lives
//! in a [`CredentialStore`]. [`SessionHandle`] is the shared, cloneable state
//! and [`SessionManager`] drives it against an [`AuthBackend`].
//!
//! Refreshes are single-flight: callers queue on an async gate, and a caller
//! that finds the access credential replaced while it waited reuses the new
//! one instead of exchanging again.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, instrument, warn};

use examdesk_core::error::ClientError;
use examdesk_core::model::{ClassMembership, User};
use examdesk_core::traits::{AuthBackend, CredentialStore};
use examdesk_core::validation::{SignInForm, SignUpForm};

/// Snapshot of the in-memory session. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub user: Option<User>,
    /// `None` until fetched.
    pub classes: Option<Vec<ClassMembership>>,
    /// True while any session operation is in flight.
    pub loading: bool,
}

impl SessionState {
    /// No credential, no profile, no classes, not loading.
    pub fn is_pristine(&self) -> bool {
        *self == SessionState::default()
    }
}

/// What a page asks of the session before it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// Needs a signed-in user.
    Protected,
    /// Only for signed-out users (sign-in, sign-up).
    PublicOnly,
    /// Anyone.
    Public,
}

/// Outcome of a route guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// A session operation is still running.
    Pending,
    RedirectToSignIn,
    RedirectHome,
    Render,
}

#[derive(Debug, Default)]
struct Fields {
    access_token: Option<String>,
    user: Option<User>,
    classes: Option<Vec<ClassMembership>>,
}

struct Inner {
    fields: RwLock<Fields>,
    /// Bumped whenever the access credential changes or the session clears.
    generation: AtomicU64,
    in_flight: AtomicUsize,
    refresh_gate: tokio::sync::Mutex<()>,
    store: Arc<dyn CredentialStore>,
}

/// Shared session state plus the credential store.
///
/// Locks are never held across an `.await`.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = self.read();
        f.debug_struct("SessionHandle")
            .field("access_token", &fields.access_token.as_ref().map(|_| "***"))
            .field("user", &fields.user.as_ref().map(|u| &u.username))
            .field("generation", &self.generation())
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Marks the session as loading for as long as it is alive.
#[must_use]
pub struct LoadingGuard {
    inner: Arc<Inner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl SessionHandle {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                fields: RwLock::new(Fields::default()),
                generation: AtomicU64::new(0),
                in_flight: AtomicUsize::new(0),
                refresh_gate: tokio::sync::Mutex::new(()),
                store,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Fields> {
        self.inner.fields.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Fields> {
        self.inner.fields.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> SessionState {
        let fields = self.read();
        SessionState {
            access_token: fields.access_token.clone(),
            user: fields.user.clone(),
            classes: fields.classes.clone(),
            loading: self.is_loading(),
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn classes(&self) -> Option<Vec<ClassMembership>> {
        self.read().classes.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) > 0
    }

    /// Changes every time the access credential is replaced or cleared.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.inner.store
    }

    /// The persisted refresh credential, if any.
    pub fn refresh_credential(&self) -> Result<Option<String>, ClientError> {
        self.inner.store.load()
    }

    pub fn begin_loading(&self) -> LoadingGuard {
        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        LoadingGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub(crate) fn set_access_token(&self, token: String) {
        let mut fields = self.write();
        fields.access_token = Some(token);
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn set_user(&self, user: User) {
        self.write().user = Some(user);
    }

    pub(crate) fn set_classes(&self, classes: Vec<ClassMembership>) {
        self.write().classes = Some(classes);
    }

    /// Forget the cached class list so the next bootstrap refetches it.
    pub(crate) fn invalidate_classes(&self) {
        self.write().classes = None;
    }

    /// Drop the access credential and profile, keeping the refresh credential.
    pub(crate) fn clear_access(&self) {
        let mut fields = self.write();
        fields.access_token = None;
        fields.user = None;
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Clear memory and the persisted refresh credential. A store failure is
    /// logged; the in-memory state is cleared regardless.
    pub(crate) fn clear(&self) {
        {
            let mut fields = self.write();
            *fields = Fields::default();
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
        }
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "failed to remove persisted refresh credential");
        }
    }

    /// Decide what a route should do with the current session.
    pub fn guard(&self, route: RouteKind) -> GuardDecision {
        if self.is_loading() {
            return GuardDecision::Pending;
        }
        let fields = self.read();
        match route {
            RouteKind::Protected if fields.access_token.is_none() => {
                GuardDecision::RedirectToSignIn
            }
            RouteKind::PublicOnly if fields.access_token.is_some() && fields.user.is_some() => {
                GuardDecision::RedirectHome
            }
            _ => GuardDecision::Render,
        }
    }
}

/// Refreshes allowed per call before a denial is returned.
pub const DEFAULT_MAX_AUTH_RETRIES: u32 = 4;

/// Drives the session lifecycle against a backend.
pub struct SessionManager<B> {
    backend: B,
    session: SessionHandle,
    max_auth_retries: u32,
}

impl<B: AuthBackend> SessionManager<B> {
    pub fn new(backend: B, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_handle(backend, SessionHandle::new(store))
    }

    pub fn with_handle(backend: B, session: SessionHandle) -> Self {
        Self {
            backend,
            session,
            max_auth_retries: DEFAULT_MAX_AUTH_RETRIES,
        }
    }

    pub fn with_max_auth_retries(mut self, max_auth_retries: u32) -> Self {
        self.max_auth_retries = max_auth_retries;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Register an account. Nothing in the session changes.
    #[instrument(skip_all, fields(username = %form.username))]
    pub async fn sign_up(&self, form: SignUpForm) -> Result<(), ClientError> {
        let request = form.into_request()?;
        let _loading = self.session.begin_loading();
        self.backend.sign_up(&request).await?;
        info!("account created");
        Ok(())
    }

    /// Sign in and load the profile. Any failure leaves the session cleared.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<User, ClientError> {
        SignInForm {
            username: username.to_string(),
            password: password.to_string(),
        }
        .validate()?;

        let _loading = self.session.begin_loading();
        let result = self.sign_in_inner(username, password).await;
        match result {
            Ok(user) => {
                info!(user_id = %user.id, "signed in");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "sign-in failed");
                self.session.clear();
                Err(e)
            }
        }
    }

    async fn sign_in_inner(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let refresh_token = self.backend.sign_in(username, password).await?;
        self.session.store().save(&refresh_token)?;
        // a stale profile from an earlier session must not survive
        self.session.clear_access();
        self.refresh().await?;
        self.session.user().ok_or(ClientError::NotSignedIn)
    }

    /// Exchange the persisted refresh credential for a new access credential,
    /// then load the profile if none is cached.
    ///
    /// Concurrent callers are coalesced into one exchange.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let observed = self.session.generation();
        self.refresh_since(observed).await
    }

    /// Like [`refresh`](Self::refresh), but skips the exchange if the access
    /// credential changed after generation `observed` was read.
    #[instrument(skip(self))]
    pub async fn refresh_since(&self, observed: u64) -> Result<(), ClientError> {
        let _loading = self.session.begin_loading();
        let _gate = self.session.inner.refresh_gate.lock().await;

        if self.session.generation() != observed && self.session.access_token().is_some() {
            debug!("access credential replaced while waiting, reusing it");
            return Ok(());
        }
        self.exchange().await
    }

    /// Run an authorized call with the current access credential. A
    /// `Denied` answer triggers one refresh and a replay, at most
    /// `max_auth_retries` times; the next denial is returned as is.
    ///
    /// Must not be called while the refresh gate is held.
    pub async fn with_refresh<T, F, Fut>(&self, mut call: F) -> Result<T, ClientError>
    where
        F: FnMut(Option<String>) -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut refreshes = 0;
        loop {
            let observed = self.session.generation();
            match call(self.session.access_token()).await {
                Err(e) if e.is_auth_denied() => {
                    if refreshes >= self.max_auth_retries {
                        warn!(refreshes, "still denied after refreshing, giving up");
                        return Err(e);
                    }
                    refreshes += 1;
                    debug!(attempt = refreshes, "request denied, refreshing credential");
                    self.refresh_since(observed).await?;
                }
                other => return other,
            }
        }
    }

    async fn exchange(&self) -> Result<(), ClientError> {
        let refresh_token = match self.session.refresh_credential() {
            Ok(Some(token)) => token,
            Ok(None) => {
                warn!("no refresh credential stored, clearing session");
                self.session.clear();
                return Err(ClientError::MissingRefreshCredential);
            }
            Err(e) => {
                warn!(error = %e, "could not read refresh credential, clearing session");
                self.session.clear();
                return Err(e);
            }
        };

        match self.backend.exchange_token(&refresh_token).await {
            Ok(access_token) if !access_token.is_empty() => {
                self.session.set_access_token(access_token);
            }
            Ok(_) => {
                warn!("token exchange returned an empty credential, clearing session");
                self.session.clear();
                return Err(ClientError::Decode("empty access credential".into()));
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                self.session.clear();
                return Err(e);
            }
        }
        debug!("access credential refreshed");

        if self.session.user().is_none() {
            // runs under the refresh gate, so a single attempt
            let token = self.session.access_token().ok_or(ClientError::NotSignedIn)?;
            let result = self.backend.get_me(&token).await;
            self.settle_profile(result)?;
        }
        Ok(())
    }

    /// Load the signed-in user's profile, refreshing on denial. On failure
    /// the access credential and profile are dropped; the refresh credential
    /// is kept.
    #[instrument(skip(self))]
    pub async fn fetch_profile(&self) -> Result<User, ClientError> {
        let _loading = self.session.begin_loading();
        let backend = &self.backend;
        let result = self
            .with_refresh(move |token| async move {
                let token = token.ok_or(ClientError::NotSignedIn)?;
                backend.get_me(&token).await
            })
            .await;
        self.settle_profile(result)
    }

    fn settle_profile(&self, result: Result<User, ClientError>) -> Result<User, ClientError> {
        match result {
            Ok(user) => {
                self.session.set_user(user.clone());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "failed to load profile");
                self.session.clear_access();
                Err(e)
            }
        }
    }

    /// Load the signed-in user's class list, refreshing on denial.
    #[instrument(skip(self))]
    pub async fn fetch_classes(&self) -> Result<Vec<ClassMembership>, ClientError> {
        let _loading = self.session.begin_loading();
        let backend = &self.backend;
        let classes = self
            .with_refresh(move |token| async move {
                let token = token.ok_or(ClientError::NotSignedIn)?;
                backend.get_my_classes(&token).await
            })
            .await?;
        self.session.set_classes(classes.clone());
        Ok(classes)
    }

    /// Clear the session locally, then tell the backend. The backend call is
    /// best-effort and never fails the sign-out.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let _loading = self.session.begin_loading();
        let refresh_token = self.session.refresh_credential().ok().flatten();
        self.session.clear();
        info!("signed out");

        if let Some(token) = refresh_token {
            if let Err(e) = self.backend.sign_out(&token).await {
                warn!(error = %e, "backend sign-out failed, local session already cleared");
            }
        }
    }

    /// Bring the session up to what `route` needs. Failures are logged,
    /// never returned; call [`SessionHandle::guard`] afterwards.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self, route: RouteKind) {
        let _loading = self.session.begin_loading();

        if self.session.access_token().is_none() {
            match self.session.refresh_credential() {
                Ok(Some(_)) => {
                    if let Err(e) = self.refresh().await {
                        warn!(error = %e, "bootstrap refresh failed");
                    }
                }
                Ok(None) => debug!("no stored credential, staying signed out"),
                Err(e) => warn!(error = %e, "could not read refresh credential"),
            }
        }

        if self.session.access_token().is_some() && self.session.user().is_none() {
            if let Err(e) = self.fetch_profile().await {
                warn!(error = %e, "bootstrap profile fetch failed");
            }
        }

        if route == RouteKind::Protected
            && self.session.access_token().is_some()
            && self.session.classes().is_none()
        {
            if let Err(e) = self.fetch_classes().await {
                warn!(error = %e, "bootstrap class fetch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::store::MemoryCredentialStore;

    fn manager(backend: MockBackend) -> (SessionManager<MockBackend>, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (SessionManager::new(backend, store.clone()), store)
    }

    #[tokio::test]
    async fn sign_in_then_sign_out_is_pristine() {
        let (manager, store) = manager(MockBackend::new());

        let user = manager.sign_in("student01", "secret123").await.unwrap();
        assert_eq!(user.username, "student01");
        let state = manager.session().snapshot();
        assert!(state.access_token.is_some());
        assert!(state.user.is_some());
        assert!(!state.loading);
        assert!(store.load().unwrap().is_some());

        manager.sign_out().await;
        assert!(manager.session().snapshot().is_pristine());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(manager.backend().sign_out_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_sign_in_never_reaches_backend() {
        let (manager, _) = manager(MockBackend::new());
        let err = manager.sign_in("abc", "123").await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert_eq!(manager.backend().sign_in_calls(), 0);
    }

    #[tokio::test]
    async fn rejected_sign_in_leaves_session_cleared() {
        let (manager, store) = manager(MockBackend::new().reject_sign_in());
        let err = manager.sign_in("student01", "wrongpass").await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationFailed(_)));
        assert!(manager.session().snapshot().is_pristine());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(manager.backend().exchange_calls(), 0);
    }

    #[tokio::test]
    async fn refresh_sets_access_credential() {
        let (manager, store) = manager(MockBackend::new());
        store.save("rt-seeded").unwrap();

        manager.refresh().await.unwrap();
        let state = manager.session().snapshot();
        assert!(state.access_token.is_some_and(|t| !t.is_empty()));
        assert!(state.user.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_clears_everything() {
        let (manager, store) = manager(MockBackend::new().reject_exchange());
        store.save("rt-revoked").unwrap();

        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::AuthenticationFailed(_)));
        assert!(manager.session().access_token().is_none());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn refresh_without_credential() {
        let (manager, _) = manager(MockBackend::new());
        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::MissingRefreshCredential));
        assert_eq!(manager.backend().exchange_calls(), 0);
    }

    #[tokio::test]
    async fn profile_failure_keeps_refresh_credential() {
        let (manager, store) = manager(MockBackend::new().fail_profile());
        store.save("rt-1").unwrap();

        let err = manager.refresh().await.unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 500, .. }));
        let state = manager.session().snapshot();
        assert!(state.access_token.is_none());
        assert!(state.user.is_none());
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn concurrent_refreshes_are_coalesced() {
        let backend = MockBackend::new().with_exchange_delay(std::time::Duration::from_millis(50));
        let (manager, store) = manager(backend);
        store.save("rt-1").unwrap();

        let (a, b, c) = tokio::join!(manager.refresh(), manager.refresh(), manager.refresh());
        a.unwrap();
        b.unwrap();
        c.unwrap();
        assert_eq!(manager.backend().exchange_calls(), 1);
        assert_eq!(manager.backend().get_me_calls(), 1);
    }

    #[tokio::test]
    async fn sign_out_survives_backend_failure() {
        let (manager, store) = manager(MockBackend::new().fail_sign_out());
        manager.sign_in("student01", "secret123").await.unwrap();

        manager.sign_out().await;
        assert!(manager.session().snapshot().is_pristine());
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn bootstrap_protected_route() {
        let (manager, store) = manager(MockBackend::new());
        assert_eq!(
            manager.session().guard(RouteKind::Protected),
            GuardDecision::RedirectToSignIn
        );

        store.save("rt-1").unwrap();
        manager.bootstrap(RouteKind::Protected).await;

        let state = manager.session().snapshot();
        assert!(state.access_token.is_some());
        assert!(state.user.is_some());
        assert_eq!(state.classes.map(|c| c.len()), Some(1));
        assert_eq!(
            manager.session().guard(RouteKind::Protected),
            GuardDecision::Render
        );
        assert_eq!(
            manager.session().guard(RouteKind::PublicOnly),
            GuardDecision::RedirectHome
        );
    }

    #[tokio::test]
    async fn bootstrap_swallows_failures() {
        let (manager, store) = manager(MockBackend::new().reject_exchange());
        store.save("rt-revoked").unwrap();

        manager.bootstrap(RouteKind::Protected).await;
        assert_eq!(
            manager.session().guard(RouteKind::Protected),
            GuardDecision::RedirectToSignIn
        );
        assert_eq!(
            manager.session().guard(RouteKind::PublicOnly),
            GuardDecision::Render
        );
    }

    #[tokio::test]
    async fn bootstrap_public_only_skips_classes() {
        let (manager, store) = manager(MockBackend::new());
        store.save("rt-1").unwrap();

        manager.bootstrap(RouteKind::PublicOnly).await;
        assert!(manager.session().classes().is_none());
        assert_eq!(manager.backend().classes_calls(), 0);
    }

    #[tokio::test]
    async fn bootstrap_with_held_credential_loads_profile() {
        let (manager, store) = manager(MockBackend::new());
        store.save("rt-1").unwrap();
        manager.session().set_access_token("at-held".into());

        manager.bootstrap(RouteKind::Protected).await;

        let state = manager.session().snapshot();
        assert_eq!(state.access_token.as_deref(), Some("at-held"));
        assert_eq!(state.user.map(|u| u.id).as_deref(), Some("user-1"));
        assert!(state.classes.is_some());
        assert_eq!(manager.backend().exchange_calls(), 0);
        assert_eq!(manager.backend().get_me_calls(), 1);
    }

    #[tokio::test]
    async fn denied_class_fetch_refreshes_and_replays() {
        let (manager, store) = manager(MockBackend::new().deny_access_token("at-stale"));
        store.save("rt-1").unwrap();
        manager.session().set_access_token("at-stale".into());
        manager.session().set_user(crate::mock::sample_user());

        let classes = manager.fetch_classes().await.unwrap();
        assert_eq!(classes.len(), 1);
        assert_eq!(manager.backend().exchange_calls(), 1);
        assert_eq!(manager.backend().classes_calls(), 2);
        assert_eq!(manager.session().access_token().as_deref(), Some("at-1"));
    }

    #[tokio::test]
    async fn denied_profile_fetch_refreshes_instead_of_dropping_credential() {
        let (manager, store) = manager(MockBackend::new().deny_access_token("at-stale"));
        store.save("rt-1").unwrap();
        manager.session().set_access_token("at-stale".into());

        let user = manager.fetch_profile().await.unwrap();
        assert_eq!(user.username, "student01");
        assert_eq!(manager.backend().exchange_calls(), 1);
        assert_eq!(manager.session().access_token().as_deref(), Some("at-1"));
    }

    #[tokio::test]
    async fn denial_after_every_refresh_is_returned() {
        let backend = MockBackend::new().deny_access_token("at-stale");
        let store = Arc::new(MemoryCredentialStore::with_token("rt-1"));
        let manager = SessionManager::new(backend, store).with_max_auth_retries(2);

        let mut calls = 0;
        let err = manager
            .with_refresh(|_token| {
                calls += 1;
                async { Err::<(), _>(ClientError::Denied { status: 401 }) }
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Denied { status: 401 }));
        assert_eq!(calls, 3);
        assert_eq!(manager.backend().exchange_calls(), 2);
    }

    #[tokio::test]
    async fn sign_in_over_corrupt_credential_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, r#"{"refreshTok"#).unwrap();
        let store = Arc::new(crate::store::FileCredentialStore::new(&path));
        let manager = SessionManager::new(MockBackend::new(), store.clone());

        let user = manager.sign_in("student01", "secret123").await.unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(store.load().unwrap().as_deref(), Some("rt-student01-1"));

        manager.sign_out().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn guard_pending_while_loading() {
        let (manager, _) = manager(MockBackend::new());
        let guard = manager.session().begin_loading();
        assert_eq!(
            manager.session().guard(RouteKind::Public),
            GuardDecision::Pending
        );
        drop(guard);
        assert_eq!(
            manager.session().guard(RouteKind::Public),
            GuardDecision::Render
        );
    }

    #[tokio::test]
    async fn sign_up_validates_locally() {
        let (manager, _) = manager(MockBackend::new());
        let form = SignUpForm {
            username: "abc".into(),
            password: "secret123".into(),
            email: "student@example.com".into(),
            first_name: "An".into(),
            last_name: "Nguyen".into(),
            gender: None,
            birth: None,
        };
        let err = manager.sign_up(form).await.unwrap_err();
        match err {
            ClientError::Validation(errors) => {
                assert!(errors.get("username").is_some());
                assert!(errors.get("gender").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(manager.backend().sign_up_calls(), 0);
        assert!(manager.session().snapshot().is_pristine());
    }
}
