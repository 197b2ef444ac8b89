// auth/bootstrap.rs - Single source of truth for "who is signed in"
//
// The bootstrap reconciles two asynchronous flows: a one-time session restore
// at mount and a subscription to auth-change events. Both write through the
// same `watch` sender; nothing else in the application can mutate the state.
// Consumers get a read-only `AuthHandle`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::permissions::Permissions;
use crate::backend::{AuthChangeEvent, AuthClient, AuthenticatedUser, BackendError, Session};
use crate::models::UserProfile;
use crate::notify::{Notifier, Toast};
use crate::services::Repository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Uninitialized,
    Restoring,
    Authenticated,
    Unauthenticated,
}

/// Snapshot of the authentication state
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub phase: AuthPhase,
    pub session: Option<Session>,
    pub user: Option<AuthenticatedUser>,
    /// Best-effort; `None` is valid even when authenticated
    pub profile: Option<UserProfile>,
    pub loading: bool,
}

impl AuthState {
    fn initial() -> Self {
        Self {
            phase: AuthPhase::Uninitialized,
            session: None,
            user: None,
            profile: None,
            loading: true,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn permissions(&self) -> Permissions {
        if self.user.is_none() {
            return Permissions::none();
        }
        Permissions::for_profile(self.profile.as_ref())
    }

    /// First half of establishing a session: the user is visible right away,
    /// `loading` stays up until the profile lookup settles
    fn establish(&mut self, session: Session) {
        let user = session.user.clone();
        if self.user_id() != Some(user.id) {
            self.profile = None;
        }
        self.user = Some(user);
        self.session = Some(session);
        self.phase = AuthPhase::Authenticated;
        self.loading = true;
    }

    /// Second half: attach the profile if it still belongs to the signed-in user
    fn attach_profile(&mut self, user_id: Uuid, profile: Option<UserProfile>) {
        if self.user_id() == Some(user_id) {
            self.profile = profile.filter(|p| {
                let same = p.id == user_id;
                if !same {
                    tracing::warn!("Discarding profile {} fetched for user {}", p.id, user_id);
                }
                same
            });
        }
        self.loading = false;
    }

    fn clear(&mut self) {
        self.session = None;
        self.user = None;
        self.profile = None;
        self.phase = AuthPhase::Unauthenticated;
        self.loading = false;
    }

    fn user_id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Read-only view of the bootstrap state
#[derive(Debug, Clone)]
pub struct AuthHandle {
    rx: watch::Receiver<AuthState>,
}

impl AuthHandle {
    pub fn current(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// Wait for the next state change. Returns `false` once the bootstrap is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the state satisfies `predicate`; `None` if the bootstrap was
    /// unmounted first.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&AuthState) -> bool) -> Option<AuthState> {
        self.rx.wait_for(predicate).await.ok().map(|state| state.clone())
    }
}

struct Inner {
    tx: watch::Sender<AuthState>,
    alive: AtomicBool,
    /// Bumped by every event-driven write; lets a slow restore notice it is stale
    event_writes: AtomicU64,
    auth: Arc<dyn AuthClient>,
    profiles: Arc<dyn Repository<UserProfile>>,
    notifier: Arc<dyn Notifier>,
}

impl Inner {
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Apply `f` unless unmounted. Subscribers are only woken on real changes.
    fn write(&self, f: impl FnOnce(&mut AuthState)) {
        if !self.is_alive() {
            return;
        }
        self.tx.send_if_modified(|state| {
            let before = state.clone();
            f(state);
            *state != before
        });
    }

    fn write_from_event(&self, f: impl FnOnce(&mut AuthState)) {
        self.write(|state| {
            self.event_writes.fetch_add(1, Ordering::SeqCst);
            f(state);
        });
    }

    /// Apply a restore result only if no event has written since `epoch`
    fn write_from_restore(&self, epoch: u64, f: impl FnOnce(&mut AuthState)) {
        self.write(|state| {
            // Every event-driven write path ends with `loading` cleared
            if self.event_writes.load(Ordering::SeqCst) != epoch {
                tracing::debug!("Discarding stale session restore result");
                return;
            }
            f(state);
        });
    }

    async fn fetch_profile(&self, user_id: Uuid) -> Option<UserProfile> {
        match self.profiles.get_by_id(user_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                tracing::warn!("No profile found for user {}", user_id);
                None
            }
            Err(e) => {
                tracing::warn!("Profile fetch failed for user {}: {}", user_id, e);
                None
            }
        }
    }

    async fn establish_from_event(&self, session: Session) {
        let user_id = session.user.id;
        self.write_from_event(|state| state.establish(session));
        let profile = self.fetch_profile(user_id).await;
        self.write_from_event(|state| state.attach_profile(user_id, profile));
    }

    async fn restore(self: Arc<Self>, epoch: u64) {
        let outcome = self.auth.get_session().await;
        if !self.is_alive() {
            return;
        }

        match outcome {
            Ok(Some(session)) => {
                let user_id = session.user.id;
                tracing::debug!("Restored session for user {}", user_id);
                self.write_from_restore(epoch, |state| state.establish(session));
                let profile = self.fetch_profile(user_id).await;
                self.write_from_restore(epoch, |state| state.attach_profile(user_id, profile));
            }
            Ok(None) => {
                tracing::debug!("No existing session");
                self.write_from_restore(epoch, AuthState::clear);
            }
            Err(e) => {
                tracing::error!("Session restore failed: {}", e);
                self.write_from_restore(epoch, AuthState::clear);
            }
        }
    }

    async fn listen(self: Arc<Self>, mut events: broadcast::Receiver<AuthChangeEvent>) {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth subscription lagged, skipped {} events", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if !self.is_alive() {
                break;
            }
            self.handle_event(event).await;
        }
    }

    async fn handle_event(&self, event: AuthChangeEvent) {
        tracing::debug!("Auth state change: {}", event.name());

        match event {
            AuthChangeEvent::SignedIn(session) => {
                self.establish_from_event(session).await;
            }
            AuthChangeEvent::SignedOut => {
                self.write_from_event(AuthState::clear);
            }
            AuthChangeEvent::TokenRefreshed(session) | AuthChangeEvent::UserUpdated(session) => {
                let current = self.tx.borrow().user_id();
                if current == Some(session.user.id) {
                    self.write_from_event(|state| {
                        state.user = Some(session.user.clone());
                        state.session = Some(session);
                        state.loading = false;
                    });
                } else {
                    // Provider vouches for a session we did not know about yet
                    self.establish_from_event(session).await;
                }
            }
            AuthChangeEvent::PasswordRecovery => {
                self.write(|state| state.loading = false);
            }
        }
    }
}

/// Owner of the auth state. Dropping it unmounts: the subscription is aborted
/// and in-flight results are discarded.
pub struct AuthBootstrap {
    inner: Arc<Inner>,
    rx: watch::Receiver<AuthState>,
    tasks: Vec<JoinHandle<()>>,
}

impl AuthBootstrap {
    /// Start the restore check and the auth-change subscription. Must be
    /// called from within a tokio runtime.
    pub fn mount(
        auth: Arc<dyn AuthClient>,
        profiles: Arc<dyn Repository<UserProfile>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (tx, rx) = watch::channel(AuthState::initial());

        // Subscribe before restoring so no event can slip between the two
        let events = auth.subscribe();

        let inner = Arc::new(Inner {
            tx,
            alive: AtomicBool::new(true),
            event_writes: AtomicU64::new(0),
            auth,
            profiles,
            notifier,
        });

        inner.write(|state| state.phase = AuthPhase::Restoring);
        let epoch = inner.event_writes.load(Ordering::SeqCst);

        let tasks = vec![
            tokio::spawn(inner.clone().restore(epoch)),
            tokio::spawn(inner.clone().listen(events)),
        ];

        Self { inner, rx, tasks }
    }

    pub fn handle(&self) -> AuthHandle {
        AuthHandle { rx: self.rx.clone() }
    }

    pub fn state(&self) -> AuthState {
        self.rx.borrow().clone()
    }

    /// Sign in with email and password. The state update arrives through the
    /// `SignedIn` event.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        match self.inner.auth.sign_in_with_password(email, password).await {
            Ok(session) => {
                self.inner
                    .notifier
                    .notify(Toast::success("Welcome back", "You have signed in successfully."));
                Ok(session)
            }
            Err(e) => {
                tracing::error!("Sign in failed: {}", e);
                self.inner.notifier.notify(Toast::error("Sign in failed", e.user_message()));
                Err(e)
            }
        }
    }

    /// Sign out. `loading` is false again once this returns, whatever the
    /// outcome. On failure the local state is left as it was; the provider's
    /// next auth-change event decides.
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        self.inner.write(|state| state.loading = true);

        let result = self.inner.auth.sign_out().await;
        match &result {
            Ok(()) => {
                self.inner.write_from_event(AuthState::clear);
                self.inner
                    .notifier
                    .notify(Toast::success("Signed out", "You have been signed out successfully."));
            }
            Err(e) => {
                tracing::error!("Sign out failed: {}", e);
                self.inner.notifier.notify(Toast::error("Error signing out", e.user_message()));
            }
        }

        self.inner.write(|state| state.loading = false);
        result
    }

    /// Re-fetch the current user's profile, e.g. after it was edited
    pub async fn refresh_profile(&self) -> Option<UserProfile> {
        let user_id = self.rx.borrow().user_id()?;
        let profile = self.inner.fetch_profile(user_id).await;
        let fetched = profile.clone();
        self.inner.write(|state| {
            if state.user_id() == Some(user_id) {
                state.profile = profile;
            }
        });
        fetched
    }

    pub fn unmount(self) {
        // Drop does the work
    }
}

impl Drop for AuthBootstrap {
    fn drop(&mut self) {
        self.inner.alive.store(false, Ordering::SeqCst);
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FailPoint, MemoryBackend};
    use crate::guard::{GuardDecision, RouteGuard};
    use crate::models::{Record, Role};
    use crate::notify::{ToastQueue, ToastVariant};
    use crate::services::{RemoteRepository, ServiceError};
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn profiles_for(backend: &Arc<MemoryBackend>) -> Arc<dyn Repository<UserProfile>> {
        Arc::new(RemoteRepository::<UserProfile>::new(backend.clone()))
    }

    fn seed_user(backend: &MemoryBackend, with_profile: bool) -> AuthenticatedUser {
        let user = backend.add_account("rep@example.com", "pw");
        if with_profile {
            backend.insert_record(&UserProfile::new(user.id, Role::Representative));
        }
        user
    }

    async fn loaded(handle: &mut AuthHandle) -> AuthState {
        tokio::time::timeout(Duration::from_secs(2), handle.wait_for(|s| !s.loading))
            .await
            .expect("bootstrap did not finish loading")
            .expect("bootstrap dropped")
    }

    /// Repository whose lookups always fail
    struct BrokenProfiles;

    #[async_trait]
    impl Repository<UserProfile> for BrokenProfiles {
        async fn get_all(&self) -> Result<Vec<UserProfile>, ServiceError> {
            Ok(vec![])
        }
        async fn get_by_id(&self, _id: Uuid) -> Result<Option<UserProfile>, ServiceError> {
            Err(ServiceError::Backend(BackendError::Network("offline".to_string())))
        }
        async fn find(&self, _query: &crate::backend::Query) -> Result<Vec<UserProfile>, ServiceError> {
            Ok(vec![])
        }
        async fn create(&self, record: UserProfile) -> Result<UserProfile, ServiceError> {
            Ok(record)
        }
        async fn update(&self, _id: Uuid, record: UserProfile) -> Result<UserProfile, ServiceError> {
            Ok(record)
        }
        async fn delete(&self, _id: Uuid) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    /// Repository whose lookups answer only after `delay`
    struct SlowProfiles {
        inner: Arc<dyn Repository<UserProfile>>,
        delay: Duration,
    }

    #[async_trait]
    impl Repository<UserProfile> for SlowProfiles {
        async fn get_all(&self) -> Result<Vec<UserProfile>, ServiceError> {
            self.inner.get_all().await
        }
        async fn get_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, ServiceError> {
            tokio::time::sleep(self.delay).await;
            self.inner.get_by_id(id).await
        }
        async fn find(&self, query: &crate::backend::Query) -> Result<Vec<UserProfile>, ServiceError> {
            self.inner.find(query).await
        }
        async fn create(&self, record: UserProfile) -> Result<UserProfile, ServiceError> {
            self.inner.create(record).await
        }
        async fn update(&self, id: Uuid, record: UserProfile) -> Result<UserProfile, ServiceError> {
            self.inner.update(id, record).await
        }
        async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
            self.inner.delete(id).await
        }
    }

    fn slow_profiles_for(backend: &Arc<MemoryBackend>) -> Arc<dyn Repository<UserProfile>> {
        Arc::new(SlowProfiles {
            inner: profiles_for(backend),
            delay: Duration::from_secs(5),
        })
    }

    /// Auth client whose session restore blocks until released
    struct GatedAuth {
        backend: Arc<MemoryBackend>,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl AuthClient for GatedAuth {
        async fn get_session(&self) -> Result<Option<Session>, BackendError> {
            self.gate.notified().await;
            Ok(None)
        }
        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, BackendError> {
            self.backend.sign_in_with_password(email, password).await
        }
        async fn sign_out(&self) -> Result<(), BackendError> {
            self.backend.sign_out().await
        }
        async fn get_user(&self, token: &str) -> Result<AuthenticatedUser, BackendError> {
            self.backend.get_user(token).await
        }
        fn subscribe(&self) -> broadcast::Receiver<AuthChangeEvent> {
            self.backend.subscribe()
        }
    }

    #[tokio::test]
    async fn restores_existing_session_with_profile() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let state = loaded(&mut bootstrap.handle()).await;

        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert_eq!(state.user.as_ref(), Some(&user));
        assert_eq!(state.profile.as_ref().map(|p| p.id), Some(user.id));
    }

    #[tokio::test]
    async fn no_session_resolves_unauthenticated() {
        let backend = Arc::new(MemoryBackend::new());
        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let state = loaded(&mut bootstrap.handle()).await;

        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(state.session.is_none() && state.user.is_none() && state.profile.is_none());
    }

    #[tokio::test]
    async fn restore_error_still_resolves_loading() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail(FailPoint::GetSession);
        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let state = loaded(&mut bootstrap.handle()).await;

        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn profile_failure_keeps_user_authenticated() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), Arc::new(BrokenProfiles), Arc::new(ToastQueue::new()));
        let state = loaded(&mut bootstrap.handle()).await;

        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert_eq!(state.user.map(|u| u.id), Some(user.id));
        assert!(state.profile.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn restored_user_is_visible_while_profile_loads() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), slow_profiles_for(&backend), Arc::new(ToastQueue::new()));
        let mut handle = bootstrap.handle();

        let state = handle.wait_for(|s| s.user.is_some()).await.unwrap();
        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert!(state.loading);
        assert!(state.profile.is_none());

        // Cutoff passes before the profile arrives; the session alone is enough
        let guard = RouteGuard::new(Duration::from_millis(2000));
        assert_eq!(guard.resolve(&mut handle).await, GuardDecision::Render);

        let state = handle.wait_for(|s| !s.loading).await.unwrap();
        assert_eq!(state.profile.map(|p| p.id), Some(user.id));
    }

    #[tokio::test(start_paused = true)]
    async fn signed_in_user_is_visible_while_profile_loads() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        let auth = Arc::new(GatedAuth {
            backend: backend.clone(),
            gate: Arc::new(Notify::new()),
        });

        let bootstrap = AuthBootstrap::mount(auth, slow_profiles_for(&backend), Arc::new(ToastQueue::new()));
        let mut handle = bootstrap.handle();
        bootstrap.sign_in("rep@example.com", "pw").await.unwrap();

        let state = handle.wait_for(|s| s.user.is_some()).await.unwrap();
        assert_eq!(state.user.as_ref().map(|u| u.id), Some(user.id));
        assert!(state.loading);

        let guard = RouteGuard::new(Duration::from_millis(2000));
        assert_eq!(guard.resolve(&mut handle).await, GuardDecision::Render);

        let state = handle.wait_for(|s| !s.loading).await.unwrap();
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn missing_profile_row_is_tolerated() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, false);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let state = loaded(&mut bootstrap.handle()).await;
        assert!(state.is_authenticated());
        assert!(state.profile.is_none());
        assert_eq!(state.permissions(), Permissions::for_profile(None));
    }

    #[tokio::test]
    async fn sign_in_event_before_restore_wins() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        let gate = Arc::new(Notify::new());
        let auth = Arc::new(GatedAuth {
            backend: backend.clone(),
            gate: gate.clone(),
        });

        let bootstrap = AuthBootstrap::mount(auth, profiles_for(&backend), Arc::new(ToastQueue::new()));
        let mut handle = bootstrap.handle();
        assert!(handle.current().loading);

        bootstrap.sign_in("rep@example.com", "pw").await.unwrap();
        let state = handle.wait_for(|s| s.is_authenticated() && !s.loading).await.unwrap();
        assert!(!state.loading);

        // Restore now reports "no session"; it must not undo the sign-in
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let state = handle.current();
        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert_eq!(state.user.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn loading_flips_once_per_establishment() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let mut handle = bootstrap.handle();
        loaded(&mut handle).await;

        // Refresh and recovery events must not put callers back into loading
        let session = backend.issue_session(&user);
        backend.emit(AuthChangeEvent::TokenRefreshed(session.clone()));
        backend.emit(AuthChangeEvent::PasswordRecovery);
        let state = handle.wait_for(|s| s.session.as_ref() == Some(&session)).await.unwrap();
        assert!(!state.loading);
        assert!(state.profile.is_some());
    }

    #[tokio::test]
    async fn signed_out_event_clears_everything() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        let mut handle = bootstrap.handle();
        loaded(&mut handle).await;

        backend.emit(AuthChangeEvent::SignedOut);
        let state = handle.wait_for(|s| s.phase == AuthPhase::Unauthenticated).await.unwrap();
        assert!(state.profile.is_none() && state.session.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn sign_out_success_clears_and_notifies() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);
        let toasts = ToastQueue::new();

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(toasts.clone()));
        loaded(&mut bootstrap.handle()).await;

        bootstrap.sign_out().await.unwrap();
        let state = bootstrap.state();
        assert!(!state.loading);
        assert_eq!(state.phase, AuthPhase::Unauthenticated);
        assert!(toasts.drain().iter().any(|t| t.variant == ToastVariant::Success));
    }

    #[tokio::test]
    async fn sign_out_failure_still_ends_loading() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);
        backend.fail(FailPoint::SignOut);
        let toasts = ToastQueue::new();

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(toasts.clone()));
        loaded(&mut bootstrap.handle()).await;

        assert!(bootstrap.sign_out().await.is_err());
        let state = bootstrap.state();
        assert!(!state.loading);
        // Local state untouched until the provider says otherwise
        assert_eq!(state.phase, AuthPhase::Authenticated);
        assert!(toasts.drain().iter().any(|t| t.variant == ToastVariant::Destructive));
    }

    #[tokio::test]
    async fn unmount_discards_late_results() {
        let backend = Arc::new(MemoryBackend::new());
        let gate = Arc::new(Notify::new());
        let auth = Arc::new(GatedAuth {
            backend: backend.clone(),
            gate: gate.clone(),
        });

        let bootstrap = AuthBootstrap::mount(auth, profiles_for(&backend), Arc::new(ToastQueue::new()));
        let handle = bootstrap.handle();
        bootstrap.unmount();

        gate.notify_one();
        backend.emit(AuthChangeEvent::SignedOut);
        let user = seed_user(&backend, true);
        backend.emit(AuthChangeEvent::SignedIn(backend.issue_session(&user)));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state = handle.current();
        assert!(state.loading);
        assert_eq!(state.phase, AuthPhase::Restoring);
        assert!(state.user.is_none());
    }

    #[tokio::test]
    async fn refresh_profile_picks_up_edits() {
        let backend = Arc::new(MemoryBackend::new());
        let user = seed_user(&backend, true);
        backend.issue_session(&user);

        let bootstrap = AuthBootstrap::mount(backend.clone(), profiles_for(&backend), Arc::new(ToastQueue::new()));
        loaded(&mut bootstrap.handle()).await;

        let mut edited = UserProfile::new(user.id, Role::Admin);
        edited.full_name = Some("Rita Rep".to_string());
        crate::backend::TableClient::update(
            backend.as_ref(),
            UserProfile::TABLE,
            user.id,
            serde_json::to_value(&edited).unwrap(),
        )
        .await
        .unwrap();

        let profile = bootstrap.refresh_profile().await.unwrap();
        assert_eq!(profile.role, Role::Admin);
        assert_eq!(bootstrap.state().profile.unwrap().full_name.as_deref(), Some("Rita Rep"));
    }
}
