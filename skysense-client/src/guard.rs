use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::api::TelemetryClient;
use crate::error::Result;
use crate::session::{Session, SessionStore};
use crate::storage::LocalStorage;

/// Outcome of the pre-render session check.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionGate {
    Authenticated(Session),
    LoginRequired,
}

/// Owns login, logout and the redirect-to-login signal so screens do not
/// each carry their own logout-on-401 logic.
pub struct SessionGuard<S: LocalStorage> {
    client: TelemetryClient,
    store: SessionStore<S>,
    redirects: watch::Sender<u64>,
    auth_failed: AtomicBool,
}

impl<S: LocalStorage> SessionGuard<S> {
    pub fn new(client: TelemetryClient, store: SessionStore<S>) -> Self {
        let (redirects, _) = watch::channel(0);

        Self {
            client,
            store,
            redirects,
            auth_failed: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Gates protected screens on the stored session.
    ///
    /// Absence means redirect, not error; a storage fault is logged and
    /// treated the same way instead of taking the screen down.
    pub async fn require_session(&self) -> SessionGate {
        match self.store.load().await {
            Ok(Some(session)) => SessionGate::Authenticated(session),
            Ok(None) => SessionGate::LoginRequired,
            Err(err) => {
                tracing::warn!("session load failed, treating as logged out: {err}");
                SessionGate::LoginRequired
            }
        }
    }

    /// Exchanges credentials and persists the session before returning, so
    /// navigation away from the login screen happens on durable state. A
    /// persistence failure surfaces as an error; nothing is navigated on a
    /// session that would not survive a restart.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self.client.login(email, password).await?;
        self.store.save(&response.token, &response.user).await?;
        self.auth_failed.store(false, Ordering::SeqCst);

        tracing::debug!(user_id = response.user.id, "login persisted");

        Ok(Session {
            token: response.token,
            user: response.user,
        })
    }

    /// Clears local state and signals redirect. Local-only: the upstream
    /// API exposes no logout endpoint.
    pub async fn logout(&self) {
        self.store.clear().await;
        self.signal_redirect();
    }

    /// Reports a rejected token. The first report of an authenticated epoch
    /// clears the session and signals one redirect; concurrent reports from
    /// overlapping fetches collapse into that signal. Re-armed by the next
    /// successful login.
    pub async fn on_auth_failure(&self) {
        if self.auth_failed.swap(true, Ordering::SeqCst) {
            return;
        }

        tracing::debug!("auth failure reported, clearing session");
        self.store.clear().await;
        self.signal_redirect();
    }

    /// Monotone counter; each increment is one redirect-to-login
    /// instruction for whichever screen is observing.
    pub fn subscribe_redirects(&self) -> watch::Receiver<u64> {
        self.redirects.subscribe()
    }

    fn signal_redirect(&self) {
        self.redirects.send_modify(|count| *count += 1);
    }
}
