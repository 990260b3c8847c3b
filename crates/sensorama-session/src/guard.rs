//! Route guard: decides whether a protected view may render.
//!
//! A screen that needs a logged-in user asks its guard on every render.
//! The guard answers from the current session status:
//!
//! | Session state | Decision |
//! |---|---|
//! | `Unknown` | [`GuardDecision::Pending`]: show a spinner, nothing else |
//! | `Authenticated` | [`GuardDecision::Allowed`] |
//! | `Unauthenticated` | [`GuardDecision::Blocked`], carrying the redirect the first time |
//!
//! Re-evaluating while the state hasn't changed never repeats the
//! redirect, so a screen that re-renders ten times enqueues one
//! navigation, not ten.

use tokio::sync::watch;

use crate::{SessionState, SessionStatus};

/// Public entry point unauthenticated users are sent to (the login tab).
pub const DEFAULT_REDIRECT: &str = "/(tabs)";

/// The guard's answer for one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session is still loading. Render a waiting indicator only.
    Pending,

    /// Logged in. Render the protected content.
    Allowed,

    /// Logged out. Render nothing.
    ///
    /// `redirect` is `Some(route)` exactly once per transition into the
    /// logged-out state; the caller should navigate there. On later
    /// evaluations of the same state it is `None`.
    Blocked { redirect: Option<String> },
}

/// Gates a protected view on the session status.
///
/// Each guard tracks its own redirect bookkeeping, so give every
/// protected view its own guard (see
/// [`SessionContext::guard`](crate::SessionContext::guard)).
#[derive(Debug)]
pub struct RouteGuard {
    status: watch::Receiver<SessionStatus>,
    redirect_to: String,
    /// Generation of the logged-out state we already redirected for.
    redirected_for: Option<u64>,
}

impl RouteGuard {
    /// Creates a guard redirecting to [`DEFAULT_REDIRECT`].
    pub fn new(status: watch::Receiver<SessionStatus>) -> Self {
        Self::with_redirect(status, DEFAULT_REDIRECT)
    }

    /// Creates a guard redirecting to `route`.
    pub fn with_redirect(
        status: watch::Receiver<SessionStatus>,
        route: impl Into<String>,
    ) -> Self {
        Self {
            status,
            redirect_to: route.into(),
            redirected_for: None,
        }
    }

    /// Where blocked sessions are sent.
    pub fn redirect_target(&self) -> &str {
        &self.redirect_to
    }

    /// Evaluates the guard against the latest status.
    pub fn evaluate(&mut self) -> GuardDecision {
        let (state, generation) = {
            let status = self.status.borrow_and_update();
            (Kind::of(&status.state), status.generation)
        };

        match state {
            Kind::Unknown => GuardDecision::Pending,
            Kind::Authenticated => GuardDecision::Allowed,
            Kind::Unauthenticated => {
                if self.redirected_for == Some(generation) {
                    return GuardDecision::Blocked { redirect: None };
                }
                self.redirected_for = Some(generation);
                tracing::debug!(to = %self.redirect_to, "guard redirecting unauthenticated session");
                GuardDecision::Blocked {
                    redirect: Some(self.redirect_to.clone()),
                }
            }
        }
    }

    /// Waits until the session has left `Unknown`, then evaluates.
    ///
    /// If the session context is dropped while waiting, evaluates against
    /// the last status seen.
    pub async fn ready(&mut self) -> GuardDecision {
        let _ = self.status.wait_for(|s| !s.state.is_unknown()).await;
        self.evaluate()
    }
}

/// State without its payload, so the watch borrow can end early.
#[derive(Clone, Copy)]
enum Kind {
    Unknown,
    Authenticated,
    Unauthenticated,
}

impl Kind {
    fn of(state: &SessionState) -> Self {
        if state.is_authenticated() {
            Self::Authenticated
        } else if state.is_unknown() {
            Self::Unknown
        } else {
            Self::Unauthenticated
        }
    }
}
