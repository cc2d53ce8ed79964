//! Shared-password admin sessions
//!
//! A successful login mints a random token, remembered in memory with an
//! expiry and handed to the browser as an HttpOnly cookie. Sessions do not
//! survive a restart.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;
use warp::{Filter, Rejection};

pub const SESSION_COOKIE: &str = "helpdesk_session";

/// Default session lifetime
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Raised by gated JSON endpoints without a valid session
#[derive(Debug)]
pub struct Unauthorized;

impl warp::reject::Reject for Unauthorized {}

/// Raised by gated HTML pages; recovered into a redirect to the login page
#[derive(Debug)]
pub struct LoginRequired;

impl warp::reject::Reject for LoginRequired {}

/// In-memory session registry plus the shared admin password
#[derive(Clone)]
pub struct SessionStore {
    password: Arc<String>,
    ttl: Duration,
    sessions: Arc<Mutex<HashMap<String, Instant>>>,
}

impl SessionStore {
    pub fn new(password: impl Into<String>) -> Self {
        Self::with_ttl(password, SESSION_TTL)
    }

    pub fn with_ttl(password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            password: Arc::new(password.into()),
            ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        // A panic while holding the lock cannot leave the map half-written
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check the password and open a session, returning its token
    pub fn login(&self, password: &str) -> Option<String> {
        if password != self.password.as_str() {
            tracing::warn!("Rejected admin login");
            return None;
        }

        let token = Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        let mut sessions = self.sessions();
        sessions.retain(|_, expires| *expires > now);
        sessions.insert(token.clone(), now + self.ttl);

        tracing::info!(active_sessions = sessions.len(), "Admin logged in");
        Some(token)
    }

    pub fn logout(&self, token: &str) {
        self.sessions().remove(token);
    }

    /// Whether `token` names an unexpired session; expired ones are dropped
    pub fn is_valid(&self, token: &str) -> bool {
        let mut sessions = self.sessions();
        match sessions.get(token) {
            Some(expires) if *expires > Instant::now() => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    pub fn is_logged_in(&self, token: Option<&str>) -> bool {
        token.map(|t| self.is_valid(t)).unwrap_or(false)
    }
}

/// `Set-Cookie` value that stores `token`
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.as_secs()
    )
}

/// `Set-Cookie` value that clears the session cookie
pub fn expired_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

pub fn with_sessions(
    sessions: SessionStore,
) -> impl Filter<Extract = (SessionStore,), Error = Infallible> + Clone {
    warp::any().map(move || sessions.clone())
}

/// The session cookie, if the browser sent one
pub fn session_token() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(SESSION_COOKIE)
}

/// Gate for JSON endpoints: rejects with [`Unauthorized`]
pub fn admin_api(sessions: SessionStore) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    session_token()
        .and(with_sessions(sessions))
        .and_then(|token: Option<String>, sessions: SessionStore| async move {
            if sessions.is_logged_in(token.as_deref()) {
                Ok(())
            } else {
                Err(warp::reject::custom(Unauthorized))
            }
        })
        .untuple_one()
}

/// Gate for HTML pages: rejects with [`LoginRequired`]
pub fn admin_page(sessions: SessionStore) -> impl Filter<Extract = (), Error = Rejection> + Clone {
    session_token()
        .and(with_sessions(sessions))
        .and_then(|token: Option<String>, sessions: SessionStore| async move {
            if sessions.is_logged_in(token.as_deref()) {
                Ok(())
            } else {
                Err(warp::reject::custom(LoginRequired))
            }
        })
        .untuple_one()
}
