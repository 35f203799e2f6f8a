//! Anonymous session correlation
//!
//! Events from one browsing visit are grouped under an opaque cookie
//! value. The identifier is a correlation key only: it never carries
//! authorization and nothing validates it beyond presence.

use actix_web::HttpRequest;
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};

use crate::config::{Environment, get_config};
use crate::utils::generate_token;

/// Cookie carrying the anonymous session identifier
pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Outcome of resolving the session for one request
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: String,
    /// Present only when the identifier was created by this request and
    /// must be transmitted on the response
    pub cookie: Option<Cookie<'static>>,
}

impl ResolvedSession {
    pub fn is_new(&self) -> bool {
        self.cookie.is_some()
    }
}

/// Assigns or reuses the per-browser session identifier
#[derive(Debug, Clone)]
pub struct SessionCorrelator {
    ttl_hours: u64,
    secure: bool,
}

impl SessionCorrelator {
    pub fn new(ttl_hours: u64, secure: bool) -> Self {
        Self { ttl_hours, secure }
    }

    pub fn from_config() -> Self {
        let config = get_config();
        Self::new(
            config.session.ttl_hours,
            config.server.environment == Environment::Production,
        )
    }

    /// Read the session cookie, minting a fresh identifier when absent.
    ///
    /// An existing cookie is reused unchanged and nothing is set on the
    /// response, so repeated calls for the same browser are idempotent.
    pub fn resolve(&self, req: &HttpRequest) -> ResolvedSession {
        if let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) {
            let value = cookie.value();
            if !value.is_empty() {
                return ResolvedSession {
                    id: value.to_string(),
                    cookie: None,
                };
            }
        }

        let id = generate_token(32);
        let cookie = self.build_cookie(id.clone());
        ResolvedSession {
            id,
            cookie: Some(cookie),
        }
    }

    fn build_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(SESSION_COOKIE_NAME.to_string(), value);
        cookie.set_path("/".to_string());
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::hours(self.ttl_hours as i64));
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn correlator() -> SessionCorrelator {
        SessionCorrelator::new(24, false)
    }

    #[test]
    fn test_new_session_sets_cookie() {
        let req = TestRequest::default().to_http_request();
        let session = correlator().resolve(&req);

        assert!(session.is_new());
        assert!(!session.id.is_empty());

        let cookie = session.cookie.unwrap();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), session.id);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(24)));
    }

    #[test]
    fn test_existing_session_reused_without_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE_NAME, "existing-token"))
            .to_http_request();

        let session = correlator().resolve(&req);
        assert_eq!(session.id, "existing-token");
        assert!(!session.is_new());

        // Resolving again yields the same identifier, still no new cookie
        let again = correlator().resolve(&req);
        assert_eq!(again.id, "existing-token");
        assert!(again.cookie.is_none());
    }

    #[test]
    fn test_empty_cookie_value_treated_as_absent() {
        let req = TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE_NAME, ""))
            .to_http_request();

        let session = correlator().resolve(&req);
        assert!(session.is_new());
    }

    #[test]
    fn test_secure_flag_follows_environment() {
        let req = TestRequest::default().to_http_request();
        let session = SessionCorrelator::new(24, true).resolve(&req);
        assert_eq!(session.cookie.unwrap().secure(), Some(true));

        let req = TestRequest::default().to_http_request();
        let session = SessionCorrelator::new(24, false).resolve(&req);
        assert_eq!(session.cookie.unwrap().secure(), Some(false));
    }
}
