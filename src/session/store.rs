//! Sealed session cookie construction and parsing.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chacha20poly1305::aead::{Aead, AeadCore, KeyInit, OsRng};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

const NONCE_LEN: usize = 24;

/// Per-client authentication state carried inside the sealed cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub authenticated: bool,
    pub username: String,
    /// Seconds since epoch at login.
    pub login_time: u64,
    /// Seconds since epoch at the last authenticated request; the idle
    /// timeout is measured against this, not against the cookie Max-Age.
    pub last_activity: u64,
    pub client_ip: String,
}

impl SessionData {
    /// Fresh session for a just-authenticated client.
    pub fn authenticated(username: &str, client_ip: &str) -> Self {
        let now = now_unix_secs();
        Self {
            authenticated: true,
            username: username.to_string(),
            login_time: now,
            last_activity: now,
            client_ip: client_ip.to_string(),
        }
    }
}

/// Seals and opens session cookies under a key derived from the configured
/// session secret. Cheap to clone; read-only after startup.
#[derive(Clone)]
pub struct SessionStore {
    key: [u8; 32],
    cookie_name: String,
    http_only: bool,
    secure: bool,
    max_age_secs: u64,
}

impl SessionStore {
    pub fn new(secret: &str, cookie_name: &str, http_only: bool, secure: bool, max_age_secs: u64) -> Self {
        Self {
            key: derive_key(secret),
            cookie_name: cookie_name.to_string(),
            http_only,
            secure,
            max_age_secs,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Seal a session into a fresh cookie. Fails only if encryption itself
    /// fails, which the login controller surfaces as a save error.
    pub fn seal(&self, session: &SessionData) -> Result<Cookie<'static>, SealError> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.key));
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let plaintext = serde_json::to_vec(session).map_err(|_| SealError)?;
        let ciphertext = cipher
            .encrypt(&nonce, plaintext.as_ref())
            .map_err(|_| SealError)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        Ok(self.base_cookie(URL_SAFE_NO_PAD.encode(sealed)))
    }

    /// Open a sealed cookie value. Any decode, tag, or shape failure yields
    /// `None`: a bad cookie is simply not a session.
    pub fn open(&self, value: &str) -> Option<SessionData> {
        let cipher = XChaCha20Poly1305::new(Key::from_slice(&self.key));
        let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
        if bytes.len() < NONCE_LEN {
            return None;
        }
        let (nonce, ciphertext) = bytes.split_at(NONCE_LEN);
        let plaintext = cipher.decrypt(XNonce::from_slice(nonce), ciphertext).ok()?;
        serde_json::from_slice(&plaintext).ok()
    }

    /// Cookie that clears the session on the client.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.base_cookie(String::new());
        cookie.make_removal();
        cookie
    }

    fn base_cookie(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(self.cookie_name.clone(), value);
        cookie.set_path("/");
        cookie.set_http_only(self.http_only);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(CookieDuration::seconds(self.max_age_secs as i64));
        cookie
    }
}

/// Cookie sealing failed; treated as a session-save error by callers.
#[derive(Debug)]
pub struct SealError;

impl std::fmt::Display for SealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("failed to seal session cookie")
    }
}

impl std::error::Error for SealError {}

/// Seconds since the Unix epoch.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn derive_key(secret: &str) -> [u8; 32] {
    let digest = Sha256::digest(secret.as_bytes());
    digest.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(
            "0123456789abcdef0123456789abcdef",
            "terminal_session",
            true,
            false,
            1800,
        )
    }

    #[test]
    fn seal_then_open_preserves_session() {
        let store = store();
        let session = SessionData::authenticated("admin", "10.0.0.7");
        let cookie = store.seal(&session).unwrap();

        let opened = store.open(cookie.value()).unwrap();
        assert!(opened.authenticated);
        assert_eq!(opened.username, "admin");
        assert_eq!(opened.client_ip, "10.0.0.7");
        assert_eq!(opened.login_time, session.login_time);
    }

    #[test]
    fn tampered_cookie_opens_to_none() {
        let store = store();
        let cookie = store.seal(&SessionData::authenticated("admin", "x")).unwrap();

        let mut value = cookie.value().to_string();
        let flipped = if value.ends_with('A') { 'B' } else { 'A' };
        value.pop();
        value.push(flipped);

        assert!(store.open(&value).is_none());
    }

    #[test]
    fn wrong_key_opens_to_none() {
        let session = SessionData::authenticated("admin", "x");
        let cookie = store().seal(&session).unwrap();

        let other = SessionStore::new("another-secret-entirely-0123456789ab", "terminal_session", true, false, 1800);
        assert!(other.open(cookie.value()).is_none());
    }

    #[test]
    fn garbage_opens_to_none() {
        assert!(store().open("not base64 at all!").is_none());
        assert!(store().open("").is_none());
        assert!(store().open("AAAA").is_none());
    }

    #[test]
    fn cookie_carries_configured_attributes() {
        let cookie = store().seal(&SessionData::authenticated("admin", "x")).unwrap();
        assert_eq!(cookie.name(), "terminal_session");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(1800)));
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let cookie = store().removal_cookie();
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }
}
