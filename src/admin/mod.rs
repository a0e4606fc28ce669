//! Admin session handling
//!
//! A fixed credential pair unlocks the price list editor. The session is a
//! single flag in the key-value store, so it survives between CLI runs until
//! logout.

use crate::core::{AdminConfig, Error, Result};
use crate::db::KeyValueStore;

/// Store key of the admin session flag
pub const ADMIN_SESSION_KEY: &str = "terraems_admin_session";

/// Check a username/password pair against the configured credentials
pub fn authenticate(config: &AdminConfig, username: &str, password: &str) -> bool {
    username == config.username && password == config.password
}

/// Log in, recording the session flag on success.
///
/// Returns `Ok(false)` for wrong credentials.
pub fn login<S: KeyValueStore + ?Sized>(
    store: &mut S,
    config: &AdminConfig,
    username: &str,
    password: &str,
) -> Result<bool> {
    if !authenticate(config, username, password) {
        log::warn!("Admin login rejected for user {:?}", username);
        return Ok(false);
    }
    store.set(ADMIN_SESSION_KEY, "true")?;
    log::info!("Admin session started");
    Ok(true)
}

pub fn logout<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(ADMIN_SESSION_KEY)?;
    log::info!("Admin session ended");
    Ok(())
}

/// Whether an admin session is active. Store errors count as "no session".
pub fn is_active<S: KeyValueStore + ?Sized>(store: &S) -> bool {
    match store.get(ADMIN_SESSION_KEY) {
        Ok(value) => value.as_deref() == Some("true"),
        Err(e) => {
            log::warn!("Could not read admin session flag: {}", e);
            false
        }
    }
}

/// Fail with [`Error::Unauthorized`] unless an admin session is active
pub fn require_session<S: KeyValueStore + ?Sized>(store: &S) -> Result<()> {
    if is_active(store) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}
