//! Owner identity from transport credentials.
//!
//! The transport hands over the client's public-key fingerprint when it
//! has one. Without a key the owner falls back to a username-derived
//! synthetic key (`user-<username>`, or `user-anonymous` for an empty
//! name). That fallback is weaker than a key, so it is logged, but it is
//! not an error.

use log::warn;

use crate::pet::OwnerKey;

const FALLBACK_PREFIX: &str = "user-";
const ANONYMOUS: &str = "anonymous";

/// Stable owner key for a connection.
pub fn resolve_owner(public_key: Option<&str>, username: &str) -> OwnerKey {
    if let Some(key) = public_key.map(str::trim).filter(|k| !k.is_empty()) {
        return OwnerKey::new(key);
    }
    let name = username.trim();
    let name = if name.is_empty() { ANONYMOUS } else { name };
    warn!("No public key for '{}', using synthetic owner key", name);
    OwnerKey::new(format!("{FALLBACK_PREFIX}{name}"))
}
