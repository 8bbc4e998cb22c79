//! Avatar URLs for user principals.
//!
//! The avatar service is keyed by a hash of the user's contact address; the
//! URL shape matches what the host application's hosted avatar integration
//! expects.

use md5::{Digest, Md5};

/// Gravatar-style URL for an email address. The address is normalized
/// (trimmed, lowercased) before hashing, per the Gravatar contract.
pub fn gravatar_url(email: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let digest = hex::encode(hasher.finalize());
    format!("https://secure.gravatar.com/avatar/{digest}?rating=PG&size=128&default=")
}
