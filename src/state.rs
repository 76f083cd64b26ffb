//! Application state

use tower_cookies::Key;

use crate::config::Config;
use crate::store::Store;
use crate::token::TokenCodec;

/// Explicitly constructed application context handed to every request
/// handler; there is no global mutable state.
pub struct AppState<S> {
    pub config: Config,
    pub tokens: TokenCodec,
    /// Key signing the flash-session cookie
    pub session_key: Key,
    pub store: S,
}

impl<S: Store> AppState<S> {
    pub fn new(config: Config, store: S) -> Self {
        let tokens = TokenCodec::new(&config.signing_secret);
        let session_key = derive_key(&config.session_secret);
        Self {
            config,
            tokens,
            session_key,
            store,
        }
    }
}

/// Stretch the configured secret to the 64 bytes cookie signing wants,
/// so a short dev secret still works. An empty secret cannot be
/// stretched; fixed material keeps this total (Config never hands one
/// over, empty env vars fall back to the default there).
fn derive_key(secret: &str) -> Key {
    let bytes = secret.as_bytes();
    if bytes.is_empty() {
        return Key::derive_from(&[0u8; 64]);
    }
    let mut material = bytes.to_vec();
    while material.len() < 64 {
        material.extend_from_slice(bytes);
    }
    Key::derive_from(&material)
}
