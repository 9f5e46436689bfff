//! Client-held session credential across durable and ephemeral storage.
//!
//! SYSTEM CONTEXT
//! ==============
//! "Remember me" logins land in the durable tier (`localStorage`), default
//! logins in the ephemeral tier (`sessionStorage`). Every other module reads
//! and writes the token only through [`SessionStore`], so tier selection is a
//! single decision point.
//!
//! TRADE-OFFS
//! ==========
//! Storage access is synchronous and unguarded: the UI runs on one thread, so
//! tiers are shared through `Rc` without locks.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Storage tier a credential lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Survives browser restarts.
    Durable,
    /// Cleared at the end of the browser session.
    Ephemeral,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Durable => "durable",
            Self::Ephemeral => "ephemeral",
        })
    }
}

/// An opaque bearer token plus the tier it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("refusing to store an empty token")]
    EmptyToken,

    #[error("{0} storage is unavailable")]
    Unavailable(Tier),

    /// The platform refused the write (quota, privacy mode).
    #[error("{0} storage rejected the write")]
    WriteRejected(Tier),
}

/// Minimal string key/value storage backing one tier.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    ///
    /// Returns an error when the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-process storage; the native and test backend for both tiers.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// `localStorage` (durable) or `sessionStorage` (ephemeral).
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    tier: Tier,
}

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    #[must_use]
    pub fn new(tier: Tier) -> Self {
        Self { tier }
    }

    fn storage(self) -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        match self.tier {
            Tier::Durable => window.local_storage().ok().flatten(),
            Tier::Ephemeral => window.session_storage().ok().flatten(),
        }
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let storage = self.storage().ok_or(SessionError::Unavailable(self.tier))?;
        storage
            .set_item(key, value)
            .map_err(|_| SessionError::WriteRejected(self.tier))
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = self.storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Reads, writes and clears the session token across both tiers.
#[derive(Clone)]
pub struct SessionStore {
    key: Rc<str>,
    durable: Rc<dyn KeyValueStorage>,
    ephemeral: Rc<dyn KeyValueStorage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("key", &self.key).finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(key: &str, durable: Rc<dyn KeyValueStorage>, ephemeral: Rc<dyn KeyValueStorage>) -> Self {
        Self { key: Rc::from(key), durable, ephemeral }
    }

    /// Two fresh in-memory tiers.
    #[must_use]
    pub fn in_memory(key: &str) -> Self {
        Self::new(key, Rc::new(MemoryStorage::new()), Rc::new(MemoryStorage::new()))
    }

    /// `localStorage` + `sessionStorage` of the current window.
    #[cfg(feature = "hydrate")]
    #[must_use]
    pub fn browser(key: &str) -> Self {
        Self::new(
            key,
            Rc::new(BrowserStorage::new(Tier::Durable)),
            Rc::new(BrowserStorage::new(Tier::Ephemeral)),
        )
    }

    /// Current credential: durable tier first, then ephemeral. Empty values
    /// count as absent.
    #[must_use]
    pub fn read(&self) -> Option<Credential> {
        [(Tier::Durable, &self.durable), (Tier::Ephemeral, &self.ephemeral)]
            .into_iter()
            .find_map(|(tier, storage)| {
                storage
                    .get(&self.key)
                    .filter(|token| !token.is_empty())
                    .map(|token| Credential { token, tier })
            })
    }

    /// Shorthand for the token value of [`SessionStore::read`].
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().map(|credential| credential.token)
    }

    /// Store `token` in exactly one tier. The other tier is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyToken`] for an empty token, or the
    /// storage backend's error.
    pub fn write(&self, token: &str, persist_durably: bool) -> Result<(), SessionError> {
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let storage = if persist_durably { &self.durable } else { &self.ephemeral };
        storage.set(&self.key, token)
    }

    /// Remove the token from both tiers. Idempotent.
    pub fn clear(&self) {
        self.durable.remove(&self.key);
        self.ephemeral.remove(&self.key);
    }

    /// Write `token` into one tier, then drop the key from the other so a
    /// stale credential there cannot shadow it.
    ///
    /// # Errors
    ///
    /// Same as [`SessionStore::write`]; on failure neither tier is modified.
    pub fn replace(&self, token: &str, persist_durably: bool) -> Result<(), SessionError> {
        self.write(token, persist_durably)?;
        let other = if persist_durably { &self.ephemeral } else { &self.durable };
        other.remove(&self.key);
        Ok(())
    }
}
