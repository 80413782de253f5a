//! Who is logged in, passed explicitly to every API call site.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

const TOKEN_KEY: &str = "access_token";

/// Backing storage for the bearer token.
pub trait TokenStore: Send + Sync {
	/// Current token, if any.
	fn load(&self) -> Option<String>;
	/// Replaces the token.
	fn store(&self, token: &str);
	/// Forgets the token.
	fn clear(&self);
}

/// Keeps the token in the browser's `localStorage` so it survives reloads.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageTokens;

impl LocalStorageTokens {
	fn storage() -> Option<web_sys::Storage> {
		web_sys::window()?.local_storage().ok().flatten()
	}
}

impl TokenStore for LocalStorageTokens {
	fn load(&self) -> Option<String> {
		Self::storage()?.get_item(TOKEN_KEY).ok().flatten()
	}

	fn store(&self, token: &str) {
		match Self::storage() {
			Some(storage) => {
				if storage.set_item(TOKEN_KEY, token).is_err() {
					warn!("Could not persist access token");
				}
			}
			None => warn!("localStorage unavailable, token not persisted"),
		}
	}

	fn clear(&self) {
		if let Some(storage) = Self::storage() {
			let _ = storage.remove_item(TOKEN_KEY);
		}
	}
}

/// Token held for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryTokens(Mutex<Option<String>>);

impl TokenStore for MemoryTokens {
	fn load(&self) -> Option<String> {
		self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
	}

	fn store(&self, token: &str) {
		*self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_owned());
	}

	fn clear(&self) {
		*self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
	}
}

/// Login session. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct Session {
	store: Arc<dyn TokenStore>,
}

impl Session {
	/// Session over a custom token store.
	pub fn new(store: impl TokenStore + 'static) -> Self {
		Self {
			store: Arc::new(store),
		}
	}

	/// Session persisted in `localStorage`.
	pub fn browser() -> Self {
		Self::new(LocalStorageTokens)
	}

	/// Session that lives only as long as the process.
	pub fn in_memory() -> Self {
		Self::new(MemoryTokens::default())
	}

	/// Bearer token for the next request. Empty tokens count as none.
	pub fn token(&self) -> Option<String> {
		self.store.load().filter(|t| !t.is_empty())
	}

	/// Whether a token is present. It may still be expired server side.
	pub fn is_authenticated(&self) -> bool {
		self.token().is_some()
	}

	/// Starts a session with a freshly issued token.
	pub fn begin(&self, token: &str) {
		debug!("Session started");
		self.store.store(token);
	}

	/// Ends the session. Called on logout and on any 401.
	pub fn end(&self) {
		debug!("Session ended");
		self.store.clear();
	}
}

impl fmt::Debug for Session {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Session")
			.field("authenticated", &self.is_authenticated())
			.finish()
	}
}
