//! Session flash storage
//!
//! The stores in this crate do not talk to a session backend directly; they
//! go through the [`FlashSession`] trait, injected at construction so tests
//! can substitute the in-memory fake. A flash value written during request N
//! is readable during request N+1 only, then expires whether or not it was
//! read. Expiry itself is the session's job; the stores only read, write,
//! and remove their own namespaced entries.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Request-scoped key/value store with flash semantics
///
/// All methods take `&self`: implementations are expected to use interior
/// mutability so that a store can flush from its `Drop` impl while the
/// session is shared behind an `Arc`.
pub trait FlashSession: Send + Sync {
	/// Check whether a flash entry is readable in the current request
	fn has(&self, key: &str) -> bool;

	/// Read a flash entry written during the previous request
	fn get(&self, key: &str) -> Option<Value>;

	/// Write a flash entry for the next request
	fn set(&self, key: &str, value: Value);

	/// Remove a flash entry, including any pending write
	fn remove(&self, key: &str);
}

#[derive(Debug, Default)]
struct Generations {
	/// Entries written last request, readable now
	current: HashMap<String, Value>,
	/// Entries written this request, readable next request
	next: HashMap<String, Value>,
}

/// In-memory [`FlashSession`] with explicit request boundaries
///
/// Keeps two flash generations: reads see the previous request's writes,
/// writes land in the next generation, and [`advance`](Self::advance)
/// rotates them at the request boundary. Values not rewritten during a
/// cycle are dropped by the rotation, which is exactly the flash contract.
///
/// Intended for tests and single-process development servers; anything
/// multi-process needs a real session backend behind the trait.
///
/// # Examples
///
/// ```
/// use flashy::session::{FlashSession, InMemoryFlashSession};
/// use serde_json::json;
///
/// let session = InMemoryFlashSession::new();
/// session.set("note", json!("once"));
/// assert!(!session.has("note"));
///
/// session.advance();
/// assert_eq!(session.get("note"), Some(json!("once")));
///
/// session.advance();
/// assert!(!session.has("note"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryFlashSession {
	generations: RwLock<Generations>,
}

impl InMemoryFlashSession {
	/// Create an empty flash session
	pub fn new() -> Self {
		Self::default()
	}

	/// Cross a request boundary
	///
	/// Pending writes become readable and the previous generation is
	/// discarded, read or not.
	pub fn advance(&self) {
		let mut generations = self.generations.write().unwrap_or_else(|e| e.into_inner());
		generations.current = std::mem::take(&mut generations.next);
	}
}

impl FlashSession for InMemoryFlashSession {
	fn has(&self, key: &str) -> bool {
		let generations = self.generations.read().unwrap_or_else(|e| e.into_inner());
		generations.current.contains_key(key)
	}

	fn get(&self, key: &str) -> Option<Value> {
		let generations = self.generations.read().unwrap_or_else(|e| e.into_inner());
		generations.current.get(key).cloned()
	}

	fn set(&self, key: &str, value: Value) {
		let mut generations = self.generations.write().unwrap_or_else(|e| e.into_inner());
		generations.next.insert(key.to_string(), value);
	}

	fn remove(&self, key: &str) {
		let mut generations = self.generations.write().unwrap_or_else(|e| e.into_inner());
		generations.current.remove(key);
		generations.next.remove(key);
	}
}
