//! One-time form re-population data
//!
//! After a validation failure a handler stashes the submitted fields here
//! and redirects; the form view on the next request reads them back to
//! re-populate its inputs. The data lives for exactly one cycle.

use crate::escape::escape_html;
use crate::session::FlashSession;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Flash entry name for form data, distinct from the messages entry
pub const SESSION_INDEX: &str = "_flashy_form_data_3bd886dcea";

/// One-time form-resubmission data backed by a [`FlashSession`]
///
/// Hydrates from the session at construction and flushes back when dropped
/// (or on an explicit [`save`](Self::save)). Reads consume: a field can be
/// retrieved once, after which it resolves to the caller's default.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flashy::{FormData, InMemoryFlashSession};
///
/// let session = Arc::new(InMemoryFlashSession::new());
///
/// {
/// 	let mut form_data = FormData::new(session.clone());
/// 	form_data.set("email", "bob@example.com");
/// }
///
/// session.advance();
///
/// let mut form_data = FormData::new(session.clone());
/// assert_eq!(form_data.get_or("email", ""), "bob@example.com");
/// assert_eq!(form_data.get_or("email", ""), "");
/// ```
pub struct FormData {
	session: Arc<dyn FlashSession>,
	fields: HashMap<String, String>,
}

impl FormData {
	/// Hydrate from the session's flash entry
	///
	/// The entry is removed from the session; [`save`](Self::save) writes
	/// whatever is still in memory back for the next request.
	pub fn new(session: Arc<dyn FlashSession>) -> Self {
		let fields = match session.get(SESSION_INDEX) {
			Some(value) => match serde_json::from_value(value) {
				Ok(fields) => fields,
				Err(err) => {
					debug!(key = SESSION_INDEX, %err, "discarding malformed form data flash");
					HashMap::new()
				}
			},
			None => HashMap::new(),
		};
		session.remove(SESSION_INDEX);
		debug!(key = SESSION_INDEX, fields = fields.len(), "hydrated form data");

		Self { session, fields }
	}

	/// Create with seeded fields, bypassing hydration
	///
	/// Useful in tests and in handlers that build the re-population data
	/// themselves rather than carrying it over from a previous request.
	pub fn with_fields(session: Arc<dyn FlashSession>, fields: HashMap<String, String>) -> Self {
		Self { session, fields }
	}

	/// Take the entire field mapping, leaving it empty
	pub fn all(&mut self) -> HashMap<String, String> {
		std::mem::take(&mut self.fields)
	}

	/// Take a field's value
	///
	/// Consuming read: the field is removed, so a second call returns
	/// `None`. An absent field is not an error.
	pub fn get(&mut self, key: &str) -> Option<String> {
		self.fields.remove(key)
	}

	/// Take a field's value, falling back to `default` when absent
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use flashy::{FormData, InMemoryFlashSession};
	///
	/// let session = Arc::new(InMemoryFlashSession::new());
	/// let mut form_data = FormData::new(session);
	/// form_data.set("name", "Ada");
	///
	/// assert_eq!(form_data.get_or("name", "anonymous"), "Ada");
	/// assert_eq!(form_data.get_or("name", "anonymous"), "anonymous");
	/// ```
	pub fn get_or(&mut self, key: &str, default: &str) -> String {
		self.get(key).unwrap_or_else(|| default.to_string())
	}

	/// Like [`get_or`](Self::get_or), HTML-escaped
	///
	/// For embedding straight into a `value="…"` attribute.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use flashy::{FormData, InMemoryFlashSession};
	///
	/// let session = Arc::new(InMemoryFlashSession::new());
	/// let mut form_data = FormData::new(session);
	/// form_data.set("bio", "<b>bold</b>");
	///
	/// assert_eq!(form_data.get_or_escaped("bio", ""), "&lt;b&gt;bold&lt;/b&gt;");
	/// ```
	pub fn get_or_escaped(&mut self, key: &str, default: &str) -> String {
		escape_html(&self.get_or(key, default))
	}

	/// Set a single field, chainable
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
		self.fields.insert(key.into(), value.into());
		self
	}

	/// Replace the entire field mapping, chainable
	pub fn set_all(&mut self, fields: HashMap<String, String>) -> &mut Self {
		self.fields = fields;
		self
	}

	/// Empty the in-memory mapping
	///
	/// With `purge_backing` the flash entry is removed from the session
	/// immediately instead of waiting for the end-of-scope flush.
	pub fn clear(&mut self, purge_backing: bool) {
		self.fields.clear();
		if purge_backing {
			self.session.remove(SESSION_INDEX);
		}
	}

	/// Flush the in-memory mapping to the session
	///
	/// Idempotent; the last call wins. An empty mapping removes the entry
	/// instead of writing one, so the next request sees nothing at all.
	pub fn save(&self) {
		self.session.remove(SESSION_INDEX);
		if self.fields.is_empty() {
			return;
		}
		debug!(key = SESSION_INDEX, fields = self.fields.len(), "flushing form data");
		match serde_json::to_value(&self.fields) {
			Ok(value) => self.session.set(SESSION_INDEX, value),
			Err(err) => debug!(key = SESSION_INDEX, %err, "failed to serialize form data"),
		}
	}
}

impl Drop for FormData {
	fn drop(&mut self) {
		self.save();
	}
}
