//! Categorized flash notification messages
//!
//! Messages are grouped by a free-form category string ("error", "info",
//! ...) and survive exactly one request-redirect-request cycle. A category
//! holds an ordered list of entries; an entry is either plain text or a
//! labeled sub-list, so grouped output like per-field validation errors
//! renders as a nested `<ul>`.
//!
//! Reads consume: retrieving or rendering a category removes it, so a
//! notification is shown exactly once.

use crate::error::{Error, Result};
use crate::escape::escape_html;
use crate::session::FlashSession;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Flash entry name for messages, distinct from the form data entry
pub const SESSION_INDEX: &str = "_flashy_messages_65df6aa59e";

/// Categorized one-time notification messages backed by a [`FlashSession`]
///
/// Hydrates from the session at construction and flushes back when dropped
/// (or on an explicit [`save`](Self::save)).
///
/// Category content is [`serde_json::Value`]: a string message appends to
/// the category's array, an array or object replaces the category
/// wholesale, and anything else is rejected with
/// [`Error::InvalidMessage`].
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flashy::{InMemoryFlashSession, Messages};
///
/// let session = Arc::new(InMemoryFlashSession::new());
/// let mut messages = Messages::new(session);
///
/// messages.error("Name is required").unwrap();
/// messages.error("Email is invalid").unwrap();
///
/// assert_eq!(
/// 	messages.get_formatted("error"),
/// 	"<div class=\"alert alert-danger\"><ul><li>Name is required</li><li>Email is invalid</li></ul></div>"
/// );
///
/// // Rendering consumed the category.
/// assert_eq!(messages.get_formatted("error"), "");
/// ```
pub struct Messages {
	session: Arc<dyn FlashSession>,
	categories: IndexMap<String, Value>,
}

impl Messages {
	/// Hydrate from the session's flash entry
	///
	/// The entry is removed from the session; [`save`](Self::save) writes
	/// whatever is still in memory back for the next request.
	pub fn new(session: Arc<dyn FlashSession>) -> Self {
		let categories = match session.get(SESSION_INDEX) {
			Some(value) => match serde_json::from_value(value) {
				Ok(categories) => categories,
				Err(err) => {
					debug!(key = SESSION_INDEX, %err, "discarding malformed messages flash");
					IndexMap::new()
				}
			},
			None => IndexMap::new(),
		};
		session.remove(SESSION_INDEX);
		debug!(key = SESSION_INDEX, categories = categories.len(), "hydrated messages");

		Self { session, categories }
	}

	/// Add a message to a category, chainable
	///
	/// A string appends to the category's list, creating the category if
	/// absent. An array or object replaces the category's entire content.
	/// Any other value is rejected and the store is left untouched.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use flashy::{InMemoryFlashSession, Messages};
	/// use serde_json::json;
	///
	/// let session = Arc::new(InMemoryFlashSession::new());
	/// let mut messages = Messages::new(session);
	///
	/// messages.set("error", "a").unwrap();
	/// messages.set("error", "b").unwrap();
	/// assert_eq!(messages.get("error"), json!(["a", "b"]));
	///
	/// messages.set("error", json!(["x"])).unwrap();
	/// assert_eq!(messages.get("error"), json!(["x"]));
	/// ```
	pub fn set(&mut self, category: impl Into<String>, message: impl Into<Value>) -> Result<&mut Self> {
		match message.into() {
			value @ (Value::Array(_) | Value::Object(_)) => {
				self.categories.insert(category.into(), value);
			}
			Value::String(text) => {
				let entry = self
					.categories
					.entry(category.into())
					.or_insert_with(|| Value::Array(Vec::new()));
				match entry {
					Value::Array(items) => items.push(Value::String(text)),
					Value::Object(entries) => {
						// Appending to grouped content mirrors PHP's `[] =`
						// on an associative array: max numeric key plus one.
						let next = entries
							.keys()
							.filter_map(|key| key.parse::<u64>().ok())
							.max()
							.map_or(0, |max| max + 1);
						entries.insert(next.to_string(), Value::String(text));
					}
					other => *other = Value::Array(vec![Value::String(text)]),
				}
			}
			other => {
				return Err(Error::InvalidMessage {
					given: json_type_name(&other),
				});
			}
		}

		Ok(self)
	}

	/// Add an error message, shorthand for `set("error", …)`
	pub fn error(&mut self, message: impl Into<Value>) -> Result<&mut Self> {
		self.set("error", message)
	}

	/// Add a warning message, shorthand for `set("warning", …)`
	pub fn warning(&mut self, message: impl Into<Value>) -> Result<&mut Self> {
		self.set("warning", message)
	}

	/// Add an info message, shorthand for `set("info", …)`
	pub fn info(&mut self, message: impl Into<Value>) -> Result<&mut Self> {
		self.set("info", message)
	}

	/// Add a success message, shorthand for `set("success", …)`
	pub fn success(&mut self, message: impl Into<Value>) -> Result<&mut Self> {
		self.set("success", message)
	}

	/// Add a debug message, shorthand for `set("debug", …)`
	pub fn debug(&mut self, message: impl Into<Value>) -> Result<&mut Self> {
		self.set("debug", message)
	}

	/// Apply [`set`](Self::set) per `(category, message)` pair in order
	///
	/// Stops at the first invalid message; pairs before it stay applied.
	pub fn set_many<I, K, V>(&mut self, data: I) -> Result<&mut Self>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		for (category, message) in data {
			self.set(category, message)?;
		}
		Ok(self)
	}

	/// Take a category's content
	///
	/// Consuming read: the category is removed, so a second call returns an
	/// empty array. An absent category also yields an empty array, never an
	/// error.
	pub fn get(&mut self, category: &str) -> Value {
		self.categories
			.shift_remove(category)
			.unwrap_or_else(|| Value::Array(Vec::new()))
	}

	/// Take every category, leaving the store empty
	pub fn get_all(&mut self) -> IndexMap<String, Value> {
		std::mem::take(&mut self.categories)
	}

	/// Render one category as an HTML fragment, consuming it
	///
	/// Output is `<div class="alert alert-{category}"><ul>…</ul></div>`,
	/// with the Bootstrap `danger` class substituted for the `error`
	/// category. An empty or absent category renders as `""`.
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use flashy::{InMemoryFlashSession, Messages};
	///
	/// let session = Arc::new(InMemoryFlashSession::new());
	/// let mut messages = Messages::new(session);
	/// messages.info("saved").unwrap();
	///
	/// assert_eq!(
	/// 	messages.get_formatted("info"),
	/// 	"<div class=\"alert alert-info\"><ul><li>saved</li></ul></div>"
	/// );
	/// ```
	pub fn get_formatted(&mut self, category: &str) -> String {
		self.get_formatted_with(category, &HashMap::new())
	}

	/// Render one category with custom CSS classes, consuming it
	///
	/// When `classes` has an entry for `category`, that entry becomes the
	/// `<div>`'s entire class attribute value; otherwise the Bootstrap
	/// default applies, with the category name HTML-escaped.
	pub fn get_formatted_with(&mut self, category: &str, classes: &HashMap<String, String>) -> String {
		let has_content = self.categories.get(category).is_some_and(has_renderable_content);
		if !has_content {
			return String::new();
		}

		let class = match classes.get(category) {
			Some(class) => class.clone(),
			None if category == "error" => "alert alert-danger".to_string(),
			None => format!("alert alert-{}", escape_html(category)),
		};

		let content = self.get(category);
		format!("<div class=\"{}\">{}</div>", class, unordered_list(&content))
	}

	/// Render every category in insertion order, consuming them all
	pub fn get_all_formatted(&mut self) -> String {
		self.get_all_formatted_with(&HashMap::new())
	}

	/// Render every category in insertion order with custom CSS classes
	pub fn get_all_formatted_with(&mut self, classes: &HashMap<String, String>) -> String {
		let categories: Vec<String> = self.categories.keys().cloned().collect();
		categories
			.iter()
			.map(|category| self.get_formatted_with(category, classes))
			.collect()
	}

	/// Empty the in-memory categories
	///
	/// With `purge_backing` the flash entry is removed from the session
	/// immediately instead of waiting for the end-of-scope flush.
	pub fn clear(&mut self, purge_backing: bool) {
		self.categories.clear();
		if purge_backing {
			self.session.remove(SESSION_INDEX);
		}
	}

	/// Flush the in-memory categories to the session
	///
	/// Idempotent; the last call wins. An empty store removes the entry
	/// instead of writing one, so the next request sees nothing at all.
	pub fn save(&self) {
		self.session.remove(SESSION_INDEX);
		if self.categories.is_empty() {
			return;
		}
		debug!(key = SESSION_INDEX, categories = self.categories.len(), "flushing messages");
		match serde_json::to_value(&self.categories) {
			Ok(value) => self.session.set(SESSION_INDEX, value),
			Err(err) => debug!(key = SESSION_INDEX, %err, "failed to serialize messages"),
		}
	}
}

impl Drop for Messages {
	fn drop(&mut self) {
		self.save();
	}
}

fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn has_renderable_content(value: &Value) -> bool {
	match value {
		Value::Array(items) => !items.is_empty(),
		Value::Object(entries) => !entries.is_empty(),
		_ => false,
	}
}

/// Render category content as a `<ul>`, recursing into labeled sub-lists
///
/// Message text and labels are emitted as-is, not escaped. That matches the
/// legacy behavior this crate reproduces; callers rendering untrusted text
/// must escape it before calling `set`.
fn unordered_list(data: &Value) -> String {
	let mut html = String::from("<ul>");
	match data {
		Value::Array(items) => {
			for item in items {
				render_entry(&mut html, item);
			}
		}
		Value::Object(entries) => {
			for (label, value) in entries {
				render_labeled(&mut html, label, value);
			}
		}
		_ => {}
	}
	html.push_str("</ul>");
	html
}

fn render_entry(html: &mut String, item: &Value) {
	match item {
		Value::String(text) => {
			html.push_str("<li>");
			html.push_str(text);
			html.push_str("</li>");
		}
		Value::Object(entries) => {
			for (label, value) in entries {
				render_labeled(html, label, value);
			}
		}
		Value::Array(_) => {
			// Unlabeled nested list.
			html.push_str("<li>");
			html.push_str(&unordered_list(item));
			html.push_str("</li>");
		}
		_ => {}
	}
}

fn render_labeled(html: &mut String, label: &str, value: &Value) {
	match value {
		// A plain string under a label renders as the string alone.
		Value::String(text) => {
			html.push_str("<li>");
			html.push_str(text);
			html.push_str("</li>");
		}
		Value::Array(_) | Value::Object(_) => {
			html.push_str("<li>");
			html.push_str(label);
			html.push_str(&unordered_list(value));
			html.push_str("</li>");
		}
		_ => {}
	}
}
