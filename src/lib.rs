//! Flash messages and one-time form data for web sessions
//!
//! This crate provides two helpers built on top of a session's flash
//! storage: [`FormData`] re-populates a form after a validation-failure
//! redirect, and [`Messages`] carries categorized notifications ("error",
//! "info", ...) across exactly one request-redirect-request cycle, with
//! optional rendering as Bootstrap-style HTML fragments.
//!
//! Both hydrate from a [`FlashSession`] when constructed and flush back to
//! it when dropped (or on an explicit [`Messages::save`]/[`FormData::save`]),
//! so a handler can treat them as plain in-memory maps.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use flashy::{InMemoryFlashSession, Messages};
//!
//! let session = Arc::new(InMemoryFlashSession::new());
//!
//! // Request N: a handler records what went wrong, then redirects.
//! {
//! 	let mut messages = Messages::new(session.clone());
//! 	messages.error("Email address is required").unwrap();
//! }
//!
//! // Request boundary (the fake session rotates its flash generations).
//! session.advance();
//!
//! // Request N+1: the redirect target renders the notification.
//! let mut messages = Messages::new(session.clone());
//! let html = messages.get_formatted("error");
//! assert_eq!(
//! 	html,
//! 	"<div class=\"alert alert-danger\"><ul><li>Email address is required</li></ul></div>"
//! );
//! ```

pub mod error;
pub mod escape;
pub mod form_data;
pub mod messages;
pub mod session;

pub use error::{Error, Result};
pub use escape::escape_html;
pub use form_data::FormData;
pub use messages::Messages;
pub use session::{FlashSession, InMemoryFlashSession};

/// Re-export commonly used types
///
/// The per-store `SESSION_INDEX` constants are deliberately left out; they
/// share a name and stay reachable through their modules.
pub mod prelude {
	pub use crate::error::{Error, Result};
	pub use crate::escape::escape_html;
	pub use crate::form_data::FormData;
	pub use crate::messages::Messages;
	pub use crate::session::{FlashSession, InMemoryFlashSession};
}
