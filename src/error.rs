//! Error types for the flash stores

use thiserror::Error;

/// Errors raised by the flash stores
#[non_exhaustive]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	/// A message value that is neither a string nor an array/map was passed
	/// to [`Messages::set`](crate::Messages::set) or one of its wrappers.
	#[error("message must be a string or an array, '{given}' given")]
	InvalidMessage {
		/// JSON type name of the rejected value
		given: &'static str,
	},
}

/// Result alias for flash store operations
pub type Result<T> = std::result::Result<T, Error>;
