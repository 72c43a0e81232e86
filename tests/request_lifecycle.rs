//! Request lifecycle integration tests
//!
//! Each test simulates the request-redirect-request cycle the stores exist
//! for: a store is constructed at "request start", dropped at "request end"
//! (flushing to the flash session), and the session's `advance()` marks the
//! request boundary. The laws under test:
//!
//! - data flushed in request N is visible in request N+1
//! - data not rewritten in request N+1 is gone in request N+2
//! - hydration consumes the flash entry
//! - `clear(true)` leaves the backing entry absent for the next request

use flashy::form_data::{self, FormData};
use flashy::messages::{self, Messages};
use flashy::session::{FlashSession, InMemoryFlashSession};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[test]
fn form_data_survives_exactly_one_cycle() {
	let session = Arc::new(InMemoryFlashSession::new());

	// Request N: a failed submission stashes the fields and redirects.
	{
		let mut form_data = FormData::new(session.clone());
		form_data.set_all(HashMap::from([("foo".to_string(), "bar".to_string())]));
	}
	session.advance();

	// Request N+1: the form view consumes them.
	{
		let mut form_data = FormData::new(session.clone());
		assert_eq!(form_data.get_or("foo", ""), "bar");
	}
	session.advance();

	// Request N+2: nothing left.
	let mut form_data = FormData::new(session.clone());
	assert_eq!(form_data.get_or("foo", ""), "");
}

#[test]
fn unread_form_data_is_rewritten_by_the_drop_flush() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut form_data = FormData::new(session.clone());
		form_data.set("foo", "bar");
	}
	session.advance();

	// Request N+1 constructs the store but never reads the field; the drop
	// flush rewrites it, carrying it one more cycle.
	{
		let _form_data = FormData::new(session.clone());
	}
	session.advance();

	let mut form_data = FormData::new(session.clone());
	assert_eq!(form_data.get_or("foo", ""), "bar");
}

#[test]
fn consumed_form_data_is_not_rewritten() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut form_data = FormData::new(session.clone());
		form_data.set("foo", "bar");
	}
	session.advance();

	{
		let mut form_data = FormData::new(session.clone());
		assert_eq!(form_data.get("foo"), Some("bar".to_string()));
		// The mapping is now empty, so the drop flush removes the entry.
	}
	session.advance();

	assert!(!session.has(form_data::SESSION_INDEX));
}

#[test]
fn hydration_consumes_the_flash_entry() {
	let session = Arc::new(InMemoryFlashSession::new());
	session.set(form_data::SESSION_INDEX, json!({"foo": "bar"}));
	session.advance();

	let mut first = FormData::new(session.clone());
	assert!(!session.has(form_data::SESSION_INDEX));

	// A second store constructed in the same request finds nothing.
	let mut second = FormData::new(session.clone());
	assert_eq!(second.get_or("foo", "absent"), "absent");
	assert_eq!(first.get_or("foo", ""), "bar");
}

#[test]
fn messages_survive_exactly_one_cycle() {
	let session = Arc::new(InMemoryFlashSession::new());

	// Request N.
	{
		let mut messages = Messages::new(session.clone());
		messages.error("foo").unwrap();
	}
	session.advance();

	// Request N+1.
	{
		let mut messages = Messages::new(session.clone());
		assert_eq!(messages.get("error"), json!(["foo"]));
	}
	session.advance();

	// Request N+2.
	let mut messages = Messages::new(session.clone());
	assert_eq!(messages.get("error"), json!([]));
}

#[test]
fn messages_flush_preserves_category_order() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut messages = Messages::new(session.clone());
		messages
			.set_many([("warning", "w"), ("error", "e"), ("info", "i")])
			.unwrap();
	}
	session.advance();

	let mut messages = Messages::new(session.clone());
	assert_eq!(
		messages.get_all_formatted(),
		"<div class=\"alert alert-warning\"><ul><li>w</li></ul></div>\
		 <div class=\"alert alert-danger\"><ul><li>e</li></ul></div>\
		 <div class=\"alert alert-info\"><ul><li>i</li></ul></div>"
	);
}

#[test]
fn explicit_save_matches_drop_flush() {
	let session = Arc::new(InMemoryFlashSession::new());

	let mut messages = Messages::new(session.clone());
	messages.error("foo").unwrap();
	messages.save();
	// Repeated saves are idempotent; the last one wins.
	messages.save();
	drop(messages);
	session.advance();

	let mut messages = Messages::new(session.clone());
	assert_eq!(messages.get("error"), json!(["foo"]));
}

#[test]
fn clear_with_purge_leaves_backing_entry_absent() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut messages = Messages::new(session.clone());
		messages.error("foo").unwrap();
		messages.save();
		messages.clear(true);
	}
	session.advance();

	assert!(!session.has(messages::SESSION_INDEX));
	let mut messages = Messages::new(session.clone());
	assert_eq!(messages.get("error"), json!([]));
}

#[test]
fn stores_do_not_collide_in_one_session() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut form_data = FormData::new(session.clone());
		form_data.set("field", "value");
		let mut messages = Messages::new(session.clone());
		messages.info("note").unwrap();
	}
	session.advance();

	let mut form_data = FormData::new(session.clone());
	let mut messages = Messages::new(session.clone());
	assert_eq!(form_data.get_or("field", ""), "value");
	assert_eq!(messages.get("info"), json!(["note"]));
}

#[test]
fn nested_messages_round_trip_in_order() {
	let session = Arc::new(InMemoryFlashSession::new());

	{
		let mut messages = Messages::new(session.clone());
		messages
			.error(json!(["foo", "bar", {"baz": ["bip", "bap", "bop"]}]))
			.unwrap();
	}
	session.advance();

	let mut messages = Messages::new(session.clone());
	assert_eq!(
		messages.get_formatted("error"),
		"<div class=\"alert alert-danger\"><ul><li>foo</li><li>bar</li>\
		 <li>baz<ul><li>bip</li><li>bap</li><li>bop</li></ul></li></ul></div>"
	);
}
