//! Asynchronous graph document loading with stale-response protection.
//!
//! Loads are two-phase: `begin` hands out a monotonically increasing token
//! before the fetch starts, and `commit` rejects any token that has been
//! superseded by a newer `begin`. Overlapping loads therefore resolve to the
//! most recently issued request instead of whichever response happens to
//! arrive last.
//!
//! The loader also retains the last successfully adapted document so the view
//! can re-run adaptation without refetching (`GraphView::reload`).

use std::error::Error;
use std::fmt;

use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::gephi::ParseError;

/// Why a load attempt produced nothing.
///
/// Transport and parse failures surface identically to the user; they stay
/// separate here for diagnostics. `Stale` is not a failure at all, just a
/// superseded response being discarded.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadError {
	/// Non-200 status or a network-level failure.
	Transport {
		/// HTTP status when a response arrived at all.
		status: Option<u16>,
		/// Transport-level detail.
		message: String,
	},
	/// The body arrived but could not be adapted.
	Parse(ParseError),
	/// A newer load was issued before this one completed.
	Stale,
}

impl fmt::Display for LoadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LoadError::Transport {
				status: Some(status),
				message,
			} => write!(f, "transport error (HTTP {status}): {message}"),
			LoadError::Transport { status: None, message } => {
				write!(f, "transport error: {message}")
			}
			LoadError::Parse(e) => write!(f, "parse error: {e}"),
			LoadError::Stale => write!(f, "superseded by a newer load"),
		}
	}
}

impl Error for LoadError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			LoadError::Parse(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ParseError> for LoadError {
	fn from(e: ParseError) -> Self {
		LoadError::Parse(e)
	}
}

/// Proof that a load was issued; consumed when its response comes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(u64);

/// Tracks in-flight load ordering and the retained snapshot.
#[derive(Debug, Default)]
pub struct GraphLoader {
	seq: u64,
	snapshot: Option<Value>,
}

impl GraphLoader {
	/// Create a loader with no retained snapshot.
	pub fn new() -> Self {
		Self::default()
	}

	/// Issue a token for a new load, superseding every earlier one.
	pub fn begin(&mut self) -> LoadToken {
		self.seq += 1;
		LoadToken(self.seq)
	}

	/// Whether `token` still names the most recently issued load.
	///
	/// A superseded load's outcome must be ignored entirely, failure included;
	/// only `commit` rejects on its own, so callers handling the error arm
	/// check here first.
	pub fn is_current(&self, token: LoadToken) -> bool {
		token.0 == self.seq
	}

	/// Validate a fetched body against the token's ordering and parse it.
	///
	/// The document is returned to the caller for adaptation; it does not
	/// become the retained snapshot until [`GraphLoader::retain`] is called,
	/// so a document that later fails adaptation leaves the previous snapshot
	/// in place.
	pub fn commit(&self, token: LoadToken, body: &str) -> Result<Value, LoadError> {
		if token.0 != self.seq {
			return Err(LoadError::Stale);
		}
		let document: Value =
			serde_json::from_str(body).map_err(|e| ParseError::Json(e.to_string()))?;
		if document.get("nodes").is_none() {
			// A document without a nodes array is a delta, never authoritative.
			return Err(ParseError::MissingNodes.into());
		}
		Ok(document)
	}

	/// Replace the retained snapshot after a fully successful load.
	pub fn retain(&mut self, document: Value) {
		self.snapshot = Some(document);
	}

	/// The last successfully loaded document, if any.
	pub fn snapshot(&self) -> Option<&Value> {
		self.snapshot.as_ref()
	}
}

fn js_message(value: &JsValue) -> String {
	value
		.as_string()
		.unwrap_or_else(|| format!("{value:?}"))
}

fn network(message: String) -> LoadError {
	LoadError::Transport {
		status: None,
		message,
	}
}

/// GET `path` and return the response body text.
///
/// Anything other than a 200 response is a transport error. No timeout and no
/// retry; a hung fetch simply never resolves.
pub async fn fetch_text(path: &str) -> Result<String, LoadError> {
	let window = web_sys::window().ok_or_else(|| network("no window".into()))?;
	let response = JsFuture::from(window.fetch_with_str(path))
		.await
		.map_err(|e| network(js_message(&e)))?;
	let response: Response = response
		.dyn_into()
		.map_err(|e| network(js_message(&e)))?;

	if response.status() != 200 {
		return Err(LoadError::Transport {
			status: Some(response.status()),
			message: response.status_text(),
		});
	}

	let body = JsFuture::from(response.text().map_err(|e| network(js_message(&e)))?)
		.await
		.map_err(|e| network(js_message(&e)))?;
	body.as_string()
		.ok_or_else(|| network("response body is not text".into()))
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn commit_accepts_the_latest_token() {
		let mut loader = GraphLoader::new();
		let token = loader.begin();
		let doc = loader.commit(token, r#"{"nodes":[{"id":"a"}]}"#).unwrap();
		assert_eq!(doc["nodes"][0]["id"], json!("a"));
	}

	#[test]
	fn superseded_token_is_stale() {
		let mut loader = GraphLoader::new();
		let first = loader.begin();
		let second = loader.begin();

		assert_eq!(
			loader.commit(first, r#"{"nodes":[]}"#).unwrap_err(),
			LoadError::Stale
		);
		assert!(loader.commit(second, r#"{"nodes":[]}"#).is_ok());
	}

	#[test]
	fn only_the_latest_token_is_current() {
		let mut loader = GraphLoader::new();
		let first = loader.begin();
		assert!(loader.is_current(first));

		let second = loader.begin();
		assert!(!loader.is_current(first));
		assert!(loader.is_current(second));
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		let mut loader = GraphLoader::new();
		let token = loader.begin();
		assert!(matches!(
			loader.commit(token, "{nodes"),
			Err(LoadError::Parse(ParseError::Json(_)))
		));
	}

	#[test]
	fn delta_document_is_rejected() {
		let mut loader = GraphLoader::new();
		let token = loader.begin();
		assert_eq!(
			loader.commit(token, r#"{"edges":[]}"#).unwrap_err(),
			LoadError::Parse(ParseError::MissingNodes)
		);
	}

	#[test]
	fn snapshot_survives_a_failed_commit() {
		let mut loader = GraphLoader::new();
		let token = loader.begin();
		let doc = loader.commit(token, r#"{"nodes":[{"id":"a"}]}"#).unwrap();
		loader.retain(doc);

		let token = loader.begin();
		assert!(loader.commit(token, "not json").is_err());
		assert_eq!(
			loader.snapshot().unwrap()["nodes"][0]["id"],
			json!("a")
		);
	}
}
