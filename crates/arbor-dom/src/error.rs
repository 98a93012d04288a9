//! DOM adapter errors

use thiserror::Error;

/// Errors raised by the DOM layer and the DOM adapter.
#[derive(Debug, Error)]
pub enum DomError {
	/// The existing node at the hydration cursor does not match the element.
	#[error("hydration mismatch: expected {expected}, found {found}")]
	HydrationMismatch {
		/// What the element tree asked for
		expected: String,
		/// What the container holds at that position
		found: String,
	},
	/// The container has fewer nodes than the element tree.
	#[error("hydration ran out of nodes: expected {expected}")]
	HydrationExhausted {
		/// What the element tree asked for
		expected: String,
	},
	/// The node is not a child of the given parent.
	#[error("node is not a child of the given parent")]
	NotAChild,
	/// An element operation was called on another node type.
	#[error("{0} is not an element")]
	NotAnElement(String),
	/// The tag cannot name an element.
	#[error("invalid tag name: {0:?}")]
	InvalidTag(String),
	/// No window or document is available.
	#[error("no document available")]
	NoDocument,
	/// A DOM call threw.
	#[error("DOM exception: {0}")]
	Js(String),
}

impl From<DomError> for arbor_core::Error {
	fn from(err: DomError) -> Self {
		Self::adapter(err)
	}
}
