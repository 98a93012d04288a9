//! Error types for the reconciliation engine
//!
//! Every error in this crate signals a programming mistake (a structural
//! violation of the tree or hook contracts, or a failing host adapter).
//! None of them are retried: the scheduler aborts the current drain and hands
//! the error back to whoever started it.

use thiserror::Error;

use crate::context::ContextId;
use crate::hooks::HookKind;
use crate::tree::NodeId;

/// Reconciliation error type
#[derive(Debug, Error)]
pub enum Error {
	/// A hook of a different kind was called at a slot that already holds another kind
	#[error(
		"hooks called in a different order in {node}: slot {index} holds a {expected} hook, but a {found} hook was called"
	)]
	HookOrder {
		/// Component node owning the hook list
		node: NodeId,
		/// Position of the hook within the render
		index: usize,
		/// Kind recorded on a previous render
		expected: HookKind,
		/// Kind requested by the current render
		found: HookKind,
	},

	/// The number of hooks called differs from the previous render
	#[error("{node} called {found} hooks, but {expected} were called on the previous render")]
	HookCount {
		/// Component node owning the hook list
		node: NodeId,
		/// Number of hooks recorded on the previous render
		expected: usize,
		/// Number of hooks called during the current render
		found: usize,
	},

	/// A hook slot of the right kind holds a value of a different type
	#[error("{kind} hook at slot {index} of {node} was called with a different value type")]
	HookType {
		/// Component node owning the hook list
		node: NodeId,
		/// Position of the hook within the render
		index: usize,
		/// Kind of the hook slot
		kind: HookKind,
	},

	/// `use_context` was called without a provider publishing the context
	#[error("no provider published a value for {context}")]
	MissingProvider {
		/// Context that was read
		context: ContextId,
	},

	/// A node id refers to a node that no longer exists
	#[error("{0} does not exist in the node tree")]
	StaleNode(NodeId),

	/// A host or text node was expected to own a backend handle
	#[error("{0} has no backend handle")]
	MissingNative(NodeId),

	/// No host node exists above the given node
	#[error("{0} has no host ancestor")]
	NoHostAncestor(NodeId),

	/// The tree does not have the shape the reconciler requires
	#[error("malformed tree: {0}")]
	MalformedTree(String),

	/// The host adapter failed to perform an operation
	#[error("host adapter error: {0}")]
	Adapter(Box<dyn std::error::Error + 'static>),
}

impl Error {
	/// Wraps an adapter specific error.
	pub fn adapter<E>(err: E) -> Self
	where
		E: std::error::Error + 'static,
	{
		Self::Adapter(Box::new(err))
	}
}

/// Result type for reconciliation operations
pub type Result<T> = std::result::Result<T, Error>;
