//! Host adapter interface
//!
//! The reconciler never touches a backend directly. Everything it needs from a
//! rendering target goes through [`HostAdapter`]: creating backend nodes for
//! host and text elements, patching them, and moving them in and out of their
//! backend parent. Three adapters ship with the workspace (a direct DOM one, a
//! string-building one for server rendering and a retained scene one), and
//! applications may write their own.

use crate::element::HostElement;
use crate::error::{Error, Result};
use crate::props::Props;
use crate::tree::{NodeId, NodeTree};

/// A pluggable rendering backend.
///
/// Only host and text nodes own a backend handle ([`HostAdapter::Native`]).
/// Fragments, providers and components have none; operations on them are
/// resolved to the handles of their nearest host descendants.
pub trait HostAdapter {
	/// Backend handle of a host or text node.
	///
	/// Handles are cloned freely, so they should be cheap references
	/// (an `Rc`, a JS object, an index).
	type Native: Clone + 'static;

	/// Creates the backend node for a host element and applies its props.
	///
	/// `parent` is the handle of the closest host ancestor. The node is not
	/// attached yet; the reconciler follows up with [`HostAdapter::append_child`]
	/// or [`HostAdapter::replace_child`].
	fn create_host_node(&mut self, parent: &Self::Native, element: &HostElement) -> Result<Self::Native>;

	/// Patches a host node from `previous` to `next` props.
	///
	/// Children are not part of either prop set. Handlers in `next` replace
	/// the bound ones even when [`Props::changes`] does not list their keys.
	fn update_host_node(&mut self, native: &Self::Native, previous: &Props, next: &Props) -> Result<()>;

	/// Points the listeners of a host node at the handlers in `next`.
	///
	/// Called instead of [`HostAdapter::update_host_node`] when the only
	/// difference between two renders is handlers replaced by fresh ones.
	/// Nothing observable about the node changes.
	fn rebind_handlers(&mut self, native: &Self::Native, next: &Props) -> Result<()>;

	/// Creates a backend text node.
	fn create_text_node(&mut self, text: &str) -> Result<Self::Native>;

	/// Replaces the content of a text node.
	fn update_text_node(&mut self, native: &Self::Native, text: &str) -> Result<()>;

	/// Appends `child` as the last child of `parent`.
	fn append_child(&mut self, parent: &Self::Native, child: &Self::Native) -> Result<()>;

	/// Puts `next` where `previous` is in `parent`.
	fn replace_child(&mut self, parent: &Self::Native, previous: &Self::Native, next: &Self::Native) -> Result<()>;

	/// Detaches `child` from `parent`.
	fn detach(&mut self, parent: &Self::Native, child: &Self::Native) -> Result<()>;

	/// Returns the nearest component node at or above `node`.
	fn find_closest_component(&self, tree: &NodeTree<Self::Native>, node: NodeId) -> Option<NodeId> {
		tree.find_closest_component(node)
	}

	/// Returns the nearest host node at or above `node`.
	fn find_closest_host_node(&self, tree: &NodeTree<Self::Native>, node: NodeId) -> Result<NodeId> {
		tree.find_closest_host_node(node)
	}

	/// Detaches every backend node of the subtree rooted at `node`.
	///
	/// Recurses through fragments, providers and components down to the
	/// topmost host and text nodes, which are detached from the backend node
	/// of the closest host ancestor of `node`. `node` must still be linked
	/// into the tree.
	fn remove_host_node(&mut self, tree: &NodeTree<Self::Native>, node: NodeId) -> Result<()> {
		let parent = tree.parent_of(node).ok_or(Error::NoHostAncestor(node))?;
		let host = self.find_closest_host_node(tree, parent)?;
		let parent_native = tree.native(host).cloned().ok_or(Error::MissingNative(host))?;
		for child in tree.native_handles(node) {
			self.detach(&parent_native, &child)?;
		}
		Ok(())
	}

	/// Called once after each scheduler task finished reconciling, before effects run.
	fn commit(&mut self) -> Result<()> {
		Ok(())
	}
}
