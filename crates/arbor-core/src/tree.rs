//! Node arena
//!
//! The persistent runtime tree mirroring the last render. Nodes live in a
//! generational arena: parents are stored as [`NodeId`]s, never as owning
//! references, and an id whose node was destroyed stops resolving even if its
//! slot is reused.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::context::ContextId;
use crate::element::{Component, ElementKind};
use crate::error::{Error, Result};
use crate::hooks::Hook;
use crate::props::Props;

/// Identifier for a node in the tree (generational).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32, u32);

impl NodeId {
	const fn new(index: u32, generation: u32) -> Self {
		Self(index, generation)
	}

	const fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "node {}v{}", self.0, self.1)
	}
}

/// State of a component node.
pub struct ComponentNode {
	pub(crate) component: Component,
	pub(crate) props: Props,
	pub(crate) hooks: Vec<Hook>,
	pub(crate) rendered: bool,
	pub(crate) hot_swapped: bool,
}

impl ComponentNode {
	pub(crate) fn new(component: Component, props: Props) -> Self {
		Self {
			component,
			props,
			hooks: Vec::new(),
			rendered: false,
			hot_swapped: false,
		}
	}

	/// Returns the component currently rendering this node.
	pub fn component(&self) -> Component {
		self.component
	}

	/// Returns the props of the last render.
	pub fn props(&self) -> &Props {
		&self.props
	}

	/// Returns the number of hook slots.
	pub fn hook_count(&self) -> usize {
		self.hooks.len()
	}
}

/// State of a host node.
pub struct HostNode<N> {
	pub(crate) tag: String,
	pub(crate) props: Props,
	pub(crate) native: N,
}

impl<N> HostNode<N> {
	/// Returns the tag name.
	pub fn tag(&self) -> &str {
		&self.tag
	}

	/// Returns the props last pushed to the backend (children excluded).
	pub fn props(&self) -> &Props {
		&self.props
	}

	/// Returns the backend handle.
	pub fn native(&self) -> &N {
		&self.native
	}
}

/// State of a text node.
pub struct TextNode<N> {
	pub(crate) text: String,
	pub(crate) native: N,
}

impl<N> TextNode<N> {
	/// Returns the text content.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the backend handle.
	pub fn native(&self) -> &N {
		&self.native
	}
}

/// State of a provider node.
pub struct ProviderNode {
	pub(crate) context: ContextId,
	pub(crate) value: Rc<dyn Any>,
	pub(crate) props: Props,
}

impl ProviderNode {
	/// Returns the context this node publishes.
	pub fn context(&self) -> ContextId {
		self.context
	}
}

/// Variant payload of a node. Mirrors [`Element`](crate::element::Element).
pub enum NodeKind<N> {
	/// Rendered by a component; owns hook state
	Component(ComponentNode),
	/// Owns a backend element
	Host(HostNode<N>),
	/// Owns a backend text node
	Text(TextNode<N>),
	/// Publishes a context value
	Provider(ProviderNode),
	/// Groups children
	Fragment(Props),
}

impl<N> NodeKind<N> {
	/// Returns the variant tag.
	pub fn kind(&self) -> ElementKind {
		match self {
			Self::Component(_) => ElementKind::Component,
			Self::Host(_) => ElementKind::Host,
			Self::Text(_) => ElementKind::Text,
			Self::Provider(_) => ElementKind::Provider,
			Self::Fragment(_) => ElementKind::Fragment,
		}
	}

	/// Returns the backend handle of host and text nodes.
	pub fn native(&self) -> Option<&N> {
		match self {
			Self::Host(host) => Some(&host.native),
			Self::Text(text) => Some(&text.native),
			_ => None,
		}
	}
}

/// A node of the runtime tree.
pub struct Node<N> {
	generation: u32,
	parent: Option<NodeId>,
	descendants: Vec<NodeId>,
	kind: NodeKind<N>,
}

impl<N> Node<N> {
	/// Returns the parent, `None` for the root.
	pub fn parent(&self) -> Option<NodeId> {
		self.parent
	}

	/// Returns the child nodes, index-aligned with the last rendered children.
	pub fn descendants(&self) -> &[NodeId] {
		&self.descendants
	}

	/// Returns the variant payload.
	pub fn kind(&self) -> &NodeKind<N> {
		&self.kind
	}

	pub(crate) fn kind_mut(&mut self) -> &mut NodeKind<N> {
		&mut self.kind
	}
}

impl<N> fmt::Debug for Node<N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("kind", &self.kind.kind())
			.field("parent", &self.parent)
			.field("descendants", &self.descendants)
			.finish()
	}
}

/// Arena of nodes.
pub struct NodeTree<N> {
	nodes: Vec<Option<Node<N>>>,
	/// last generation per slot (persists across frees)
	generations: Vec<u32>,
	free_list: Vec<usize>,
}

impl<N> Default for NodeTree<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> fmt::Debug for NodeTree<N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeTree")
			.field("live", &self.len())
			.field("free", &self.free_list.len())
			.finish()
	}
}

impl<N> NodeTree<N> {
	/// Creates an empty tree.
	pub fn new() -> Self {
		Self {
			nodes: Vec::new(),
			generations: Vec::new(),
			free_list: Vec::new(),
		}
	}

	/// Inserts a node under `parent` without linking it into the parent's descendants.
	pub(crate) fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind<N>) -> NodeId {
		let (index, generation) = if let Some(index) = self.free_list.pop() {
			let generation = self.generations[index].wrapping_add(1);
			self.generations[index] = generation;
			(index, generation)
		} else {
			self.nodes.push(None);
			self.generations.push(1);
			(self.nodes.len() - 1, 1)
		};
		self.nodes[index] = Some(Node {
			generation,
			parent,
			descendants: Vec::new(),
			kind,
		});
		#[allow(
			clippy::cast_possible_truncation,
			reason = "trees never hold more than u32::MAX nodes"
		)]
		NodeId::new(index as u32, generation)
	}

	/// Removes a single node from the arena and returns it.
	///
	/// Descendants are not touched; the caller removes them first or afterwards.
	pub(crate) fn remove(&mut self, id: NodeId) -> Option<Node<N>> {
		if !self.is_alive(id) {
			return None;
		}
		self.free_list.push(id.index());
		self.nodes[id.index()].take()
	}

	/// Returns true if `id` refers to a live node.
	pub fn is_alive(&self, id: NodeId) -> bool {
		self.get(id).is_some()
	}

	/// Returns the number of live nodes.
	pub fn len(&self) -> usize {
		self.nodes.iter().filter(|slot| slot.is_some()).count()
	}

	/// Returns true if the tree holds no node.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns a node if the identifier is live.
	pub fn get(&self, id: NodeId) -> Option<&Node<N>> {
		self.nodes
			.get(id.index())
			.and_then(Option::as_ref)
			.filter(|node| node.generation == id.1)
	}

	pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<N>> {
		self.nodes
			.get_mut(id.index())
			.and_then(Option::as_mut)
			.filter(|node| node.generation == id.1)
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node<N>> {
		self.get_mut(id).ok_or(Error::StaleNode(id))
	}

	/// Returns the variant payload of a live node.
	pub fn kind(&self, id: NodeId) -> Option<&NodeKind<N>> {
		self.get(id).map(Node::kind)
	}

	/// Returns the parent of a node if live, or `None` for the root or stale ids.
	pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
		self.get(id).and_then(|node| node.parent)
	}

	/// Returns the children of a node, or an empty slice if the node is stale.
	pub fn descendants_of(&self, id: NodeId) -> &[NodeId] {
		self.get(id).map_or(&[], |node| node.descendants.as_slice())
	}

	/// Returns the backend handle of a host or text node.
	pub fn native(&self, id: NodeId) -> Option<&N> {
		self.kind(id).and_then(NodeKind::native)
	}

	pub(crate) fn push_descendant(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
		self.node_mut(parent)?.descendants.push(child);
		Ok(())
	}

	pub(crate) fn set_descendant(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
		let node = self.node_mut(parent)?;
		match node.descendants.get_mut(index) {
			Some(slot) => {
				*slot = child;
				Ok(())
			}
			None => Err(Error::MalformedTree(format!(
				"{parent} has no descendant at index {index}"
			))),
		}
	}

	pub(crate) fn remove_descendant(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
		self.node_mut(parent)?.descendants.retain(|id| *id != child);
		Ok(())
	}

	/// Collects the ids of a subtree in pre-order.
	pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
		let mut out = Vec::new();
		let mut stack = vec![id];
		while let Some(current) = stack.pop() {
			if let Some(node) = self.get(current) {
				out.push(current);
				stack.extend(node.descendants.iter().rev().copied());
			}
		}
		out
	}

	/// Walks `parent` links from `id` (inclusive) to the first component node.
	pub fn find_closest_component(&self, id: NodeId) -> Option<NodeId> {
		let mut current = Some(id);
		while let Some(candidate) = current {
			let node = self.get(candidate)?;
			if matches!(node.kind, NodeKind::Component(_)) {
				return Some(candidate);
			}
			current = node.parent;
		}
		None
	}

	/// Walks `parent` links from `id` (inclusive) to the first host node.
	///
	/// Every subtree hangs below a host node (the root is one), so failing to
	/// find one means the tree is malformed.
	pub fn find_closest_host_node(&self, id: NodeId) -> Result<NodeId> {
		let mut current = Some(id);
		while let Some(candidate) = current {
			let node = self.get(candidate).ok_or(Error::StaleNode(candidate))?;
			if matches!(node.kind, NodeKind::Host(_)) {
				return Ok(candidate);
			}
			current = node.parent;
		}
		Err(Error::NoHostAncestor(id))
	}
}

impl<N: Clone> NodeTree<N> {
	/// Collects the topmost backend handles of a subtree.
	///
	/// Host and text nodes contribute their own handle; fragments, providers and
	/// components contribute the handles of their descendants.
	pub fn native_handles(&self, id: NodeId) -> Vec<N> {
		let mut out = Vec::new();
		self.collect_natives(id, &mut out);
		out
	}

	fn collect_natives(&self, id: NodeId, out: &mut Vec<N>) {
		let Some(node) = self.get(id) else {
			return;
		};
		match node.kind.native() {
			Some(native) => out.push(native.clone()),
			None => {
				for child in &node.descendants {
					self.collect_natives(*child, out);
				}
			}
		}
	}
}
