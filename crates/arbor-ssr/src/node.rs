//! Serializable server tree
//!
//! The native handles of the string adapter. The tree is plain data: it can
//! be turned into markup or serialized (for instance to JSON, for a client
//! that wants to inspect what the server rendered).

use std::cell::{Ref, RefCell};
use std::fmt::Write as _;
use std::rc::Rc;

use arbor_core::Props;
use indexmap::IndexMap;
use arbor_core::attributes::{attribute_name, attribute_value, escape_html, event_name};
use serde::Serialize;

/// Separator written between adjacent text nodes so hydration finds them as
/// distinct nodes again.
pub const TEXT_SEPARATOR: &str = "<!-- -->";

/// A server tree node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SsrNode {
	/// An element with its attributes (already mapped to attribute names and text)
	Element {
		/// Tag name
		tag: String,
		/// Attribute name to value, in declaration order
		attributes: IndexMap<String, String>,
		/// Attached children
		children: Vec<SsrHandle>,
	},
	/// A text node
	Text {
		/// Unescaped content
		text: String,
	},
}

/// Shared handle to an [`SsrNode`].
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct SsrHandle(Rc<RefCell<SsrNode>>);

impl PartialEq for SsrHandle {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
	}
}

impl SsrHandle {
	/// Creates an element node from host props; handlers and absent values are skipped.
	pub fn element(tag: impl Into<String>, props: &Props) -> Self {
		Self(Rc::new(RefCell::new(SsrNode::Element {
			tag: tag.into(),
			attributes: attributes(props),
			children: Vec::new(),
		})))
	}

	/// Creates a text node.
	pub fn text(text: impl Into<String>) -> Self {
		Self(Rc::new(RefCell::new(SsrNode::Text { text: text.into() })))
	}

	/// Borrows the node.
	pub fn node(&self) -> Ref<'_, SsrNode> {
		self.0.borrow()
	}

	/// Returns true if both handles refer to the same node.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Returns true for text nodes.
	pub fn is_text(&self) -> bool {
		matches!(*self.0.borrow(), SsrNode::Text { .. })
	}

	/// Returns the tag of an element node.
	pub fn tag(&self) -> Option<String> {
		match &*self.0.borrow() {
			SsrNode::Element { tag, .. } => Some(tag.clone()),
			SsrNode::Text { .. } => None,
		}
	}

	/// Returns the attached children.
	pub fn children(&self) -> Vec<Self> {
		match &*self.0.borrow() {
			SsrNode::Element { children, .. } => children.clone(),
			SsrNode::Text { .. } => Vec::new(),
		}
	}

	/// Serializes the node to markup.
	pub fn to_markup(&self, separators: bool) -> String {
		let mut out = String::new();
		self.write_markup(&mut out, separators);
		out
	}

	pub(crate) fn write_markup(&self, out: &mut String, separators: bool) {
		match &*self.0.borrow() {
			SsrNode::Text { text } => out.push_str(&escape_html(text)),
			SsrNode::Element {
				tag,
				attributes,
				children,
			} => {
				let _ = write!(out, "<{tag}");
				for (name, value) in attributes {
					let _ = write!(out, " {name}=\"{}\"", escape_html(value));
				}
				out.push('>');
				write_children(children, out, separators);
				let _ = write!(out, "</{tag}>");
			}
		}
	}

	pub(crate) fn with_node_mut<R>(&self, f: impl FnOnce(&mut SsrNode) -> R) -> R {
		f(&mut self.0.borrow_mut())
	}
}

pub(crate) fn write_children(children: &[SsrHandle], out: &mut String, separators: bool) {
	let mut after_text = false;
	for child in children {
		let is_text = child.is_text();
		if separators && after_text && is_text {
			out.push_str(TEXT_SEPARATOR);
		}
		child.write_markup(out, separators);
		after_text = is_text;
	}
}

pub(crate) fn attributes(props: &Props) -> IndexMap<String, String> {
	props
		.iter()
		.filter(|(key, _)| event_name(key).is_none())
		.filter_map(|(key, value)| Some((attribute_name(key), attribute_value(value)?)))
		.collect()
}

/// The top-level nodes of a server render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SsrTree {
	nodes: Vec<SsrHandle>,
}

impl SsrTree {
	pub(crate) fn new(nodes: Vec<SsrHandle>) -> Self {
		Self { nodes }
	}

	/// Returns the top-level nodes.
	pub fn nodes(&self) -> &[SsrHandle] {
		&self.nodes
	}

	/// Serializes the tree to markup.
	pub fn to_markup(&self, separators: bool) -> String {
		let mut out = String::new();
		write_children(&self.nodes, &mut out, separators);
		out
	}

	/// Serializes the tree to pretty-printed JSON.
	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}
}
