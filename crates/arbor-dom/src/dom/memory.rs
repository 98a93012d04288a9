//! In-memory DOM for non-wasm targets

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use arbor_core::attributes::escape_html;
use arbor_core::{Event, EventHandler};

use super::NodeType;
use crate::error::DomError;

enum Data {
	Element {
		tag: String,
		namespace: Option<String>,
		attributes: Vec<(String, String)>,
		listeners: HashMap<String, EventHandler>,
	},
	Text(String),
	Comment(String),
}

struct NodeData {
	data: Data,
	parent: Weak<RefCell<NodeData>>,
	children: Vec<DomNode>,
}

/// A node of the in-memory DOM.
///
/// Clones share the node; equality of identity is [`DomNode::is_same_node`].
#[derive(Clone)]
pub struct DomNode(Rc<RefCell<NodeData>>);

impl DomNode {
	fn new(data: Data) -> Self {
		Self(Rc::new(RefCell::new(NodeData {
			data,
			parent: Weak::new(),
			children: Vec::new(),
		})))
	}

	/// Returns the node classification.
	pub fn node_type(&self) -> NodeType {
		match self.0.borrow().data {
			Data::Element { .. } => NodeType::Element,
			Data::Text(_) => NodeType::Text,
			Data::Comment(_) => NodeType::Other,
		}
	}

	/// Returns the local name of an element.
	pub fn tag_name(&self) -> Option<String> {
		match &self.0.borrow().data {
			Data::Element { tag, .. } => Some(tag.clone()),
			_ => None,
		}
	}

	/// Returns the namespace URI of an element.
	pub fn namespace(&self) -> Option<String> {
		match &self.0.borrow().data {
			Data::Element { namespace, .. } => namespace.clone(),
			_ => None,
		}
	}

	/// Returns the value of an attribute.
	pub fn attribute(&self, name: &str) -> Option<String> {
		match &self.0.borrow().data {
			Data::Element { attributes, .. } => attributes
				.iter()
				.find(|(key, _)| key == name)
				.map(|(_, value)| value.clone()),
			_ => None,
		}
	}

	/// Sets an attribute, keeping its position if it already exists.
	pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
		match &mut self.0.borrow_mut().data {
			Data::Element { attributes, .. } => {
				match attributes.iter_mut().find(|(key, _)| key == name) {
					Some(entry) => value.clone_into(&mut entry.1),
					None => attributes.push((name.to_string(), value.to_string())),
				}
				Ok(())
			}
			other => Err(DomError::NotAnElement(describe(other))),
		}
	}

	/// Removes an attribute; removing a missing one is not an error.
	pub fn remove_attribute(&self, name: &str) -> Result<(), DomError> {
		match &mut self.0.borrow_mut().data {
			Data::Element { attributes, .. } => {
				attributes.retain(|(key, _)| key != name);
				Ok(())
			}
			other => Err(DomError::NotAnElement(describe(other))),
		}
	}

	/// Appends `child`, moving it out of its current parent first.
	pub fn append_child(&self, child: &Self) -> Result<(), DomError> {
		self.insert_before(child, None)
	}

	/// Inserts `child` before `reference`, or last without a reference.
	pub fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), DomError> {
		self.ensure_element()?;
		child.detach_from_parent();
		let mut node = self.0.borrow_mut();
		let index = match reference {
			Some(reference) => node
				.children
				.iter()
				.position(|candidate| candidate.is_same_node(reference))
				.ok_or(DomError::NotAChild)?,
			None => node.children.len(),
		};
		node.children.insert(index, child.clone());
		child.0.borrow_mut().parent = Rc::downgrade(&self.0);
		Ok(())
	}

	/// Replaces `previous` with `next`.
	pub fn replace_child(&self, next: &Self, previous: &Self) -> Result<(), DomError> {
		self.position_of(previous)?;
		next.detach_from_parent();
		let index = self.position_of(previous)?;
		self.0.borrow_mut().children[index] = next.clone();
		next.0.borrow_mut().parent = Rc::downgrade(&self.0);
		previous.0.borrow_mut().parent = Weak::new();
		Ok(())
	}

	/// Removes `child`.
	pub fn remove_child(&self, child: &Self) -> Result<(), DomError> {
		let index = self.position_of(child)?;
		self.0.borrow_mut().children.remove(index);
		child.0.borrow_mut().parent = Weak::new();
		Ok(())
	}

	/// Returns the first child.
	pub fn first_child(&self) -> Option<Self> {
		self.0.borrow().children.first().cloned()
	}

	/// Returns the next sibling.
	pub fn next_sibling(&self) -> Option<Self> {
		let parent = self.parent_node()?;
		let parent = parent.0.borrow();
		let index = parent.children.iter().position(|candidate| candidate.is_same_node(self))?;
		parent.children.get(index + 1).cloned()
	}

	/// Returns the parent node.
	pub fn parent_node(&self) -> Option<Self> {
		self.0.borrow().parent.upgrade().map(Self)
	}

	/// Returns the children.
	pub fn child_nodes(&self) -> Vec<Self> {
		self.0.borrow().children.clone()
	}

	/// Returns the concatenated text of the node and its descendants.
	///
	/// Comments inside an element do not contribute.
	pub fn text_content(&self) -> String {
		let node = self.0.borrow();
		match &node.data {
			Data::Text(text) | Data::Comment(text) => text.clone(),
			Data::Element { .. } => node
				.children
				.iter()
				.filter(|child| !matches!(child.0.borrow().data, Data::Comment(_)))
				.map(Self::text_content)
				.collect(),
		}
	}

	/// Sets the data of a text or comment node, or replaces the children of an element with one text node.
	pub fn set_text(&self, text: &str) {
		let is_element = {
			let mut node = self.0.borrow_mut();
			match &mut node.data {
				Data::Text(content) | Data::Comment(content) => {
					text.clone_into(content);
					false
				}
				Data::Element { .. } => true,
			}
		};
		if is_element {
			for child in self.child_nodes() {
				child.0.borrow_mut().parent = Weak::new();
			}
			self.0.borrow_mut().children.clear();
			let child = Self::new(Data::Text(text.to_string()));
			child.0.borrow_mut().parent = Rc::downgrade(&self.0);
			self.0.borrow_mut().children.push(child);
		}
	}

	/// Returns true if both values refer to the same node.
	pub fn is_same_node(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	/// Installs, replaces or (with `None`) removes the listener for `event`.
	pub fn set_listener(&self, event: &str, handler: Option<EventHandler>) -> Result<(), DomError> {
		match &mut self.0.borrow_mut().data {
			Data::Element { listeners, .. } => {
				match handler {
					Some(handler) => {
						listeners.insert(event.to_string(), handler);
					}
					None => {
						listeners.remove(event);
					}
				}
				Ok(())
			}
			other => Err(DomError::NotAnElement(describe(other))),
		}
	}

	/// Returns true if a listener for `event` is installed.
	pub fn has_listener(&self, event: &str) -> bool {
		match &self.0.borrow().data {
			Data::Element { listeners, .. } => listeners.contains_key(event),
			_ => false,
		}
	}

	/// Fires `event` at this node and bubbles it up through the ancestors.
	pub fn dispatch(&self, event: &str) -> Result<(), DomError> {
		let mut path = vec![self.clone()];
		while let Some(parent) = path.last().and_then(Self::parent_node) {
			path.push(parent);
		}
		let payload = Event::new(event);
		for node in path {
			let handler = match &node.0.borrow().data {
				Data::Element { listeners, .. } => listeners.get(event).cloned(),
				_ => None,
			};
			if let Some(handler) = handler {
				handler.call(&payload);
			}
		}
		Ok(())
	}

	/// Serializes the node and its descendants.
	pub fn outer_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	/// Serializes the descendants.
	pub fn inner_html(&self) -> String {
		let mut out = String::new();
		for child in self.child_nodes() {
			child.write_html(&mut out);
		}
		out
	}

	fn write_html(&self, out: &mut String) {
		let node = self.0.borrow();
		match &node.data {
			Data::Text(text) => out.push_str(&escape_html(text)),
			Data::Comment(text) => {
				out.push_str("<!--");
				out.push_str(text);
				out.push_str("-->");
			}
			Data::Element { tag, attributes, .. } => {
				out.push('<');
				out.push_str(tag);
				for (name, value) in attributes {
					out.push(' ');
					out.push_str(name);
					out.push_str("=\"");
					out.push_str(&escape_html(value));
					out.push('"');
				}
				out.push('>');
				for child in &node.children {
					child.write_html(out);
				}
				out.push_str("</");
				out.push_str(tag);
				out.push('>');
			}
		}
	}

	fn ensure_element(&self) -> Result<(), DomError> {
		match &self.0.borrow().data {
			Data::Element { .. } => Ok(()),
			other => Err(DomError::NotAnElement(describe(other))),
		}
	}

	fn position_of(&self, child: &Self) -> Result<usize, DomError> {
		self.0
			.borrow()
			.children
			.iter()
			.position(|candidate| candidate.is_same_node(child))
			.ok_or(DomError::NotAChild)
	}

	fn detach_from_parent(&self) {
		if let Some(parent) = self.parent_node() {
			parent
				.0
				.borrow_mut()
				.children
				.retain(|candidate| !candidate.is_same_node(self));
		}
		self.0.borrow_mut().parent = Weak::new();
	}
}

fn describe(data: &Data) -> String {
	match data {
		Data::Element { tag, .. } => format!("<{tag}>"),
		Data::Text(_) => "#text".to_string(),
		Data::Comment(_) => "#comment".to_string(),
	}
}

impl fmt::Debug for DomNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&describe(&self.0.borrow().data))
	}
}

/// Factory of in-memory nodes.
#[derive(Debug, Clone, Default)]
pub struct Document {
	_private: (),
}

impl Document {
	/// Returns the document; always available off the web.
	pub fn current() -> Result<Self, DomError> {
		Ok(Self::default())
	}

	/// Creates an HTML element.
	pub fn create_element(&self, tag: &str) -> Result<DomNode, DomError> {
		self.create_element_ns(None, tag)
	}

	/// Creates an element in `namespace`.
	pub fn create_element_ns(&self, namespace: Option<&str>, tag: &str) -> Result<DomNode, DomError> {
		if tag.is_empty() || tag.chars().any(|ch| ch.is_whitespace() || ch == '<' || ch == '>') {
			return Err(DomError::InvalidTag(tag.to_string()));
		}
		Ok(DomNode::new(Data::Element {
			tag: tag.to_string(),
			namespace: namespace.map(str::to_string),
			attributes: Vec::new(),
			listeners: HashMap::new(),
		}))
	}

	/// Creates a text node.
	pub fn create_text_node(&self, text: &str) -> DomNode {
		DomNode::new(Data::Text(text.to_string()))
	}

	/// Creates a comment node.
	pub fn create_comment(&self, text: &str) -> DomNode {
		DomNode::new(Data::Comment(text.to_string()))
	}
}
