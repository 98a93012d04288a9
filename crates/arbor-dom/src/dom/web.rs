//! `web_sys` backed DOM

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use arbor_core::{Event, EventHandler};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;

use super::NodeType;
use crate::error::DomError;

/// An installed JS listener and the handler it currently forwards to.
struct Listener {
	closure: Closure<dyn FnMut(web_sys::Event)>,
	handler: Rc<RefCell<EventHandler>>,
}

impl From<JsValue> for DomError {
	fn from(value: JsValue) -> Self {
		match value.dyn_ref::<js_sys::Error>() {
			Some(error) => Self::Js(String::from(error.message())),
			None => Self::Js(format!("{value:?}")),
		}
	}
}

/// A node of the page document.
///
/// Listeners installed through [`DomNode::set_listener`] are owned by the
/// wrapper (and its clones), so keep using the wrapper the adapter created
/// or claimed.
#[derive(Clone)]
pub struct DomNode {
	node: web_sys::Node,
	listeners: Rc<RefCell<HashMap<String, Listener>>>,
}

impl DomNode {
	/// Wraps a `web_sys` node.
	pub fn from_node(node: web_sys::Node) -> Self {
		Self {
			node,
			listeners: Rc::new(RefCell::new(HashMap::new())),
		}
	}

	/// Returns the wrapped node.
	pub fn as_node(&self) -> &web_sys::Node {
		&self.node
	}

	fn element(&self) -> Result<&web_sys::Element, DomError> {
		self.node
			.dyn_ref::<web_sys::Element>()
			.ok_or_else(|| DomError::NotAnElement(self.node.node_name()))
	}

	/// Returns the node classification.
	pub fn node_type(&self) -> NodeType {
		match self.node.node_type() {
			web_sys::Node::ELEMENT_NODE => NodeType::Element,
			web_sys::Node::TEXT_NODE => NodeType::Text,
			_ => NodeType::Other,
		}
	}

	/// Returns the local name of an element.
	pub fn tag_name(&self) -> Option<String> {
		self.node.dyn_ref::<web_sys::Element>().map(web_sys::Element::local_name)
	}

	/// Returns the namespace URI of an element.
	pub fn namespace(&self) -> Option<String> {
		self.node.dyn_ref::<web_sys::Element>()?.namespace_uri()
	}

	/// Returns the value of an attribute.
	pub fn attribute(&self, name: &str) -> Option<String> {
		self.node.dyn_ref::<web_sys::Element>()?.get_attribute(name)
	}

	/// Sets an attribute.
	pub fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
		Ok(self.element()?.set_attribute(name, value)?)
	}

	/// Removes an attribute.
	pub fn remove_attribute(&self, name: &str) -> Result<(), DomError> {
		Ok(self.element()?.remove_attribute(name)?)
	}

	/// Appends `child`, moving it out of its current parent first.
	pub fn append_child(&self, child: &Self) -> Result<(), DomError> {
		self.node.append_child(&child.node)?;
		Ok(())
	}

	/// Inserts `child` before `reference`, or last without a reference.
	pub fn insert_before(&self, child: &Self, reference: Option<&Self>) -> Result<(), DomError> {
		self.node
			.insert_before(&child.node, reference.map(|reference| &reference.node))?;
		Ok(())
	}

	/// Replaces `previous` with `next`.
	pub fn replace_child(&self, next: &Self, previous: &Self) -> Result<(), DomError> {
		if !self.is_parent_of(previous) {
			return Err(DomError::NotAChild);
		}
		self.node.replace_child(&next.node, &previous.node)?;
		Ok(())
	}

	/// Removes `child`.
	pub fn remove_child(&self, child: &Self) -> Result<(), DomError> {
		if !self.is_parent_of(child) {
			return Err(DomError::NotAChild);
		}
		self.node.remove_child(&child.node)?;
		Ok(())
	}

	fn is_parent_of(&self, child: &Self) -> bool {
		child
			.node
			.parent_node()
			.is_some_and(|parent| parent.is_same_node(Some(&self.node)))
	}

	/// Returns the first child.
	pub fn first_child(&self) -> Option<Self> {
		self.node.first_child().map(Self::from_node)
	}

	/// Returns the next sibling.
	pub fn next_sibling(&self) -> Option<Self> {
		self.node.next_sibling().map(Self::from_node)
	}

	/// Returns the parent node.
	pub fn parent_node(&self) -> Option<Self> {
		self.node.parent_node().map(Self::from_node)
	}

	/// Returns the children.
	pub fn child_nodes(&self) -> Vec<Self> {
		let mut children = Vec::new();
		let mut next = self.node.first_child();
		while let Some(node) = next {
			next = node.next_sibling();
			children.push(Self::from_node(node));
		}
		children
	}

	/// Returns the concatenated text of the node and its descendants.
	pub fn text_content(&self) -> String {
		self.node.text_content().unwrap_or_default()
	}

	/// Sets the data of a character node, or replaces the children of an element with one text node.
	pub fn set_text(&self, text: &str) {
		self.node.set_text_content(Some(text));
	}

	/// Returns true if both values refer to the same node.
	pub fn is_same_node(&self, other: &Self) -> bool {
		self.node.is_same_node(Some(&other.node))
	}

	/// Installs, replaces or (with `None`) removes the listener for `event`.
	///
	/// Replacing a handler keeps the installed JS listener and only swaps
	/// the handler it forwards to.
	pub fn set_listener(&self, event: &str, handler: Option<EventHandler>) -> Result<(), DomError> {
		let target: &web_sys::EventTarget = self.node.as_ref();
		let mut listeners = self.listeners.borrow_mut();
		match handler {
			Some(handler) => {
				if let Some(listener) = listeners.get(event) {
					*listener.handler.borrow_mut() = handler;
					return Ok(());
				}
				let current = Rc::new(RefCell::new(handler));
				let forward = current.clone();
				let closure = Closure::wrap(Box::new(move |native: web_sys::Event| {
					let event = Event::new(native.type_()).with_payload(native);
					let handler = forward.borrow().clone();
					handler.call(&event);
				}) as Box<dyn FnMut(_)>);
				target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
				listeners.insert(
					event.to_string(),
					Listener {
						closure,
						handler: current,
					},
				);
			}
			None => {
				if let Some(previous) = listeners.remove(event) {
					target.remove_event_listener_with_callback(event, previous.closure.as_ref().unchecked_ref())?;
				}
			}
		}
		Ok(())
	}

	/// Returns true if a listener for `event` was installed through this wrapper.
	pub fn has_listener(&self, event: &str) -> bool {
		self.listeners.borrow().contains_key(event)
	}

	/// Fires a bubbling `event` at this node.
	pub fn dispatch(&self, event: &str) -> Result<(), DomError> {
		let init = web_sys::EventInit::new();
		init.set_bubbles(true);
		let event = web_sys::Event::new_with_event_init_dict(event, &init)?;
		let target: &web_sys::EventTarget = self.node.as_ref();
		target.dispatch_event(&event)?;
		Ok(())
	}

	/// Serializes the node and its descendants.
	pub fn outer_html(&self) -> String {
		match self.node.dyn_ref::<web_sys::Element>() {
			Some(element) => element.outer_html(),
			None => self.text_content(),
		}
	}

	/// Serializes the descendants.
	pub fn inner_html(&self) -> String {
		match self.node.dyn_ref::<web_sys::Element>() {
			Some(element) => element.inner_html(),
			None => String::new(),
		}
	}
}

impl fmt::Debug for DomNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.node.node_name())
	}
}

/// The page document.
#[derive(Debug, Clone)]
pub struct Document(web_sys::Document);

impl Document {
	/// Returns the document of the current window.
	pub fn current() -> Result<Self, DomError> {
		web_sys::window()
			.and_then(|window| window.document())
			.map(Self)
			.ok_or(DomError::NoDocument)
	}

	/// Creates an HTML element.
	pub fn create_element(&self, tag: &str) -> Result<DomNode, DomError> {
		let element = self.0.create_element(tag)?;
		Ok(DomNode::from_node(element.into()))
	}

	/// Creates an element in `namespace`.
	pub fn create_element_ns(&self, namespace: Option<&str>, tag: &str) -> Result<DomNode, DomError> {
		let element = self.0.create_element_ns(namespace, tag)?;
		Ok(DomNode::from_node(element.into()))
	}

	/// Creates a text node.
	pub fn create_text_node(&self, text: &str) -> DomNode {
		DomNode::from_node(self.0.create_text_node(text).into())
	}

	/// Creates a comment node.
	pub fn create_comment(&self, text: &str) -> DomNode {
		DomNode::from_node(self.0.create_comment(text).into())
	}
}
