//! Property bags carried by elements and nodes
//!
//! A [`Props`] value holds the named properties of an element, the optional
//! [`NodeRef`] the element binds to its backend node, and the normalized
//! children produced by the element factory.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::attributes::{handler_key, kebab_case};
use crate::element::Element;
use crate::hooks::NodeRef;

/// A backend-agnostic event delivered to an [`EventHandler`].
///
/// Adapters attach whatever native event object they have as the payload,
/// e.g. the DOM adapter stores the `web_sys::Event` on wasm targets.
#[derive(Clone)]
pub struct Event {
	event_type: String,
	payload: Option<Rc<dyn Any>>,
}

impl Event {
	/// Creates an event of the given type without payload.
	pub fn new(event_type: impl Into<String>) -> Self {
		Self {
			event_type: event_type.into(),
			payload: None,
		}
	}

	/// Attaches a native payload to the event.
	pub fn with_payload<T: 'static>(mut self, payload: T) -> Self {
		self.payload = Some(Rc::new(payload));
		self
	}

	/// Returns the event type, e.g. `click`.
	pub fn event_type(&self) -> &str {
		&self.event_type
	}

	/// Returns the payload if it has type `T`.
	pub fn payload<T: 'static>(&self) -> Option<&T> {
		self.payload.as_ref()?.downcast_ref::<T>()
	}
}

impl fmt::Debug for Event {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Event")
			.field("event_type", &self.event_type)
			.field("has_payload", &self.payload.is_some())
			.finish()
	}
}

/// A shared event callback.
///
/// Two handlers are equal only if they are clones of the same callback.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
	/// Wraps a closure as an event handler.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		Self(Rc::new(f))
	}

	/// Invokes the handler.
	pub fn call(&self, event: &Event) {
		(self.0)(event);
	}

	/// Returns true if both handlers wrap the same callback.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl PartialEq for EventHandler {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for EventHandler {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("EventHandler(..)")
	}
}

/// An ordered set of style declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style(Vec<(String, String)>);

impl Style {
	/// Creates an empty style.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a declaration, replacing an earlier one with the same property.
	pub fn set(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
		let property = property.into();
		let value = value.into();
		match self.0.iter_mut().find(|(name, _)| *name == property) {
			Some(entry) => entry.1 = value,
			None => self.0.push((property, value)),
		}
		self
	}

	/// Iterates over the declarations in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
	}

	/// Returns true if no declaration was set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Serializes the declarations to CSS text.
	///
	/// Camel-case property names are converted to kebab case, so
	/// `backgroundColor` becomes `background-color`.
	pub fn to_css(&self) -> String {
		self.0
			.iter()
			.map(|(name, value)| format!("{}: {};", kebab_case(name), value))
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// A single property value.
#[derive(Clone)]
pub enum PropValue {
	/// Text value
	Str(String),
	/// Numeric value
	Number(f64),
	/// Boolean value; `false` means "attribute absent" for host backends
	Bool(bool),
	/// Style object
	Style(Style),
	/// Event listener
	Handler(EventHandler),
	/// Arbitrary application value, compared by identity
	Any(Rc<dyn Any>),
}

impl PropValue {
	/// Returns the text value, if any.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(value) => Some(value),
			_ => None,
		}
	}

	/// Returns the numeric value, if any.
	pub fn as_number(&self) -> Option<f64> {
		match self {
			Self::Number(value) => Some(*value),
			_ => None,
		}
	}

	/// Returns the boolean value, if any.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(value) => Some(*value),
			_ => None,
		}
	}

	/// Returns the style object, if any.
	pub fn as_style(&self) -> Option<&Style> {
		match self {
			Self::Style(style) => Some(style),
			_ => None,
		}
	}

	/// Returns the event handler, if any.
	pub fn as_handler(&self) -> Option<&EventHandler> {
		match self {
			Self::Handler(handler) => Some(handler),
			_ => None,
		}
	}

	/// Returns the application value if it has type `T`.
	pub fn downcast<T: 'static>(&self) -> Option<Rc<T>> {
		match self {
			Self::Any(value) => Rc::clone(value).downcast::<T>().ok(),
			_ => None,
		}
	}
}

impl PartialEq for PropValue {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Str(a), Self::Str(b)) => a == b,
			(Self::Number(a), Self::Number(b)) => a == b,
			(Self::Bool(a), Self::Bool(b)) => a == b,
			(Self::Style(a), Self::Style(b)) => a == b,
			(Self::Handler(a), Self::Handler(b)) => a == b,
			(Self::Any(a), Self::Any(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl fmt::Debug for PropValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
			Self::Number(value) => f.debug_tuple("Number").field(value).finish(),
			Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
			Self::Style(style) => f.debug_tuple("Style").field(style).finish(),
			Self::Handler(handler) => handler.fmt(f),
			Self::Any(_) => f.write_str("Any(..)"),
		}
	}
}

impl From<&str> for PropValue {
	fn from(value: &str) -> Self {
		Self::Str(value.to_string())
	}
}

impl From<String> for PropValue {
	fn from(value: String) -> Self {
		Self::Str(value)
	}
}

impl From<&String> for PropValue {
	fn from(value: &String) -> Self {
		Self::Str(value.clone())
	}
}

impl From<bool> for PropValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl From<f64> for PropValue {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<f32> for PropValue {
	fn from(value: f32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i32> for PropValue {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<u32> for PropValue {
	fn from(value: u32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<Style> for PropValue {
	fn from(value: Style) -> Self {
		Self::Style(value)
	}
}

impl From<EventHandler> for PropValue {
	fn from(value: EventHandler) -> Self {
		Self::Handler(value)
	}
}

/// The property bag of an element or node.
///
/// Keys keep the order they were first set in; setting a key again replaces
/// the value in place.
#[derive(Debug, Clone, Default)]
pub struct Props {
	values: IndexMap<String, PropValue>,
	node_ref: Option<NodeRef>,
	children: Vec<Element>,
}

impl Props {
	/// Creates an empty property bag.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a property and returns the bag.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
		self.values.insert(key.into(), value.into());
		self
	}

	/// Sets an arbitrary application value, compared by identity.
	pub fn any<T: 'static>(self, key: impl Into<String>, value: T) -> Self {
		self.set(key, PropValue::Any(Rc::new(value)))
	}

	/// Registers an event handler under `on<Event>`, e.g. `click` is stored as `onClick`.
	pub fn on<F>(self, event: &str, handler: F) -> Self
	where
		F: Fn(&Event) + 'static,
	{
		let key = handler_key(event);
		self.set(key, EventHandler::new(handler))
	}

	/// Sets the `style` property.
	pub fn style(self, style: Style) -> Self {
		self.set("style", style)
	}

	/// Binds a ref to the backend node of the element carrying these props.
	pub fn with_ref(mut self, node_ref: &NodeRef) -> Self {
		self.node_ref = Some(node_ref.clone());
		self
	}

	/// Inserts a property, returning the previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
		self.values.insert(key.into(), value.into())
	}

	/// Removes a property, returning its value.
	pub fn remove(&mut self, key: &str) -> Option<PropValue> {
		self.values.shift_remove(key)
	}

	/// Returns a property.
	pub fn get(&self, key: &str) -> Option<&PropValue> {
		self.values.get(key)
	}

	/// Returns a text property.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(PropValue::as_str)
	}

	/// Returns a numeric property.
	pub fn get_number(&self, key: &str) -> Option<f64> {
		self.get(key).and_then(PropValue::as_number)
	}

	/// Returns a boolean property.
	pub fn get_bool(&self, key: &str) -> Option<bool> {
		self.get(key).and_then(PropValue::as_bool)
	}

	/// Returns an application value of type `T`.
	pub fn get_any<T: 'static>(&self, key: &str) -> Option<Rc<T>> {
		self.get(key).and_then(PropValue::downcast::<T>)
	}

	/// Returns true if the property is set.
	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	/// Iterates over the properties in the order they were first set.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
		self.values.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Returns the number of properties (children and ref excluded).
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if no property is set (children and ref excluded).
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the ref bound by these props.
	pub fn node_ref(&self) -> Option<&NodeRef> {
		self.node_ref.as_ref()
	}

	/// Returns the normalized children.
	pub fn children(&self) -> &[Element] {
		&self.children
	}

	/// Replaces the children.
	pub fn with_children(mut self, children: Vec<Element>) -> Self {
		self.children = children;
		self
	}

	pub(crate) fn take_children(&mut self) -> Vec<Element> {
		std::mem::take(&mut self.children)
	}

	/// Returns a copy of the properties and ref without the children.
	pub fn without_children(&self) -> Self {
		Self {
			values: self.values.clone(),
			node_ref: self.node_ref.clone(),
			children: Vec::new(),
		}
	}

	/// Lists the keys whose value differs between `self` and `next`.
	///
	/// The second tuple element is the new value, or `None` if the key was
	/// removed. Keys are reported in key order, each at most once.
	///
	/// A handler replaced by another handler is not a change: the element
	/// keeps listening to the same event. See [`Props::rebound_handlers`].
	pub fn changes<'a>(&'a self, next: &'a Self) -> Vec<(&'a str, Option<&'a PropValue>)> {
		let mut changes = Vec::new();
		for (key, previous) in &self.values {
			match next.values.get(key) {
				Some(value) if value == previous => {}
				Some(PropValue::Handler(_)) if matches!(previous, PropValue::Handler(_)) => {}
				Some(value) => changes.push((key.as_str(), Some(value))),
				None => changes.push((key.as_str(), None)),
			}
		}
		for (key, value) in &next.values {
			if !self.values.contains_key(key) {
				changes.push((key.as_str(), Some(value)));
			}
		}
		changes.sort_by(|a, b| a.0.cmp(b.0));
		changes
	}

	/// Lists the handler keys present in both bags whose handler was replaced.
	pub fn rebound_handlers<'a>(&'a self, next: &'a Self) -> Vec<(&'a str, &'a EventHandler)> {
		next.values
			.iter()
			.filter_map(|(key, value)| match (self.values.get(key), value) {
				(Some(PropValue::Handler(previous)), PropValue::Handler(handler)) if previous != handler => {
					Some((key.as_str(), handler))
				}
				_ => None,
			})
			.collect()
	}
}
