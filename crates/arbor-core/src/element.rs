//! Element factory
//!
//! Elements are immutable descriptions of the desired UI, produced fresh on
//! every render and consumed by the reconciler. [`create_element`] is the
//! single entry point; it normalizes children so the reconciler only ever sees
//! flat lists of [`Element`]s.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::context::ContextId;
use crate::error::Result;
use crate::hooks::Scope;
use crate::props::Props;

/// Result of a component render: exactly one child element, or nothing.
pub type RenderResult = Result<Option<Element>>;

/// Signature of a component render function.
pub type RenderFn = fn(&mut Scope<'_>, &Props) -> RenderResult;

/// A component: a named render function.
///
/// Component identity is the address of the render function, so two
/// `Component` values built from the same function always match during
/// reconciliation, whatever their name.
#[derive(Clone, Copy)]
pub struct Component {
	name: &'static str,
	render: RenderFn,
}

impl Component {
	/// Creates a component from a render function.
	pub const fn new(name: &'static str, render: RenderFn) -> Self {
		Self { name, render }
	}

	/// Returns the component name used in logs.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Returns the render function.
	pub fn render_fn(&self) -> RenderFn {
		self.render
	}

	/// Returns true if both components share the same render function.
	pub fn same_identity(&self, other: &Self) -> bool {
		std::ptr::fn_addr_eq(self.render, other.render)
	}

	/// Returns the identity key of this component.
	pub fn key(&self) -> ComponentKey {
		ComponentKey(self.render as usize)
	}
}

impl fmt::Debug for Component {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Component")
			.field("name", &self.name)
			.field("key", &self.key())
			.finish()
	}
}

/// Hashable identity of a component's render function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey(usize);

/// The first argument of [`create_element`].
#[derive(Debug, Clone)]
pub enum ElementType {
	/// A host tag such as `div`
	Tag(String),
	/// A fragment; groups children without a backend node
	Fragment,
	/// A component
	Component(Component),
	/// A context provider, see [`Context::provider`](crate::context::Context::provider)
	Provider(ProviderType),
}

/// Identifier of a context provider pseudo-component, carrying the value to publish.
#[derive(Clone)]
pub struct ProviderType {
	pub(crate) context: ContextId,
	pub(crate) value: Rc<dyn Any>,
}

impl fmt::Debug for ProviderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderType")
			.field("context", &self.context)
			.finish_non_exhaustive()
	}
}

impl From<&str> for ElementType {
	fn from(tag: &str) -> Self {
		if tag.is_empty() {
			Self::Fragment
		} else {
			Self::Tag(tag.to_string())
		}
	}
}

impl From<String> for ElementType {
	fn from(tag: String) -> Self {
		if tag.is_empty() {
			Self::Fragment
		} else {
			Self::Tag(tag)
		}
	}
}

impl From<Component> for ElementType {
	fn from(component: Component) -> Self {
		Self::Component(component)
	}
}

impl From<ProviderType> for ElementType {
	fn from(provider: ProviderType) -> Self {
		Self::Provider(provider)
	}
}

/// A component element.
#[derive(Debug, Clone)]
pub struct ComponentElement {
	/// The component to render
	pub component: Component,
	/// Props passed to the render function, children included
	pub props: Props,
}

/// A host element, backed by a real backend node.
#[derive(Debug, Clone)]
pub struct HostElement {
	/// Tag name
	pub tag: String,
	/// Attributes, listeners and children
	pub props: Props,
}

/// A context provider element.
#[derive(Clone)]
pub struct ProviderElement {
	/// Context the value is published for
	pub context: ContextId,
	/// Published value
	pub value: Rc<dyn Any>,
	/// Props carrying the children
	pub props: Props,
}

impl fmt::Debug for ProviderElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ProviderElement")
			.field("context", &self.context)
			.field("props", &self.props)
			.finish_non_exhaustive()
	}
}

/// Immutable description of the UI at one tree position.
#[derive(Debug, Clone)]
pub enum Element {
	/// Rendered by invoking a component
	Component(ComponentElement),
	/// Backed by a backend node with a tag
	Host(HostElement),
	/// Backed by a backend text node
	Text(String),
	/// Publishes a context value to its subtree
	Provider(ProviderElement),
	/// Groups children without a backend node of its own
	Fragment(Props),
}

/// The variant of an element or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
	/// See [`Element::Component`]
	Component,
	/// See [`Element::Host`]
	Host,
	/// See [`Element::Text`]
	Text,
	/// See [`Element::Provider`]
	Provider,
	/// See [`Element::Fragment`]
	Fragment,
}

impl fmt::Display for ElementKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Component => "component",
			Self::Host => "host",
			Self::Text => "text",
			Self::Provider => "provider",
			Self::Fragment => "fragment",
		};
		f.write_str(name)
	}
}

impl Element {
	/// Returns the element variant.
	pub fn kind(&self) -> ElementKind {
		match self {
			Self::Component(_) => ElementKind::Component,
			Self::Host(_) => ElementKind::Host,
			Self::Text(_) => ElementKind::Text,
			Self::Provider(_) => ElementKind::Provider,
			Self::Fragment(_) => ElementKind::Fragment,
		}
	}

	/// Returns the props of the element; text elements have none.
	pub fn props(&self) -> Option<&Props> {
		match self {
			Self::Component(element) => Some(&element.props),
			Self::Host(element) => Some(&element.props),
			Self::Provider(element) => Some(&element.props),
			Self::Fragment(props) => Some(props),
			Self::Text(_) => None,
		}
	}

	/// Returns the normalized children of the element.
	pub fn children(&self) -> &[Element] {
		self.props().map_or(&[], Props::children)
	}

	/// Consumes the element and returns its children.
	pub(crate) fn into_children(self) -> Vec<Element> {
		match self {
			Self::Component(mut element) => element.props.take_children(),
			Self::Host(mut element) => element.props.take_children(),
			Self::Provider(mut element) => element.props.take_children(),
			Self::Fragment(mut props) => props.take_children(),
			Self::Text(_) => Vec::new(),
		}
	}

	/// Returns the text payload of a text element.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			_ => None,
		}
	}
}

/// A child passed to [`create_element`] before normalization.
#[derive(Debug, Clone)]
pub enum Child {
	/// An element
	Element(Element),
	/// Text, becomes a text element
	Text(String),
	/// Nothing; dropped
	Empty,
	/// A list of children; flattened into the parent's children
	List(Vec<Child>),
}

impl From<Element> for Child {
	fn from(element: Element) -> Self {
		Self::Element(element)
	}
}

impl From<&str> for Child {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for Child {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl From<&String> for Child {
	fn from(text: &String) -> Self {
		Self::Text(text.clone())
	}
}

macro_rules! child_from_number {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for Child {
				fn from(number: $ty) -> Self {
					Self::Text(number.to_string())
				}
			}
		)*
	};
}

child_from_number!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: Into<Child>> From<Option<T>> for Child {
	fn from(child: Option<T>) -> Self {
		child.map_or(Self::Empty, Into::into)
	}
}

impl<T: Into<Child>> From<Vec<T>> for Child {
	fn from(children: Vec<T>) -> Self {
		Self::List(children.into_iter().map(Into::into).collect())
	}
}

/// Booleans render nothing; use `flag.then(|| child)` for a conditional child.
impl From<bool> for Child {
	fn from(_: bool) -> Self {
		Self::Empty
	}
}

impl From<()> for Child {
	fn from((): ()) -> Self {
		Self::Empty
	}
}

fn normalize_into(child: Child, out: &mut Vec<Element>) {
	match child {
		Child::Element(element) => out.push(element),
		Child::Text(text) => out.push(Element::Text(text)),
		Child::Empty => {}
		Child::List(children) => {
			for child in children {
				normalize_into(child, out);
			}
		}
	}
}

/// Normalizes children: lists are flattened, text becomes text elements and
/// empty children are dropped.
pub fn normalize_children<I>(children: I) -> Vec<Element>
where
	I: IntoIterator,
	I::Item: Into<Child>,
{
	let mut out = Vec::new();
	for child in children {
		normalize_into(child.into(), &mut out);
	}
	out
}

/// Builds an element.
///
/// - A [`Component`] produces a component element.
/// - A tag produces a host element; the empty tag produces a fragment.
/// - A [`ProviderType`] produces a provider element publishing its value.
///
/// # Example
///
/// ```ignore
/// use arbor_core::{Props, create_element};
///
/// let element = create_element("div", Props::new().set("id", "app"), ["hi"]);
/// ```
pub fn create_element<T, I>(ty: T, props: Props, children: I) -> Element
where
	T: Into<ElementType>,
	I: IntoIterator,
	I::Item: Into<Child>,
{
	let props = props.with_children(normalize_children(children));
	match ty.into() {
		ElementType::Tag(tag) => Element::Host(HostElement { tag, props }),
		ElementType::Fragment => Element::Fragment(props),
		ElementType::Component(component) => Element::Component(ComponentElement { component, props }),
		ElementType::Provider(provider) => Element::Provider(ProviderElement {
			context: provider.context,
			value: provider.value,
			props,
		}),
	}
}

/// Builds a text element.
pub fn text(content: impl Into<String>) -> Element {
	Element::Text(content.into())
}

/// An empty child list, for elements without children.
pub fn no_children() -> Vec<Child> {
	Vec::new()
}
