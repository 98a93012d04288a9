//! Context system
//!
//! A [`Context`] is an opaque identity. Provider elements publish a value for
//! it while their subtree is reconciled; components below read it with
//! [`Scope::use_context`](crate::hooks::Scope::use_context).
//!
//! Bindings live in a [`ContextMap`] owned by a single scheduler task. When a
//! task starts at a node deep in the tree, the map is seeded from the provider
//! ancestors of that node, so a component re-rendered through its own state
//! setter still sees the values its providers published. Nothing is carried
//! over from one task to the next.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::element::{Child, Element, ElementType, ProviderType, create_element};
use crate::props::Props;
use crate::tree::{NodeId, NodeKind, NodeTree};

/// Unique identity of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextId(u64);

impl ContextId {
	fn next() -> Self {
		static COUNTER: AtomicU64 = AtomicU64::new(1);
		Self(COUNTER.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for ContextId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "context #{}", self.0)
	}
}

/// A typed context handle.
///
/// Handles are cheap to copy; every copy refers to the same context.
pub struct Context<T> {
	id: ContextId,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Context<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Context<T> {}

impl<T> fmt::Debug for Context<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Context").field("id", &self.id).finish()
	}
}

impl<T: 'static> Default for Context<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: 'static> Context<T> {
	/// Creates a new context with a fresh identity.
	pub fn new() -> Self {
		Self {
			id: ContextId::next(),
			_marker: PhantomData,
		}
	}

	/// Returns the identity of this context.
	pub fn id(&self) -> ContextId {
		self.id
	}

	/// Returns the provider pseudo-component publishing `value`.
	///
	/// Pass the result to [`create_element`] like any other element type.
	pub fn provider(&self, value: T) -> ProviderType {
		ProviderType {
			context: self.id,
			value: Rc::new(value),
		}
	}

	/// Shorthand for a provider element publishing `value` to `children`.
	pub fn provide<I>(&self, value: T, children: I) -> Element
	where
		I: IntoIterator,
		I::Item: Into<Child>,
	{
		create_element(ElementType::from(self.provider(value)), Props::new(), children)
	}
}

/// Creates a new context.
///
/// # Example
///
/// ```ignore
/// use arbor_core::{create_context, create_element, Props};
///
/// let theme = create_context::<String>();
/// let tree = theme.provide("dark".to_string(), [create_element(ThemedButton, Props::new(), ["ok"])]);
/// ```
pub fn create_context<T: 'static>() -> Context<T> {
	Context::new()
}

/// Context bindings active while one scheduler task runs.
#[derive(Default)]
pub(crate) struct ContextMap {
	values: HashMap<ContextId, Rc<dyn Any>>,
}

impl ContextMap {
	/// Seeds a map with the values published by the provider ancestors of `node`.
	pub(crate) fn inherited<N>(tree: &NodeTree<N>, node: NodeId) -> Self {
		let mut map = Self::default();
		let mut current = tree.parent_of(node);
		while let Some(id) = current {
			if let Some(NodeKind::Provider(provider)) = tree.get(id).map(|node| node.kind()) {
				map.values
					.entry(provider.context)
					.or_insert_with(|| Rc::clone(&provider.value));
			}
			current = tree.parent_of(id);
		}
		map
	}

	/// Publishes a value, returning the binding it shadows.
	pub(crate) fn publish(&mut self, context: ContextId, value: Rc<dyn Any>) -> Option<Rc<dyn Any>> {
		self.values.insert(context, value)
	}

	/// Restores a binding recorded by [`ContextMap::publish`].
	pub(crate) fn restore(&mut self, context: ContextId, previous: Option<Rc<dyn Any>>) {
		match previous {
			Some(value) => {
				self.values.insert(context, value);
			}
			None => {
				self.values.remove(&context);
			}
		}
	}

	/// Drops the binding for `context` if it is `value`.
	pub(crate) fn release(&mut self, context: ContextId, value: &Rc<dyn Any>) {
		if self
			.values
			.get(&context)
			.is_some_and(|current| Rc::ptr_eq(current, value))
		{
			self.values.remove(&context);
		}
	}

	pub(crate) fn get(&self, context: ContextId) -> Option<&Rc<dyn Any>> {
		self.values.get(&context)
	}
}

impl fmt::Debug for ContextMap {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.values.keys()).finish()
	}
}
