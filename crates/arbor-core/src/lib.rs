//! Arbor Core - component model and reconciliation engine
//!
//! Backend-independent half of the Arbor rendering engine. Applications
//! describe their UI as [`Element`] trees produced by component render
//! functions; a [`Root`] keeps the persistent node tree mirroring the last
//! render and brings it (and the backend, through a [`HostAdapter`]) in line
//! with every new element tree.
//!
//! ## Architecture
//!
//! - [`element`]: element factory ([`create_element`]) and child normalization
//! - [`props`]: property bags, event handlers and style objects
//! - [`tree`]: generational node arena
//! - [`hooks`]: the render [`Scope`] and its hook primitives
//! - [`context`]: context identities and providers
//! - [`adapter`]: the [`HostAdapter`] backend interface
//! - [`root`]: render roots, update scheduling and effect flushing
//! - [`attributes`]: property to attribute mapping shared by markup backends
//! - `testing` (feature `testing`): a recording adapter for tests
//!
//! ## Example
//!
//! ```ignore
//! use arbor_core::prelude::*;
//!
//! fn counter(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
//!     let (count, set_count) = scope.use_state(|| 0)?;
//!     Ok(Some(create_element(
//!         "button",
//!         Props::new().on("click", move |_| set_count.update(|n| n + 1)),
//!         ["Clicked ".into(), Child::from(count), " times!".into()],
//!     )))
//! }
//!
//! const COUNTER: Component = Component::new("Counter", counter);
//!
//! let root = Root::new(adapter, container);
//! root.render(create_element(COUNTER, Props::new(), no_children()))?;
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod attributes;
pub mod context;
pub mod element;
pub mod error;
pub mod hooks;
pub mod props;
mod reconciler;
#[cfg(debug_assertions)]
mod registry;
pub mod root;
mod scheduler;
pub mod tree;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use adapter::HostAdapter;
pub use context::{Context, ContextId, create_context};
pub use element::{
	Child, Component, ComponentElement, ComponentKey, Element, ElementKind, ElementType, HostElement,
	ProviderElement, ProviderType, RenderFn, RenderResult, create_element, no_children, normalize_children,
	text,
};
pub use error::{Error, Result};
pub use hooks::{Cleanup, HookKind, NodeRef, Scope, StateSetter, UpdateHandle};
pub use props::{Event, EventHandler, PropValue, Props, Style};
pub use root::{Root, RootConfig};
pub use scheduler::Task;
pub use tree::{Node, NodeId, NodeKind, NodeTree};

/// Commonly used items.
pub mod prelude {
	pub use crate::{
		Child, Cleanup, Component, Context, Element, Event, HostAdapter, NodeRef, Props, RenderResult, Root,
		Scope, Style, create_context, create_element, no_children, text,
	};
}
