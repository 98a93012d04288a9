//! Arbor DOM - direct DOM backend
//!
//! Renders Arbor element trees into a DOM container and keeps them updated.
//! On `wasm32` the adapter drives the page document through `web-sys`; on
//! other targets it drives an in-memory DOM with the same API, which is what
//! the tests use.
//!
//! ## Architecture
//!
//! - [`dom`]: DOM abstraction layer (nodes, document, listeners)
//! - [`adapter`]: [`DomAdapter`], the [`arbor_core::HostAdapter`] implementation
//! - [`error`]: [`DomError`]
//! - `hydrate`: cursor adopting server-rendered nodes
//!
//! ## Example
//!
//! ```ignore
//! use arbor_dom::dom::Document;
//!
//! let document = Document::current()?;
//! let container = document.create_element("div")?;
//! let root = arbor_dom::render(create_element(App, Props::new(), no_children()), &container)?;
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod dom;
pub mod error;
mod hydrate;

pub use adapter::DomAdapter;
pub use dom::{Document, DomNode, NodeType};
pub use error::DomError;

use arbor_core::{Element, Result, Root, RootConfig};

/// Mounts `element` as the content of `container`.
///
/// The returned root keeps the tree alive; state updates are ignored once it
/// is dropped.
pub fn render(element: Element, container: &DomNode) -> Result<Root<DomAdapter>> {
	let adapter = DomAdapter::new(Document::current()?);
	let root = Root::with_config(adapter, container.clone(), RootConfig::new().name("dom"));
	root.render(element)?;
	Ok(root)
}

/// Mounts `element` over the existing (server-rendered) content of `container`.
///
/// Existing nodes are adopted in document order instead of being recreated;
/// listeners are attached to them. A node that does not match the element
/// at its position fails the mount with [`DomError::HydrationMismatch`].
/// Server markup with adjacent text nodes must have been rendered with
/// hydration markers enabled.
pub fn hydrate(element: Element, container: &DomNode) -> Result<Root<DomAdapter>> {
	let adapter = DomAdapter::hydrating(Document::current()?, container);
	let root = Root::with_config(adapter, container.clone(), RootConfig::new().name("dom-hydrate"));
	root.render(element)?;
	Ok(root)
}
