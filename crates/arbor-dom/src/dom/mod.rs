//! DOM surface used by the adapter
//!
//! On `wasm32` the types wrap `web_sys` nodes of the page document. On every
//! other target they are backed by a small in-memory DOM with the same API,
//! so the adapter, hydration and event flows run in native tests.

#[cfg(not(target_arch = "wasm32"))]
mod memory;
#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use memory::{Document, DomNode};
#[cfg(target_arch = "wasm32")]
pub use web::{Document, DomNode};

/// Namespace URI of SVG elements.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Coarse node classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
	/// An element
	Element,
	/// A text node
	Text,
	/// Comments and everything else
	Other,
}
