//! Arbor SSR - server-side rendering
//!
//! Mounts an element tree against a string-building host adapter and
//! serializes the result. Props map to attributes with the same rules as the
//! DOM backend; listeners are dropped; effects do not run unless asked to.
//!
//! ## Architecture
//!
//! - [`adapter`]: [`SsrAdapter`], the [`arbor_core::HostAdapter`] implementation
//! - [`node`]: the serializable server tree ([`SsrNode`], [`SsrTree`])
//!
//! ## Example
//!
//! ```ignore
//! let html = arbor_ssr::render_to_string(create_element("div", Props::new(), ["hi"]))?;
//! assert_eq!(html, "<div>hi</div>");
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod node;

pub use adapter::{SsrAdapter, SsrError};
pub use node::{SsrHandle, SsrNode, SsrTree};

use arbor_core::{Element, Props, Result, Root, RootConfig};

const CONTAINER_TAG: &str = "#container";

/// Options for server rendering.
#[derive(Debug, Clone)]
pub struct SsrOptions {
	/// Whether to prefix the markup with `<!DOCTYPE html>`.
	pub doctype: bool,
	/// Whether to separate adjacent text nodes with `<!-- -->` so hydration
	/// sees them as distinct nodes. Off by default; markup meant to be
	/// hydrated should turn it on.
	pub hydration_markers: bool,
	/// Whether effects run after the render pass.
	pub run_effects: bool,
}

impl Default for SsrOptions {
	fn default() -> Self {
		Self {
			doctype: false,
			hydration_markers: false,
			run_effects: false,
		}
	}
}

impl SsrOptions {
	/// Creates new default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Enables the doctype prefix.
	pub fn doctype(mut self, doctype: bool) -> Self {
		self.doctype = doctype;
		self
	}

	/// Enables the text separators hydration relies on.
	pub fn hydration_markers(mut self, markers: bool) -> Self {
		self.hydration_markers = markers;
		self
	}

	/// Runs effects after rendering, as a client would.
	pub fn run_effects(mut self, run: bool) -> Self {
		self.run_effects = run;
		self
	}
}

/// Renders `element` to markup with default options.
pub fn render_to_string(element: Element) -> Result<String> {
	render_to_string_with(element, &SsrOptions::default())
}

/// Renders `element` to markup.
pub fn render_to_string_with(element: Element, options: &SsrOptions) -> Result<String> {
	let tree = render_to_tree(element, options)?;
	let mut html = String::new();
	if options.doctype {
		html.push_str("<!DOCTYPE html>");
	}
	html.push_str(&tree.to_markup(options.hydration_markers));
	Ok(html)
}

/// Renders `element` to a server tree.
pub fn render_to_tree(element: Element, options: &SsrOptions) -> Result<SsrTree> {
	let container = SsrHandle::element(CONTAINER_TAG, &Props::new());
	let config = RootConfig::new().name("ssr").flush_effects(options.run_effects);
	let root = Root::with_config(SsrAdapter::new(), container.clone(), config);
	root.render(element)?;
	let created = root.with_adapter(SsrAdapter::created);
	tracing::debug!(created, "server render finished");
	Ok(SsrTree::new(container.children()))
}
