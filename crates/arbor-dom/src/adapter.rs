//! Direct DOM host adapter

use arbor_core::attributes::{attribute_name, attribute_value, event_name};
use arbor_core::{HostAdapter, HostElement, PropValue, Props, Result};

use crate::dom::{Document, DomNode, SVG_NAMESPACE};
use crate::error::DomError;
use crate::hydrate::{Hydration, describe};

/// Host adapter creating and patching real DOM nodes.
///
/// - `on<Event>` props are bound as listeners, everything else maps to
///   attributes through [`arbor_core::attributes`].
/// - `svg` elements and their descendants (up to a `foreignObject`) are
///   created in the SVG namespace.
/// - In hydration mode, creation claims the existing nodes of the container
///   instead; the mode ends when the first update pass commits.
pub struct DomAdapter {
	document: Document,
	hydration: Option<Hydration>,
}

impl DomAdapter {
	/// Creates an adapter building new nodes.
	pub fn new(document: Document) -> Self {
		Self {
			document,
			hydration: None,
		}
	}

	/// Creates an adapter adopting the existing children of `container`.
	pub fn hydrating(document: Document, container: &DomNode) -> Self {
		Self {
			document,
			hydration: Some(Hydration::new(container)),
		}
	}

	/// Returns true until the first update pass committed in hydration mode.
	pub fn is_hydrating(&self) -> bool {
		self.hydration.is_some()
	}

	/// Returns the document nodes are created in.
	pub fn document(&self) -> &Document {
		&self.document
	}

	fn namespace_for(parent: &DomNode, tag: &str) -> Option<&'static str> {
		let in_svg = parent.namespace().as_deref() == Some(SVG_NAMESPACE)
			&& parent.tag_name().as_deref() != Some("foreignObject");
		(tag == "svg" || in_svg).then_some(SVG_NAMESPACE)
	}
}

fn apply_props(node: &DomNode, previous: &Props, next: &Props) -> std::result::Result<(), DomError> {
	for (key, value) in previous.changes(next) {
		if let Some(event) = event_name(key) {
			node.set_listener(&event, value.and_then(PropValue::as_handler).cloned())?;
			continue;
		}
		let name = attribute_name(key);
		match value.and_then(attribute_value) {
			Some(text) => node.set_attribute(&name, &text)?,
			None => node.remove_attribute(&name)?,
		}
	}
	rebind(node, previous, next)
}

fn rebind(node: &DomNode, previous: &Props, next: &Props) -> std::result::Result<(), DomError> {
	for (key, handler) in previous.rebound_handlers(next) {
		if let Some(event) = event_name(key) {
			node.set_listener(&event, Some(handler.clone()))?;
		}
	}
	Ok(())
}

impl HostAdapter for DomAdapter {
	type Native = DomNode;

	fn create_host_node(&mut self, parent: &DomNode, element: &HostElement) -> Result<DomNode> {
		let node = match self.hydration.as_mut() {
			Some(hydration) => hydration.claim_element(&element.tag)?,
			None => match Self::namespace_for(parent, &element.tag) {
				Some(namespace) => self.document.create_element_ns(Some(namespace), &element.tag)?,
				None => self.document.create_element(&element.tag)?,
			},
		};
		apply_props(&node, &Props::new(), &element.props)?;
		Ok(node)
	}

	fn update_host_node(&mut self, native: &DomNode, previous: &Props, next: &Props) -> Result<()> {
		Ok(apply_props(native, previous, next)?)
	}

	fn rebind_handlers(&mut self, native: &DomNode, next: &Props) -> Result<()> {
		for (key, value) in next.iter() {
			if let (Some(event), Some(handler)) = (event_name(key), value.as_handler()) {
				native.set_listener(&event, Some(handler.clone()))?;
			}
		}
		Ok(())
	}

	fn create_text_node(&mut self, text: &str) -> Result<DomNode> {
		match self.hydration.as_mut() {
			// Empty text leaves no node in server markup.
			Some(hydration) if !text.is_empty() => Ok(hydration.claim_text(text)?),
			_ => Ok(self.document.create_text_node(text)),
		}
	}

	fn update_text_node(&mut self, native: &DomNode, text: &str) -> Result<()> {
		native.set_text(text);
		Ok(())
	}

	fn append_child(&mut self, parent: &DomNode, child: &DomNode) -> Result<()> {
		match self.hydration.as_mut() {
			Some(_) if child.parent_node().is_some() => Ok(()),
			Some(hydration) => Ok(hydration.place(parent, child)?),
			None => Ok(parent.append_child(child)?),
		}
	}

	fn replace_child(&mut self, parent: &DomNode, previous: &DomNode, next: &DomNode) -> Result<()> {
		Ok(parent.replace_child(next, previous)?)
	}

	fn detach(&mut self, parent: &DomNode, child: &DomNode) -> Result<()> {
		Ok(parent.remove_child(child)?)
	}

	fn commit(&mut self) -> Result<()> {
		if let Some(hydration) = self.hydration.take()
			&& let Some(leftover) = hydration.finish()
		{
			tracing::warn!(node = %describe(&leftover), "container holds nodes the hydrated tree does not use");
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use arbor_core::{EventHandler, Style};
	use rstest::{fixture, rstest};
	use std::cell::Cell;
	use std::rc::Rc;

	#[fixture]
	fn document() -> Document {
		Document::current().unwrap()
	}

	fn host(tag: &str, props: Props) -> HostElement {
		HostElement {
			tag: tag.to_string(),
			props,
		}
	}

	#[rstest]
	fn test_props_map_to_attributes_and_listeners(document: Document) {
		let container = document.create_element("div").unwrap();
		let mut adapter = DomAdapter::new(document);
		let props = Props::new()
			.set("className", "primary")
			.set("ariaLabel", "Save")
			.set("disabled", false)
			.style(Style::new().set("fontSize", "12px"))
			.on("click", |_| {});

		let button = adapter.create_host_node(&container, &host("button", props)).unwrap();

		assert_eq!(button.attribute("class").as_deref(), Some("primary"));
		assert_eq!(button.attribute("aria-label").as_deref(), Some("Save"));
		assert_eq!(button.attribute("style").as_deref(), Some("font-size: 12px;"));
		assert!(button.attribute("disabled").is_none());
		assert!(button.attribute("on-click").is_none());
		assert!(button.has_listener("click"));
	}

	#[rstest]
	fn test_update_removes_attributes_and_listeners(document: Document) {
		let container = document.create_element("div").unwrap();
		let mut adapter = DomAdapter::new(document);
		let handler = EventHandler::new(|_| {});
		let previous = Props::new().set("title", "a").set("hidden", true).set("onInput", handler);
		let next = Props::new().set("title", "b");
		let input = adapter.create_host_node(&container, &host("input", previous.clone())).unwrap();

		adapter.update_host_node(&input, &previous, &next).unwrap();

		assert_eq!(input.attribute("title").as_deref(), Some("b"));
		assert!(input.attribute("hidden").is_none());
		assert!(!input.has_listener("input"));
	}

	#[rstest]
	fn test_rebound_listener_calls_fresh_handler(document: Document) {
		let container = document.create_element("div").unwrap();
		let mut adapter = DomAdapter::new(document);
		let calls = Rc::new(Cell::new(0));
		let stale = Props::new().on("click", |_| {});
		let fresh = {
			let calls = calls.clone();
			Props::new().on("click", move |_| calls.set(calls.get() + 1))
		};
		let button = adapter.create_host_node(&container, &host("button", stale)).unwrap();

		adapter.rebind_handlers(&button, &fresh).unwrap();
		button.dispatch("click").unwrap();

		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	fn test_update_with_attribute_change_also_rebinds_handlers(document: Document) {
		let container = document.create_element("div").unwrap();
		let mut adapter = DomAdapter::new(document);
		let calls = Rc::new(Cell::new(0));
		let previous = Props::new().set("title", "a").on("click", |_| {});
		let next = {
			let calls = calls.clone();
			Props::new().set("title", "b").on("click", move |_| calls.set(calls.get() + 1))
		};
		let button = adapter.create_host_node(&container, &host("button", previous.clone())).unwrap();

		adapter.update_host_node(&button, &previous, &next).unwrap();
		button.dispatch("click").unwrap();

		assert_eq!(button.attribute("title").as_deref(), Some("b"));
		assert_eq!(calls.get(), 1);
	}

	#[rstest]
	#[case("svg", "div", Some(SVG_NAMESPACE))]
	#[case("circle", "svg", Some(SVG_NAMESPACE))]
	#[case("div", "foreignObject", None)]
	#[case("div", "section", None)]
	fn test_svg_namespace(
		document: Document,
		#[case] tag: &str,
		#[case] parent_tag: &str,
		#[case] expected: Option<&str>,
	) {
		let parent = match parent_tag {
			"svg" | "foreignObject" => document.create_element_ns(Some(SVG_NAMESPACE), parent_tag).unwrap(),
			_ => document.create_element(parent_tag).unwrap(),
		};
		let mut adapter = DomAdapter::new(document);

		let node = adapter.create_host_node(&parent, &host(tag, Props::new())).unwrap();

		assert_eq!(node.namespace().as_deref(), expected);
	}

	#[rstest]
	fn test_hydration_ends_at_commit(document: Document) {
		let container = document.create_element("div").unwrap();
		container.append_child(&document.create_element("p").unwrap()).unwrap();
		let mut adapter = DomAdapter::hydrating(document, &container);
		assert!(adapter.is_hydrating());

		let p = adapter.create_host_node(&container, &host("p", Props::new())).unwrap();
		adapter.append_child(&container, &p).unwrap();
		adapter.commit().unwrap();

		assert!(!adapter.is_hydrating());
		assert!(container.first_child().unwrap().is_same_node(&p));
		assert_eq!(container.child_nodes().len(), 1);
	}
}
