//! Development registry of live component instances
//!
//! Tracks which nodes each component currently renders and which render
//! functions were hot-swapped for newer ones. Only compiled with debug
//! assertions.

use std::collections::HashMap;

use crate::element::{Component, ComponentKey};
use crate::tree::NodeId;

#[derive(Debug, Default)]
pub(crate) struct Registry {
	instances: HashMap<ComponentKey, Vec<NodeId>>,
	replacements: HashMap<ComponentKey, Component>,
}

impl Registry {
	pub(crate) fn register(&mut self, component: Component, node: NodeId) {
		let nodes = self.instances.entry(component.key()).or_default();
		if !nodes.contains(&node) {
			nodes.push(node);
		}
	}

	pub(crate) fn unregister(&mut self, component: Component, node: NodeId) {
		if let Some(nodes) = self.instances.get_mut(&component.key()) {
			nodes.retain(|id| *id != node);
			if nodes.is_empty() {
				self.instances.remove(&component.key());
			}
		}
	}

	/// Follows hot-swap replacements to the newest render function.
	pub(crate) fn resolve(&self, component: Component) -> Component {
		let mut current = component;
		// bounded by the number of replacements, in case of a swap cycle
		for _ in 0..=self.replacements.len() {
			match self.replacements.get(&current.key()) {
				Some(next) if !next.same_identity(&current) => current = *next,
				_ => break,
			}
		}
		current
	}

	pub(crate) fn instances(&self, component: Component) -> Vec<NodeId> {
		self.instances
			.get(&component.key())
			.cloned()
			.unwrap_or_default()
	}

	/// Records that `previous` is now rendered by `next` and moves its instances over.
	///
	/// Returns the moved instances.
	pub(crate) fn replace(&mut self, previous: Component, next: Component) -> Vec<NodeId> {
		self.replacements.remove(&next.key());
		self.replacements.insert(previous.key(), next);
		let moved = self.instances.remove(&previous.key()).unwrap_or_default();
		for node in &moved {
			self.register(next, *node);
		}
		moved
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::element::RenderResult;
	use crate::hooks::Scope;
	use crate::props::Props;
	use crate::tree::{NodeKind, NodeTree};
	use rstest::rstest;

	fn v1(_: &mut Scope<'_>, _: &Props) -> RenderResult {
		Ok(None)
	}

	fn v2(_: &mut Scope<'_>, _: &Props) -> RenderResult {
		Ok(Some(crate::element::text("v2")))
	}

	fn v3(_: &mut Scope<'_>, _: &Props) -> RenderResult {
		Ok(Some(crate::element::text("v3")))
	}

	#[rstest]
	fn test_replace_moves_instances_and_resolves_chains() {
		let mut tree: NodeTree<()> = NodeTree::new();
		let node = tree.insert(None, NodeKind::Fragment(Props::new()));
		let (a, b, c) = (Component::new("A", v1), Component::new("B", v2), Component::new("C", v3));
		let mut registry = Registry::default();
		registry.register(a, node);

		assert_eq!(registry.replace(a, b), vec![node]);
		assert!(registry.instances(a).is_empty());
		assert_eq!(registry.instances(b), vec![node]);

		registry.replace(b, c);
		assert!(registry.resolve(a).same_identity(&c));
		assert!(registry.resolve(c).same_identity(&c));
	}

	#[rstest]
	fn test_swapping_back_does_not_loop() {
		let (a, b) = (Component::new("A", v1), Component::new("B", v2));
		let mut registry = Registry::default();

		registry.replace(a, b);
		registry.replace(b, a);

		assert!(registry.resolve(a).same_identity(&a));
		assert!(registry.resolve(b).same_identity(&a));
	}

	#[rstest]
	fn test_unregister_drops_empty_entries() {
		let mut tree: NodeTree<()> = NodeTree::new();
		let node = tree.insert(None, NodeKind::Fragment(Props::new()));
		let a = Component::new("A", v1);
		let mut registry = Registry::default();

		registry.register(a, node);
		registry.register(a, node);
		assert_eq!(registry.instances(a).len(), 1);
		registry.unregister(a, node);
		assert!(registry.instances.is_empty());
	}
}
