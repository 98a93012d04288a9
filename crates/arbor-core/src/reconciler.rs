//! Reconciler
//!
//! Walks a node against a freshly produced element and decides, child by
//! child, whether to patch, replace, insert or remove. Children are paired
//! strictly by index; there are no keys.
//!
//! One `Reconciler` value lives for the duration of one scheduler task. It
//! borrows the tree, the adapter and the effect queue of the root, and owns
//! the context bindings of the task.

use std::mem;
use std::rc::{Rc, Weak};

use crate::adapter::HostAdapter;
use crate::context::ContextMap;
use crate::element::{Component, Element, ElementKind};
use crate::error::{Error, Result};
use crate::hooks::{Hook, Scope, run_cleanups};
use crate::props::Props;
#[cfg(debug_assertions)]
use crate::registry::Registry;
use crate::scheduler::{EffectTask, Schedule};
use crate::tree::{ComponentNode, HostNode, NodeId, NodeKind, NodeTree, ProviderNode, TextNode};

pub(crate) struct Reconciler<'a, A: HostAdapter> {
	pub(crate) tree: &'a mut NodeTree<A::Native>,
	pub(crate) adapter: &'a mut A,
	pub(crate) contexts: ContextMap,
	pub(crate) effects: &'a mut Vec<EffectTask>,
	pub(crate) scheduler: Weak<dyn Schedule>,
	#[cfg(debug_assertions)]
	pub(crate) registry: &'a mut Registry,
}

impl<A: HostAdapter> Reconciler<'_, A> {
	/// Reconciles `id` against `element`.
	///
	/// With `None`, components re-render with their current props and every
	/// other node forwards the update to its children.
	pub(crate) fn update(&mut self, id: NodeId, element: Option<Element>) -> Result<()> {
		let kind = self.tree.kind(id).ok_or(Error::StaleNode(id))?.kind();
		if kind == ElementKind::Text || matches!(element, Some(Element::Text(_))) {
			return Ok(());
		}
		if let Some(element) = &element
			&& element.kind() != kind
		{
			return Err(Error::MalformedTree(format!(
				"cannot reconcile a {} element into {id}, a {kind} node",
				element.kind()
			)));
		}
		tracing::trace!(node = %id, %kind, "reconciling");

		match kind {
			ElementKind::Component => {
				let rendered = self.render_component(id, element)?;
				self.reconcile_children(id, rendered.into_iter().collect())
			}
			ElementKind::Provider => self.update_provider(id, element),
			ElementKind::Host => match element {
				Some(Element::Host(mut host)) => {
					let children = host.props.take_children();
					self.patch_host(id, host.props)?;
					self.reconcile_children(id, children)
				}
				_ => self.update_descendants(id),
			},
			ElementKind::Fragment => match element {
				Some(element) => self.reconcile_children(id, element.into_children()),
				None => self.update_descendants(id),
			},
			ElementKind::Text => Ok(()),
		}
	}

	fn update_descendants(&mut self, id: NodeId) -> Result<()> {
		for child in self.tree.descendants_of(id).to_vec() {
			self.update(child, None)?;
		}
		Ok(())
	}

	fn render_component(&mut self, id: NodeId, element: Option<Element>) -> Result<Option<Element>> {
		let next = match element {
			Some(Element::Component(element)) => Some((self.resolve(element.component), element.props)),
			_ => None,
		};

		let (component, props, mut hooks, first_render, hot_swapped) = {
			let NodeKind::Component(node) = self.tree.node_mut(id)?.kind_mut() else {
				return Err(Error::MalformedTree(format!("{id} is not a component node")));
			};
			if let Some((component, props)) = next {
				node.component = component;
				node.props = props;
			}
			(
				node.component,
				mem::take(&mut node.props),
				mem::take(&mut node.hooks),
				!node.rendered,
				node.hot_swapped,
			)
		};

		tracing::trace!(node = %id, component = component.name(), first_render, "rendering component");
		let result = {
			let mut scope = Scope::new(
				id,
				&mut hooks,
				first_render,
				hot_swapped,
				&self.contexts,
				&mut *self.effects,
				Weak::clone(&self.scheduler),
			);
			match (component.render_fn())(&mut scope, &props) {
				Ok(rendered) => scope.finish().map(|()| rendered),
				Err(err) => Err(err),
			}
		};

		if let NodeKind::Component(node) = self.tree.node_mut(id)?.kind_mut() {
			node.props = props;
			node.hooks = hooks;
			if result.is_ok() {
				node.rendered = true;
				node.hot_swapped = false;
			}
		}
		result
	}

	fn update_provider(&mut self, id: NodeId, element: Option<Element>) -> Result<()> {
		let (context, value, children) = {
			let NodeKind::Provider(node) = self.tree.node_mut(id)?.kind_mut() else {
				return Err(Error::MalformedTree(format!("{id} is not a provider node")));
			};
			let children = match element {
				Some(Element::Provider(mut element)) => {
					let children = element.props.take_children();
					node.value = element.value;
					node.props = element.props;
					Some(children)
				}
				_ => None,
			};
			(node.context, Rc::clone(&node.value), children)
		};

		let previous = self.contexts.publish(context, value);
		let result = match children {
			Some(children) => self.reconcile_children(id, children),
			None => self.update_descendants(id),
		};
		self.contexts.restore(context, previous);
		result
	}

	fn patch_host(&mut self, id: NodeId, props: Props) -> Result<()> {
		if let NodeKind::Host(host) = self.tree.node_mut(id)?.kind_mut() {
			if !host.props.changes(&props).is_empty() {
				self.adapter.update_host_node(&host.native, &host.props, &props)?;
			} else if !host.props.rebound_handlers(&props).is_empty() {
				self.adapter.rebind_handlers(&host.native, &props)?;
			}
			host.props = props;
		}
		self.bind_ref(id);
		Ok(())
	}

	fn reconcile_children(&mut self, parent: NodeId, children: Vec<Element>) -> Result<()> {
		let previous = self.tree.descendants_of(parent).to_vec();
		let count = children.len();

		for (index, element) in children.into_iter().enumerate() {
			match previous.get(index) {
				Some(&existing) if self.matches(existing, &element) => self.patch(existing, element)?,
				Some(&existing) => self.replace(parent, index, existing, element)?,
				None => self.add(parent, element)?,
			}
		}
		for &stale in previous.iter().skip(count) {
			self.remove(parent, stale)?;
		}
		Ok(())
	}

	fn matches(&self, id: NodeId, element: &Element) -> bool {
		let Some(kind) = self.tree.kind(id) else {
			return false;
		};
		match (kind, element) {
			(NodeKind::Component(node), Element::Component(element)) => {
				node.component.same_identity(&self.resolve(element.component))
			}
			(NodeKind::Host(node), Element::Host(element)) => node.tag == element.tag,
			(NodeKind::Provider(node), Element::Provider(element)) => node.context == element.context,
			(NodeKind::Text(_), Element::Text(_)) | (NodeKind::Fragment(_), Element::Fragment(_)) => true,
			_ => false,
		}
	}

	/// Same identity at the same position: update in place.
	fn patch(&mut self, id: NodeId, element: Element) -> Result<()> {
		if let Element::Text(text) = &element {
			if let NodeKind::Text(node) = self.tree.node_mut(id)?.kind_mut()
				&& node.text != *text
			{
				self.adapter.update_text_node(&node.native, text)?;
				node.text.clone_from(text);
			}
			return Ok(());
		}
		self.update(id, Some(element))
	}

	fn add(&mut self, parent: NodeId, element: Element) -> Result<()> {
		let id = self.construct(parent, &element)?;
		self.tree.push_descendant(parent, id)?;
		if let Some(native) = self.tree.native(id).cloned() {
			let host = self.host_native(parent)?;
			self.adapter.append_child(&host, &native)?;
		}
		self.update(id, Some(element))
	}

	fn replace(&mut self, parent: NodeId, index: usize, previous: NodeId, element: Element) -> Result<()> {
		let id = self.construct(parent, &element)?;
		self.teardown(previous);

		let handles = self.tree.native_handles(previous);
		match (handles.as_slice(), self.tree.native(id).cloned()) {
			([old], Some(new)) => {
				let host = self.host_native(parent)?;
				self.adapter.replace_child(&host, old, &new)?;
			}
			(_, new) => {
				self.adapter.remove_host_node(&*self.tree, previous)?;
				if let Some(new) = new {
					let host = self.host_native(parent)?;
					self.adapter.append_child(&host, &new)?;
				}
			}
		}

		self.free(previous);
		self.tree.set_descendant(parent, index, id)?;
		self.update(id, Some(element))
	}

	fn remove(&mut self, parent: NodeId, id: NodeId) -> Result<()> {
		self.teardown(id);
		self.adapter.remove_host_node(&*self.tree, id)?;
		self.tree.remove_descendant(parent, id)?;
		self.free(id);
		Ok(())
	}

	/// Creates the node for `element` under `parent`, without linking it.
	fn construct(&mut self, parent: NodeId, element: &Element) -> Result<NodeId> {
		let kind = match element {
			Element::Host(element) => {
				let host = self.host_native(parent)?;
				let native = self.adapter.create_host_node(&host, element)?;
				NodeKind::Host(HostNode {
					tag: element.tag.clone(),
					props: element.props.without_children(),
					native,
				})
			}
			Element::Text(text) => NodeKind::Text(TextNode {
				text: text.clone(),
				native: self.adapter.create_text_node(text)?,
			}),
			Element::Component(element) => {
				NodeKind::Component(ComponentNode::new(self.resolve(element.component), Props::new()))
			}
			Element::Provider(element) => NodeKind::Provider(ProviderNode {
				context: element.context,
				value: Rc::clone(&element.value),
				props: element.props.without_children(),
			}),
			Element::Fragment(props) => NodeKind::Fragment(props.without_children()),
		};

		let id = self.tree.insert(Some(parent), kind);
		#[cfg(debug_assertions)]
		if let Element::Component(element) = element {
			self.registry.register(self.resolve(element.component), id);
		}
		tracing::debug!(node = %id, parent = %parent, kind = %element.kind(), "created node");
		Ok(id)
	}

	/// Runs effect cleanups and releases context bindings of a subtree, parents first.
	fn teardown(&mut self, id: NodeId) {
		for node in self.tree.subtree(id) {
			let Some(entry) = self.tree.get_mut(node) else {
				continue;
			};
			match entry.kind_mut() {
				NodeKind::Component(component) => {
					run_cleanups(&mut component.hooks);
					#[cfg(debug_assertions)]
					self.registry.unregister(component.component, node);
				}
				NodeKind::Provider(provider) => self.contexts.release(provider.context, &provider.value),
				_ => {}
			}
		}
	}

	fn free(&mut self, id: NodeId) {
		for node in self.tree.subtree(id) {
			if self.tree.remove(node).is_some() {
				tracing::debug!(node = %node, "destroyed node");
			}
		}
	}

	fn host_native(&self, id: NodeId) -> Result<A::Native> {
		let host = self.adapter.find_closest_host_node(&*self.tree, id)?;
		self.tree.native(host).cloned().ok_or(Error::MissingNative(host))
	}

	/// Stores the backend handle of `id` in the ref its props declare.
	///
	/// The ref must be owned by the closest enclosing component.
	fn bind_ref(&self, id: NodeId) {
		let Some(NodeKind::Host(host)) = self.tree.kind(id) else {
			return;
		};
		let Some(node_ref) = host.props.node_ref() else {
			return;
		};
		let owned = self
			.adapter
			.find_closest_component(&*self.tree, id)
			.and_then(|owner| self.tree.kind(owner))
			.is_some_and(|owner| match owner {
				NodeKind::Component(component) => component
					.hooks
					.iter()
					.any(|hook| matches!(hook, Hook::Ref(candidate) if candidate.ptr_eq(node_ref))),
				_ => false,
			});
		if owned {
			node_ref.set(host.native.clone());
		} else {
			tracing::warn!(node = %id, tag = %host.tag, "ref is not owned by the enclosing component; not bound");
		}
	}

	#[cfg(debug_assertions)]
	fn resolve(&self, component: Component) -> Component {
		self.registry.resolve(component)
	}

	#[cfg(not(debug_assertions))]
	fn resolve(&self, component: Component) -> Component {
		component
	}
}
