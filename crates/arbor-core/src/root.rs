//! Render roots
//!
//! A [`Root`] owns one node tree, the host adapter rendering it and the update
//! queue feeding it. The root node is a host node (`#root`) whose backend
//! handle is the container passed at creation; everything rendered hangs
//! below it.
//!
//! ```ignore
//! let root = Root::new(adapter, container);
//! root.render(create_element(App, Props::new(), no_children()))?;
//! ```

use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use crate::adapter::HostAdapter;
use crate::context::ContextMap;
#[cfg(debug_assertions)]
use crate::element::Component;
use crate::element::{Element, create_element, no_children};
use crate::error::Result;
use crate::hooks::{Cleanup, Hook, PendingEffect};
use crate::props::Props;
use crate::reconciler::Reconciler;
#[cfg(debug_assertions)]
use crate::registry::Registry;
use crate::scheduler::{EffectTask, Schedule, Task, UpdateQueue};
use crate::tree::{HostNode, NodeId, NodeKind, NodeTree};

const ROOT_TAG: &str = "#root";

/// Configuration of a [`Root`].
#[derive(Debug, Clone)]
pub struct RootConfig {
	name: String,
	flush_effects: bool,
}

impl Default for RootConfig {
	fn default() -> Self {
		Self {
			name: "root".to_string(),
			flush_effects: true,
		}
	}
}

impl RootConfig {
	/// Creates the default configuration.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the name attached to the log events of this root.
	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	/// Sets whether effects run after each update pass.
	///
	/// Server rendering turns this off: effects are dropped unrun.
	pub fn flush_effects(mut self, flush: bool) -> Self {
		self.flush_effects = flush;
		self
	}

	/// Returns the root name.
	pub fn root_name(&self) -> &str {
		&self.name
	}

	/// Returns whether effects run.
	pub fn runs_effects(&self) -> bool {
		self.flush_effects
	}
}

struct RootInner<A: HostAdapter> {
	tree: RefCell<NodeTree<A::Native>>,
	adapter: RefCell<A>,
	queue: UpdateQueue,
	effects: RefCell<Vec<EffectTask>>,
	#[cfg(debug_assertions)]
	registry: RefCell<Registry>,
	scheduler: Weak<dyn Schedule>,
	root: NodeId,
	config: RootConfig,
}

impl<A: HostAdapter + 'static> Schedule for RootInner<A> {
	fn schedule(&self, task: Task) {
		if let Err(err) = self.submit(task) {
			tracing::error!(root = %self.config.name, error = %err, "scheduled update failed");
		}
	}
}

impl<A: HostAdapter + 'static> RootInner<A> {
	/// Enqueues a task and drains the queue unless a drain is already running.
	fn submit(&self, task: Task) -> Result<()> {
		self.queue.push(task);
		if !self.queue.begin_drain() {
			return Ok(());
		}

		let _span = tracing::debug_span!("drain", root = %self.config.name).entered();
		while let Some(task) = self.queue.pop() {
			if let Err(err) = self.run_task(task) {
				let discarded = self.queue.abort();
				self.cancel_effects();
				tracing::warn!(discarded, error = %err, "update pass failed; queued tasks discarded");
				return Err(err);
			}
		}
		self.queue.end_drain();
		Ok(())
	}

	fn run_task(&self, task: Task) -> Result<()> {
		let node = task.node;
		if !self.tree.borrow().is_alive(node) {
			tracing::debug!(node = %node, "skipping task for destroyed node");
			return Ok(());
		}
		tracing::debug!(node = %node, "task started");

		{
			let mut tree = self.tree.borrow_mut();
			let mut adapter = self.adapter.borrow_mut();
			let mut effects = self.effects.borrow_mut();
			#[cfg(debug_assertions)]
			let mut registry = self.registry.borrow_mut();
			let contexts = ContextMap::inherited(&*tree, node);

			let mut reconciler = Reconciler {
				tree: &mut *tree,
				adapter: &mut *adapter,
				contexts,
				effects: &mut *effects,
				scheduler: Weak::clone(&self.scheduler),
				#[cfg(debug_assertions)]
				registry: &mut *registry,
			};
			reconciler.update(node, task.element)?;
			adapter.commit()?;
		}

		if self.config.flush_effects {
			self.flush_effects();
		} else {
			self.discard_effects();
		}
		tracing::debug!(node = %node, "task finished");
		Ok(())
	}

	/// Runs queued effects in registration order, outside of any tree borrow.
	fn flush_effects(&self) {
		let queued = mem::take(&mut *self.effects.borrow_mut());
		if queued.is_empty() {
			return;
		}
		tracing::debug!(count = queued.len(), "flushing effects");

		for task in queued {
			let Some((cleanup, effect)) = take_effect(&mut *self.tree.borrow_mut(), task) else {
				tracing::debug!(node = %task.node, index = task.index, "skipping effect of destroyed node");
				continue;
			};
			if let Some(cleanup) = cleanup {
				cleanup.run();
			}
			if let Some(cleanup) = effect() {
				let orphan = store_cleanup(&mut *self.tree.borrow_mut(), task, cleanup);
				if let Some(orphan) = orphan {
					orphan.run();
				}
			}
		}
	}

	fn discard_effects(&self) {
		let queued = mem::take(&mut *self.effects.borrow_mut());
		let mut tree = self.tree.borrow_mut();
		for task in queued {
			if let Some(Hook::Effect(slot)) = hook_mut(&mut *tree, task) {
				slot.pending = None;
			}
		}
	}

	/// Forgets the effects queued by a failed pass.
	fn cancel_effects(&self) {
		let queued = mem::take(&mut *self.effects.borrow_mut());
		let mut tree = self.tree.borrow_mut();
		for task in queued {
			if let Some(Hook::Effect(slot)) = hook_mut(&mut *tree, task) {
				slot.cancel_pending();
			}
		}
	}
}

fn hook_mut<N>(tree: &mut NodeTree<N>, task: EffectTask) -> Option<&mut Hook> {
	match tree.get_mut(task.node)?.kind_mut() {
		NodeKind::Component(component) => component.hooks.get_mut(task.index),
		_ => None,
	}
}

/// Takes the pending effect of a slot together with the cleanup of its previous run.
fn take_effect<N>(tree: &mut NodeTree<N>, task: EffectTask) -> Option<(Option<Cleanup>, PendingEffect)> {
	match hook_mut(tree, task)? {
		Hook::Effect(slot) => {
			let effect = slot.pending.take()?;
			Some((slot.cleanup.take(), effect))
		}
		_ => None,
	}
}

/// Stores the cleanup of an effect run; hands it back if its node is gone.
fn store_cleanup<N>(tree: &mut NodeTree<N>, task: EffectTask, cleanup: Cleanup) -> Option<Cleanup> {
	match hook_mut(tree, task) {
		Some(Hook::Effect(slot)) => {
			slot.cleanup = Some(cleanup);
			None
		}
		_ => Some(cleanup),
	}
}

/// A render root bound to one host adapter.
///
/// Cloning a `Root` yields another handle to the same tree.
pub struct Root<A: HostAdapter + 'static> {
	inner: Rc<RootInner<A>>,
}

impl<A: HostAdapter + 'static> Clone for Root<A> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<A: HostAdapter + 'static> Root<A> {
	/// Creates a root rendering into `container`.
	pub fn new(adapter: A, container: A::Native) -> Self {
		Self::with_config(adapter, container, RootConfig::default())
	}

	/// Creates a root with an explicit configuration.
	pub fn with_config(adapter: A, container: A::Native, config: RootConfig) -> Self {
		let mut tree = NodeTree::new();
		let root = tree.insert(
			None,
			NodeKind::Host(HostNode {
				tag: ROOT_TAG.to_string(),
				props: Props::new(),
				native: container,
			}),
		);
		let inner = Rc::new_cyclic(|weak: &Weak<RootInner<A>>| {
			let scheduler: Weak<dyn Schedule> = weak.clone();
			RootInner {
				tree: RefCell::new(tree),
				adapter: RefCell::new(adapter),
				queue: UpdateQueue::default(),
				effects: RefCell::new(Vec::new()),
				#[cfg(debug_assertions)]
				registry: RefCell::new(Registry::default()),
				scheduler,
				root,
				config,
			}
		});
		tracing::debug!(root = %inner.config.name, node = %root, "created root");
		Self { inner }
	}

	/// Renders `element` as the only child of the container.
	///
	/// Repeated calls reconcile against the previous render.
	pub fn render(&self, element: Element) -> Result<()> {
		let root = create_element(ROOT_TAG, Props::new(), [element]);
		self.inner.submit(Task::new(self.inner.root, Some(root)))
	}

	/// Reconciles `node` against `element`, or re-renders it with its current props.
	///
	/// If a drain is already running (for instance when called from an effect),
	/// the task is queued and `Ok` is returned immediately.
	pub fn update(&self, node: NodeId, element: Option<Element>) -> Result<()> {
		self.inner.submit(Task::new(node, element))
	}

	/// Re-renders every component of the tree with its current props.
	pub fn rerender(&self) -> Result<()> {
		self.update(self.inner.root, None)
	}

	/// Removes everything below the container, running every effect cleanup.
	pub fn unmount(&self) -> Result<()> {
		let root = create_element(ROOT_TAG, Props::new(), no_children());
		self.inner.submit(Task::new(self.inner.root, Some(root)))
	}

	/// Returns the id of the root node.
	pub fn root_id(&self) -> NodeId {
		self.inner.root
	}

	/// Returns the backend handle of the container.
	pub fn container(&self) -> Option<A::Native> {
		self.inner.tree.borrow().native(self.inner.root).cloned()
	}

	/// Returns the configuration.
	pub fn config(&self) -> &RootConfig {
		&self.inner.config
	}

	/// Runs `f` with shared access to the adapter.
	pub fn with_adapter<R>(&self, f: impl FnOnce(&A) -> R) -> R {
		f(&*self.inner.adapter.borrow())
	}

	/// Runs `f` with exclusive access to the adapter.
	pub fn with_adapter_mut<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
		f(&mut *self.inner.adapter.borrow_mut())
	}

	/// Runs `f` with shared access to the node tree.
	pub fn with_tree<R>(&self, f: impl FnOnce(&NodeTree<A::Native>) -> R) -> R {
		f(&*self.inner.tree.borrow())
	}

	/// Returns the live nodes rendered by `component`.
	#[cfg(debug_assertions)]
	pub fn instances_of(&self, component: Component) -> Vec<NodeId> {
		self.inner.registry.borrow().instances(component)
	}

	/// Replaces the render function of every live instance of `previous`.
	///
	/// Future elements naming `previous` resolve to `next`. Each instance
	/// re-renders with its current props and hook state; hook slots whose kind
	/// no longer matches are discarded on that render instead of failing.
	#[cfg(debug_assertions)]
	pub fn hot_swap(&self, previous: Component, next: Component) -> Result<()> {
		let instances = self.inner.registry.borrow_mut().replace(previous, next);
		{
			let mut tree = self.inner.tree.borrow_mut();
			for node in &instances {
				if let Some(NodeKind::Component(component)) = tree.get_mut(*node).map(|entry| entry.kind_mut()) {
					component.component = next;
					component.hot_swapped = true;
				}
			}
		}
		tracing::debug!(from = previous.name(), to = next.name(), instances = instances.len(), "hot swapped component");
		for node in instances {
			self.update(node, None)?;
		}
		Ok(())
	}
}

impl<A: HostAdapter + 'static> fmt::Debug for Root<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Root")
			.field("name", &self.inner.config.name)
			.field("root", &self.inner.root)
			.field("queued", &self.inner.queue.len())
			.finish_non_exhaustive()
	}
}
