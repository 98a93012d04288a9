//! Hook store and hook primitives
//!
//! Each component node owns an ordered list of hook slots. During a render
//! the reconciler lends that list to a [`Scope`], and every hook method claims
//! the next slot in call order. The kind recorded in a slot must match the kind
//! requested at the same position on every later render; a mismatch is
//! reported as [`Error::HookOrder`] instead of being coerced.
//!
//! ```ignore
//! fn counter(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
//!     let (count, set_count) = scope.use_state(|| 0)?;
//!     let label = format!("Clicked {count} times!");
//!     Ok(Some(create_element(
//!         "button",
//!         Props::new().on("click", move |_| set_count.update(|n| n + 1)),
//!         [label],
//!     )))
//! }
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::context::{Context, ContextId, ContextMap};
use crate::error::{Error, Result};
use crate::scheduler::{EffectTask, Schedule, Task};
use crate::tree::NodeId;

/// Kind of a hook slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
	/// [`Scope::use_state`]
	State,
	/// [`Scope::use_effect`] and [`Scope::use_effect_always`]
	Effect,
	/// [`Scope::use_ref`]
	Ref,
	/// [`Scope::use_memo`]
	Memo,
	/// [`Scope::use_context`]
	Context,
}

impl fmt::Display for HookKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::State => "state",
			Self::Effect => "effect",
			Self::Ref => "ref",
			Self::Memo => "memo",
			Self::Context => "context",
		};
		f.write_str(name)
	}
}

/// Cleanup callback returned by an effect.
pub struct Cleanup(Box<dyn FnOnce()>);

impl Cleanup {
	/// Wraps a closure as a cleanup callback.
	pub fn new<F>(f: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self(Box::new(f))
	}

	pub(crate) fn run(self) {
		(self.0)();
	}
}

impl fmt::Debug for Cleanup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Cleanup(..)")
	}
}

pub(crate) type PendingEffect = Box<dyn FnOnce() -> Option<Cleanup>>;

/// State of an effect slot.
#[derive(Default)]
pub(crate) struct EffectSlot {
	/// dependency snapshot, `None` when the effect runs every pass
	deps: Option<Box<dyn Any>>,
	pub(crate) cleanup: Option<Cleanup>,
	pub(crate) pending: Option<PendingEffect>,
	initialized: bool,
}

impl EffectSlot {
	/// Drops a queued run that never happened, so the next render queues it again.
	pub(crate) fn cancel_pending(&mut self) {
		self.pending = None;
		self.deps = None;
	}
}

#[derive(Default)]
pub(crate) struct MemoSlot {
	deps: Option<Box<dyn Any>>,
	value: Option<Rc<dyn Any>>,
}

/// One slot of a component's hook list.
pub(crate) enum Hook {
	/// `RefCell<T>` behind a shared pointer so setters outlive the render
	State(Rc<dyn Any>),
	Effect(EffectSlot),
	Ref(NodeRef),
	Memo(MemoSlot),
	Context(ContextId),
}

impl Hook {
	pub(crate) fn kind(&self) -> HookKind {
		match self {
			Self::State(_) => HookKind::State,
			Self::Effect(_) => HookKind::Effect,
			Self::Ref(_) => HookKind::Ref,
			Self::Memo(_) => HookKind::Memo,
			Self::Context(_) => HookKind::Context,
		}
	}

	/// Takes the cleanup of an effect slot and drops any effect not yet flushed.
	pub(crate) fn take_cleanup(&mut self) -> Option<Cleanup> {
		match self {
			Self::Effect(slot) => {
				slot.pending = None;
				slot.cleanup.take()
			}
			_ => None,
		}
	}
}

fn hook_type(node: NodeId, index: usize, kind: HookKind) -> Error {
	Error::HookType { node, index, kind }
}

/// Runs the cleanups of every effect slot in `hooks`, in slot order.
pub(crate) fn run_cleanups(hooks: &mut [Hook]) {
	for cleanup in hooks.iter_mut().filter_map(Hook::take_cleanup) {
		cleanup.run();
	}
}

/// A mutable box whose content is stable across renders.
///
/// When passed to an element with [`Props::with_ref`](crate::props::Props::with_ref),
/// the reconciler stores the backend handle of the host node built for that
/// element. It can also hold any application value through [`NodeRef::set`].
/// Clones share the same box.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<RefCell<Option<Rc<dyn Any>>>>);

impl NodeRef {
	/// Creates an empty ref.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns a clone of the content if it has type `T`.
	pub fn get<T: Clone + 'static>(&self) -> Option<T> {
		self.0.borrow().as_ref()?.downcast_ref::<T>().cloned()
	}

	/// Replaces the content.
	pub fn set<T: 'static>(&self, value: T) {
		*self.0.borrow_mut() = Some(Rc::new(value));
	}

	/// Empties the ref.
	pub fn clear(&self) {
		*self.0.borrow_mut() = None;
	}

	/// Returns true if the ref holds a value.
	pub fn is_set(&self) -> bool {
		self.0.borrow().is_some()
	}

	/// Returns true if both refs are clones of the same box.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl PartialEq for NodeRef {
	fn eq(&self, other: &Self) -> bool {
		self.ptr_eq(other)
	}
}

impl fmt::Debug for NodeRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("NodeRef").field("set", &self.is_set()).finish()
	}
}

/// Setter returned by [`Scope::use_state`].
///
/// Every call overwrites the state and schedules a re-render of the owning
/// node, even when the new value equals the old one.
pub struct StateSetter<T> {
	cell: Rc<RefCell<T>>,
	handle: UpdateHandle,
}

impl<T> Clone for StateSetter<T> {
	fn clone(&self) -> Self {
		Self {
			cell: Rc::clone(&self.cell),
			handle: self.handle.clone(),
		}
	}
}

impl<T: 'static> StateSetter<T> {
	/// Replaces the state.
	pub fn set(&self, value: T) {
		*self.cell.borrow_mut() = value;
		self.handle.request();
	}

	/// Replaces the state with `f(current)`.
	pub fn update<F>(&self, f: F)
	where
		F: FnOnce(&T) -> T,
	{
		let next = f(&self.cell.borrow());
		*self.cell.borrow_mut() = next;
		self.handle.request();
	}
}

impl<T> fmt::Debug for StateSetter<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StateSetter").field("node", &self.handle.node).finish()
	}
}

/// Requests re-renders of one component node.
#[derive(Clone)]
pub struct UpdateHandle {
	node: NodeId,
	scheduler: Weak<dyn Schedule>,
}

impl UpdateHandle {
	/// Enqueues a re-render of the node with its current props.
	///
	/// Does nothing once the root owning the node was dropped.
	pub fn request(&self) {
		match self.scheduler.upgrade() {
			Some(scheduler) => scheduler.schedule(Task::rerender(self.node)),
			None => tracing::debug!(node = %self.node, "update requested after the root was dropped"),
		}
	}

	/// Returns the node this handle re-renders.
	pub fn node(&self) -> NodeId {
		self.node
	}
}

impl fmt::Debug for UpdateHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("UpdateHandle").field("node", &self.node).finish()
	}
}

/// Render context of one component node.
///
/// Passed to the render function; hooks are only reachable through it.
pub struct Scope<'a> {
	node: NodeId,
	hooks: &'a mut Vec<Hook>,
	index: usize,
	first_render: bool,
	hot_swapped: bool,
	contexts: &'a ContextMap,
	effects: &'a mut Vec<EffectTask>,
	scheduler: Weak<dyn Schedule>,
}

impl<'a> Scope<'a> {
	pub(crate) fn new(
		node: NodeId,
		hooks: &'a mut Vec<Hook>,
		first_render: bool,
		hot_swapped: bool,
		contexts: &'a ContextMap,
		effects: &'a mut Vec<EffectTask>,
		scheduler: Weak<dyn Schedule>,
	) -> Self {
		Self {
			node,
			hooks,
			index: 0,
			first_render,
			hot_swapped,
			contexts,
			effects,
			scheduler,
		}
	}

	/// Returns the component node being rendered.
	pub fn node(&self) -> NodeId {
		self.node
	}

	/// Returns true during the first render of the node.
	pub fn is_first_render(&self) -> bool {
		self.first_render
	}

	/// Returns a handle that re-renders this node on request, without using a hook slot.
	pub fn updater(&self) -> UpdateHandle {
		UpdateHandle {
			node: self.node,
			scheduler: Weak::clone(&self.scheduler),
		}
	}

	/// Claims the next slot, creating it with `init` when it does not exist yet.
	fn claim<F>(&mut self, kind: HookKind, init: F) -> Result<usize>
	where
		F: FnOnce() -> Hook,
	{
		let index = self.index;
		self.index += 1;

		if let Some(existing) = self.hooks.get(index) {
			let expected = existing.kind();
			if expected == kind {
				return Ok(index);
			}
			if !self.hot_swapped {
				return Err(Error::HookOrder {
					node: self.node,
					index,
					expected,
					found: kind,
				});
			}
			tracing::debug!(node = %self.node, index, %expected, found = %kind, "discarding hook slots after hot swap");
			run_cleanups(&mut self.hooks[index..]);
			self.hooks.truncate(index);
		} else if !self.first_render && !self.hot_swapped {
			return Err(Error::HookCount {
				node: self.node,
				expected: self.hooks.len(),
				found: index + 1,
			});
		}

		self.hooks.push(init());
		Ok(index)
	}

	/// Checks that the render called as many hooks as the previous one.
	pub(crate) fn finish(self) -> Result<()> {
		if self.index >= self.hooks.len() {
			return Ok(());
		}
		if self.hot_swapped {
			run_cleanups(&mut self.hooks[self.index..]);
			self.hooks.truncate(self.index);
			return Ok(());
		}
		Err(Error::HookCount {
			node: self.node,
			expected: self.hooks.len(),
			found: self.index,
		})
	}

	/// Returns the current state and a setter.
	///
	/// `init` runs on the first render only.
	pub fn use_state<T, F>(&mut self, init: F) -> Result<(T, StateSetter<T>)>
	where
		T: Clone + 'static,
		F: FnOnce() -> T,
	{
		let index = self.claim(HookKind::State, || {
			Hook::State(Rc::new(RefCell::new(init())))
		})?;
		let Hook::State(value) = &self.hooks[index] else {
			return Err(hook_type(self.node, index, HookKind::State));
		};
		let cell = Rc::clone(value)
			.downcast::<RefCell<T>>()
			.map_err(|_| hook_type(self.node, index, HookKind::State))?;
		let current = cell.borrow().clone();
		Ok((
			current,
			StateSetter {
				cell,
				handle: self.updater(),
			},
		))
	}

	/// Registers an effect that runs after the update pass when `deps` changed.
	///
	/// The effect runs after the first render, then again whenever `deps`
	/// differs from the value passed on the previous render. The cleanup it
	/// returns runs before the next run and when the node is destroyed.
	pub fn use_effect<D, F>(&mut self, deps: D, effect: F) -> Result<()>
	where
		D: PartialEq + 'static,
		F: FnOnce() -> Option<Cleanup> + 'static,
	{
		let index = self.claim(HookKind::Effect, || Hook::Effect(EffectSlot::default()))?;
		let Hook::Effect(slot) = &mut self.hooks[index] else {
			return Err(hook_type(self.node, index, HookKind::Effect));
		};
		let changed = match slot.deps.as_ref() {
			None => true,
			Some(previous) => match previous.downcast_ref::<D>() {
				Some(previous) => *previous != deps,
				None if slot.initialized => return Err(hook_type(self.node, index, HookKind::Effect)),
				None => true,
			},
		};
		if !slot.initialized || changed {
			slot.deps = Some(Box::new(deps));
			self.queue_effect(index, Box::new(effect));
		}
		Ok(())
	}

	/// Registers an effect that runs after every update pass of this node.
	pub fn use_effect_always<F>(&mut self, effect: F) -> Result<()>
	where
		F: FnOnce() -> Option<Cleanup> + 'static,
	{
		let index = self.claim(HookKind::Effect, || Hook::Effect(EffectSlot::default()))?;
		if let Hook::Effect(slot) = &mut self.hooks[index] {
			slot.deps = None;
		}
		self.queue_effect(index, Box::new(effect));
		Ok(())
	}

	fn queue_effect(&mut self, index: usize, effect: PendingEffect) {
		if let Some(Hook::Effect(slot)) = self.hooks.get_mut(index) {
			slot.initialized = true;
			slot.pending = Some(effect);
			self.effects.push(EffectTask {
				node: self.node,
				index,
			});
		}
	}

	/// Returns a ref that stays the same across renders.
	pub fn use_ref(&mut self) -> Result<NodeRef> {
		let index = self.claim(HookKind::Ref, || Hook::Ref(NodeRef::new()))?;
		match &self.hooks[index] {
			Hook::Ref(node_ref) => Ok(node_ref.clone()),
			_ => Err(hook_type(self.node, index, HookKind::Ref)),
		}
	}

	/// Returns a cached value, recomputed only when `deps` changed.
	pub fn use_memo<D, T, F>(&mut self, deps: D, compute: F) -> Result<T>
	where
		D: PartialEq + 'static,
		T: Clone + 'static,
		F: FnOnce(&D) -> T,
	{
		let node = self.node;
		let index = self.claim(HookKind::Memo, || Hook::Memo(MemoSlot::default()))?;
		let Some(Hook::Memo(slot)) = self.hooks.get_mut(index) else {
			return Err(hook_type(node, index, HookKind::Memo));
		};
		let stale = match slot.deps.as_ref() {
			None => true,
			Some(previous) => match previous.downcast_ref::<D>() {
				Some(previous) => *previous != deps,
				None => return Err(hook_type(node, index, HookKind::Memo)),
			},
		};
		if stale {
			let value = compute(&deps);
			slot.deps = Some(Box::new(deps));
			slot.value = Some(Rc::new(value.clone()));
			return Ok(value);
		}
		slot.value
			.as_ref()
			.and_then(|value| value.downcast_ref::<T>())
			.cloned()
			.ok_or_else(|| hook_type(node, index, HookKind::Memo))
	}

	/// Returns the value published for `context` by the nearest provider.
	pub fn use_context<T>(&mut self, context: &Context<T>) -> Result<T>
	where
		T: Clone + 'static,
	{
		let id = context.id();
		let index = self.claim(HookKind::Context, || Hook::Context(id))?;
		if let Some(Hook::Context(slot)) = self.hooks.get_mut(index) {
			*slot = id;
		}
		let value = self
			.contexts
			.get(id)
			.ok_or(Error::MissingProvider { context: id })?;
		value
			.downcast_ref::<T>()
			.cloned()
			.ok_or_else(|| hook_type(self.node, index, HookKind::Context))
	}
}

impl fmt::Debug for Scope<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scope")
			.field("node", &self.node)
			.field("index", &self.index)
			.field("first_render", &self.first_render)
			.finish_non_exhaustive()
	}
}
