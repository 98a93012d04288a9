//! Update scheduler
//!
//! Single-threaded run-to-completion queue. Submitting a task always enqueues
//! it; only the submission that finds the queue idle drains it. State setters
//! invoked while a drain is in progress therefore never re-enter the
//! reconciler, they append to the same queue.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use crate::element::Element;
use crate::tree::NodeId;

/// Receives tasks from state setters and update handles.
pub(crate) trait Schedule {
	fn schedule(&self, task: Task);
}

/// A unit of scheduled work: re-render `node`, with a new element or with its current props.
pub struct Task {
	pub(crate) node: NodeId,
	pub(crate) element: Option<Element>,
}

impl Task {
	/// Creates a task reconciling `node` against `element`.
	pub fn new(node: NodeId, element: Option<Element>) -> Self {
		Self { node, element }
	}

	/// Creates a task re-rendering `node` with its current props.
	pub fn rerender(node: NodeId) -> Self {
		Self::new(node, None)
	}

	/// Returns the target node.
	pub fn node(&self) -> NodeId {
		self.node
	}

	fn is_rerender_of(&self, node: NodeId) -> bool {
		self.element.is_none() && self.node == node
	}
}

impl fmt::Debug for Task {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Task")
			.field("node", &self.node)
			.field("element", &self.element.as_ref().map(Element::kind))
			.finish()
	}
}

/// Position of an effect whose callback waits for the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectTask {
	pub(crate) node: NodeId,
	pub(crate) index: usize,
}

#[derive(Debug, Default)]
pub(crate) struct UpdateQueue {
	tasks: RefCell<VecDeque<Task>>,
	draining: Cell<bool>,
}

impl UpdateQueue {
	/// Appends a task.
	///
	/// Not every submission is appended: a re-render of a node that is
	/// already queued for a re-render is coalesced into the queued one, which
	/// keeps its position, so A, B, A drains as A, B. Only tasks still waiting
	/// are considered; a node whose pass is running is queued again.
	pub(crate) fn push(&self, task: Task) {
		let mut tasks = self.tasks.borrow_mut();
		if task.element.is_none() && tasks.iter().any(|queued| queued.is_rerender_of(task.node)) {
			tracing::trace!(node = %task.node, "coalesced re-render");
			return;
		}
		tasks.push_back(task);
	}

	pub(crate) fn pop(&self) -> Option<Task> {
		self.tasks.borrow_mut().pop_front()
	}

	/// Marks the queue as draining; returns false if a drain is already running.
	pub(crate) fn begin_drain(&self) -> bool {
		!self.draining.replace(true)
	}

	pub(crate) fn end_drain(&self) {
		self.draining.set(false);
	}

	#[cfg(test)]
	pub(crate) fn is_draining(&self) -> bool {
		self.draining.get()
	}

	/// Discards every queued task and ends the drain; returns the number discarded.
	pub(crate) fn abort(&self) -> usize {
		let discarded = {
			let mut tasks = self.tasks.borrow_mut();
			let count = tasks.len();
			tasks.clear();
			count
		};
		self.end_drain();
		discarded
	}

	pub(crate) fn len(&self) -> usize {
		self.tasks.borrow().len()
	}
}
