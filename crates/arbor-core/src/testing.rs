//! Test utilities
//!
//! [`RecordingAdapter`] is an in-memory host adapter that keeps a log of every
//! operation the reconciler asks for, so tests can assert exactly which backend
//! nodes were created, patched, moved or removed.
//!
//! Enabled with the `testing` feature.

use std::collections::HashMap;
use std::fmt::Write as _;

use thiserror::Error;

use crate::adapter::HostAdapter;
use crate::attributes::{attribute_name, attribute_value, event_name};
use crate::element::HostElement;
use crate::error::{Error, Result};
use crate::props::{EventHandler, Props};
use crate::root::Root;

/// Backend handle of the recording adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u32);

impl Handle {
	/// The container every [`RecordingAdapter::root`] renders into.
	pub const CONTAINER: Self = Self(0);
}

/// An operation requested by the reconciler.
#[allow(missing_docs, reason = "fields mirror the adapter method arguments")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostOp {
	/// `create_host_node`
	CreateHost { handle: Handle, tag: String },
	/// `create_text_node`
	CreateText { handle: Handle, text: String },
	/// `update_host_node`, with the keys that changed
	UpdateHost { handle: Handle, changed: Vec<String> },
	/// `update_text_node`
	UpdateText { handle: Handle, text: String },
	/// `append_child`
	Append { parent: Handle, child: Handle },
	/// `replace_child`
	Replace { parent: Handle, previous: Handle, next: Handle },
	/// `detach`
	Detach { parent: Handle, child: Handle },
}

/// Contract violations detected by the recording adapter.
#[allow(missing_docs, reason = "fields are named after the adapter arguments")]
#[derive(Debug, Error)]
pub enum RecordingError {
	/// The handle was never created
	#[error("unknown handle {0:?}")]
	UnknownHandle(Handle),
	/// The child is not attached to the parent
	#[error("{child:?} is not a child of {parent:?}")]
	NotAChild { parent: Handle, child: Handle },
	/// A text node was asked to take children
	#[error("{0:?} is a text node")]
	TextParent(Handle),
}

enum Entry {
	Host {
		tag: String,
		props: Props,
		children: Vec<Handle>,
	},
	Text(String),
}

/// In-memory adapter logging every operation.
pub struct RecordingAdapter {
	entries: HashMap<Handle, Entry>,
	ops: Vec<HostOp>,
	next: u32,
	commits: usize,
}

impl Default for RecordingAdapter {
	fn default() -> Self {
		let mut entries = HashMap::new();
		entries.insert(
			Handle::CONTAINER,
			Entry::Host {
				tag: "#container".to_string(),
				props: Props::new(),
				children: Vec::new(),
			},
		);
		Self {
			entries,
			ops: Vec::new(),
			next: 1,
			commits: 0,
		}
	}
}

impl RecordingAdapter {
	/// Creates an adapter holding only the container.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a root rendering into [`Handle::CONTAINER`] of a fresh adapter.
	pub fn root() -> Root<Self> {
		Root::new(Self::new(), Handle::CONTAINER)
	}

	/// Returns the operations recorded so far.
	pub fn ops(&self) -> &[HostOp] {
		&self.ops
	}

	/// Forgets the recorded operations.
	pub fn clear_ops(&mut self) {
		self.ops.clear();
	}

	/// Returns how many times `commit` was called.
	pub fn commits(&self) -> usize {
		self.commits
	}

	/// Returns the attached children of a host handle.
	pub fn children(&self, handle: Handle) -> &[Handle] {
		match self.entries.get(&handle) {
			Some(Entry::Host { children, .. }) => children,
			_ => &[],
		}
	}

	/// Returns the tag of a host handle.
	pub fn tag(&self, handle: Handle) -> Option<&str> {
		match self.entries.get(&handle)? {
			Entry::Host { tag, .. } => Some(tag),
			Entry::Text(_) => None,
		}
	}

	/// Returns the content of a text handle.
	pub fn text(&self, handle: Handle) -> Option<&str> {
		match self.entries.get(&handle)? {
			Entry::Text(text) => Some(text),
			Entry::Host { .. } => None,
		}
	}

	/// Returns the first attached host handle with `tag`, searching depth first.
	pub fn find(&self, tag: &str) -> Option<Handle> {
		let mut stack = vec![Handle::CONTAINER];
		while let Some(handle) = stack.pop() {
			if handle != Handle::CONTAINER && self.tag(handle) == Some(tag) {
				return Some(handle);
			}
			stack.extend(self.children(handle).iter().rev().copied());
		}
		None
	}

	/// Returns the handler registered for `event` on a host handle.
	///
	/// Call it outside of [`Root::with_adapter`]: handlers usually schedule updates.
	pub fn handler(&self, handle: Handle, event: &str) -> Option<EventHandler> {
		match self.entries.get(&handle)? {
			Entry::Host { props, .. } => props
				.iter()
				.find(|(key, _)| event_name(key).as_deref() == Some(event))
				.and_then(|(_, value)| value.as_handler().cloned()),
			Entry::Text(_) => None,
		}
	}

	/// Serializes the attached children of `handle` as markup.
	pub fn markup(&self, handle: Handle) -> String {
		let mut out = String::new();
		for child in self.children(handle) {
			self.write_markup(*child, &mut out);
		}
		out
	}

	fn write_markup(&self, handle: Handle, out: &mut String) {
		match self.entries.get(&handle) {
			Some(Entry::Text(text)) => out.push_str(text),
			Some(Entry::Host { tag, props, children }) => {
				let _ = write!(out, "<{tag}");
				for (key, value) in props.iter() {
					if event_name(key).is_some() {
						continue;
					}
					if let Some(value) = attribute_value(value) {
						let _ = write!(out, " {}=\"{}\"", attribute_name(key), value);
					}
				}
				out.push('>');
				for child in children {
					self.write_markup(*child, out);
				}
				let _ = write!(out, "</{tag}>");
			}
			None => {}
		}
	}

	fn allocate(&mut self, entry: Entry) -> Handle {
		let handle = Handle(self.next);
		self.next += 1;
		self.entries.insert(handle, entry);
		handle
	}

	fn children_mut(&mut self, parent: Handle) -> Result<&mut Vec<Handle>> {
		match self.entries.get_mut(&parent) {
			Some(Entry::Host { children, .. }) => Ok(children),
			Some(Entry::Text(_)) => Err(Error::adapter(RecordingError::TextParent(parent))),
			None => Err(Error::adapter(RecordingError::UnknownHandle(parent))),
		}
	}

	fn position(&mut self, parent: Handle, child: Handle) -> Result<(&mut Vec<Handle>, usize)> {
		let children = self.children_mut(parent)?;
		match children.iter().position(|candidate| *candidate == child) {
			Some(index) => Ok((children, index)),
			None => Err(Error::adapter(RecordingError::NotAChild { parent, child })),
		}
	}
}

impl HostAdapter for RecordingAdapter {
	type Native = Handle;

	fn create_host_node(&mut self, _parent: &Handle, element: &HostElement) -> Result<Handle> {
		let handle = self.allocate(Entry::Host {
			tag: element.tag.clone(),
			props: element.props.without_children(),
			children: Vec::new(),
		});
		self.ops.push(HostOp::CreateHost {
			handle,
			tag: element.tag.clone(),
		});
		Ok(handle)
	}

	fn update_host_node(&mut self, native: &Handle, previous: &Props, next: &Props) -> Result<()> {
		let changed = previous
			.changes(next)
			.into_iter()
			.map(|(key, _)| key.to_string())
			.collect();
		match self.entries.get_mut(native) {
			Some(Entry::Host { props, .. }) => *props = next.without_children(),
			_ => return Err(Error::adapter(RecordingError::UnknownHandle(*native))),
		}
		self.ops.push(HostOp::UpdateHost {
			handle: *native,
			changed,
		});
		Ok(())
	}

	fn rebind_handlers(&mut self, native: &Handle, next: &Props) -> Result<()> {
		match self.entries.get_mut(native) {
			Some(Entry::Host { props, .. }) => *props = next.without_children(),
			_ => return Err(Error::adapter(RecordingError::UnknownHandle(*native))),
		}
		Ok(())
	}

	fn create_text_node(&mut self, text: &str) -> Result<Handle> {
		let handle = self.allocate(Entry::Text(text.to_string()));
		self.ops.push(HostOp::CreateText {
			handle,
			text: text.to_string(),
		});
		Ok(handle)
	}

	fn update_text_node(&mut self, native: &Handle, text: &str) -> Result<()> {
		match self.entries.get_mut(native) {
			Some(Entry::Text(content)) => text.clone_into(content),
			_ => return Err(Error::adapter(RecordingError::UnknownHandle(*native))),
		}
		self.ops.push(HostOp::UpdateText {
			handle: *native,
			text: text.to_string(),
		});
		Ok(())
	}

	fn append_child(&mut self, parent: &Handle, child: &Handle) -> Result<()> {
		if !self.entries.contains_key(child) {
			return Err(Error::adapter(RecordingError::UnknownHandle(*child)));
		}
		self.children_mut(*parent)?.push(*child);
		self.ops.push(HostOp::Append {
			parent: *parent,
			child: *child,
		});
		Ok(())
	}

	fn replace_child(&mut self, parent: &Handle, previous: &Handle, next: &Handle) -> Result<()> {
		let (children, index) = self.position(*parent, *previous)?;
		children[index] = *next;
		self.ops.push(HostOp::Replace {
			parent: *parent,
			previous: *previous,
			next: *next,
		});
		Ok(())
	}

	fn detach(&mut self, parent: &Handle, child: &Handle) -> Result<()> {
		let (children, index) = self.position(*parent, *child)?;
		children.remove(index);
		self.ops.push(HostOp::Detach {
			parent: *parent,
			child: *child,
		});
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		self.commits += 1;
		Ok(())
	}
}
