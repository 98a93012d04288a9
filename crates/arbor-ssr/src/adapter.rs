//! String-building host adapter

use arbor_core::{Error, HostAdapter, HostElement, Props, Result};
use thiserror::Error;

use crate::node::{SsrHandle, SsrNode, attributes};

/// Contract violations detected while building the server tree.
#[derive(Debug, Error)]
pub enum SsrError {
	/// A text node was asked to take or give up children.
	#[error("text nodes cannot have children")]
	TextParent,
	/// The child is not attached to the parent.
	#[error("node is not a child of the given parent")]
	NotAChild,
}

impl From<SsrError> for Error {
	fn from(err: SsrError) -> Self {
		Self::adapter(err)
	}
}

/// Host adapter building an [`SsrNode`] tree; no event binding.
#[derive(Debug, Default)]
pub struct SsrAdapter {
	created: usize,
}

impl SsrAdapter {
	/// Creates an adapter.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns how many nodes were created.
	pub fn created(&self) -> usize {
		self.created
	}
}

fn with_children<R>(parent: &SsrHandle, f: impl FnOnce(&mut Vec<SsrHandle>) -> R) -> Result<R> {
	parent.with_node_mut(|node| match node {
		SsrNode::Element { children, .. } => Ok(f(children)),
		SsrNode::Text { .. } => Err(SsrError::TextParent.into()),
	})
}

fn position(children: &[SsrHandle], child: &SsrHandle) -> Result<usize> {
	children
		.iter()
		.position(|candidate| candidate.ptr_eq(child))
		.ok_or_else(|| SsrError::NotAChild.into())
}

impl HostAdapter for SsrAdapter {
	type Native = SsrHandle;

	fn create_host_node(&mut self, _parent: &SsrHandle, element: &HostElement) -> Result<SsrHandle> {
		self.created += 1;
		Ok(SsrHandle::element(element.tag.as_str(), &element.props))
	}

	fn update_host_node(&mut self, native: &SsrHandle, _previous: &Props, next: &Props) -> Result<()> {
		native.with_node_mut(|node| match node {
			SsrNode::Element { attributes: current, .. } => {
				*current = attributes(next);
				Ok(())
			}
			SsrNode::Text { .. } => Err(SsrError::TextParent.into()),
		})
	}

	// Markup carries no listeners.
	fn rebind_handlers(&mut self, _native: &SsrHandle, _next: &Props) -> Result<()> {
		Ok(())
	}

	fn create_text_node(&mut self, text: &str) -> Result<SsrHandle> {
		self.created += 1;
		Ok(SsrHandle::text(text))
	}

	fn update_text_node(&mut self, native: &SsrHandle, text: &str) -> Result<()> {
		native.with_node_mut(|node| {
			if let SsrNode::Text { text: current } = node {
				text.clone_into(current);
			}
		});
		Ok(())
	}

	fn append_child(&mut self, parent: &SsrHandle, child: &SsrHandle) -> Result<()> {
		with_children(parent, |children| children.push(child.clone()))
	}

	fn replace_child(&mut self, parent: &SsrHandle, previous: &SsrHandle, next: &SsrHandle) -> Result<()> {
		with_children(parent, |children| {
			let index = position(children, previous)?;
			children[index] = next.clone();
			Ok(())
		})?
	}

	fn detach(&mut self, parent: &SsrHandle, child: &SsrHandle) -> Result<()> {
		with_children(parent, |children| {
			let index = position(children, child)?;
			children.remove(index);
			Ok(())
		})?
	}
}
