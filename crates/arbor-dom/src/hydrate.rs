//! Hydration cursor
//!
//! Walks the existing children of a container in document order (first
//! child, else next sibling, else the next sibling of the closest ancestor
//! that has one) and hands out nodes in the order the reconciler creates
//! them. Comments are skipped, which also drops the separators the string
//! renderer puts between adjacent text nodes.

use crate::dom::{DomNode, NodeType};
use crate::error::DomError;

pub(crate) struct Hydration {
	container: DomNode,
	next: Option<DomNode>,
	claimed: usize,
}

impl Hydration {
	pub(crate) fn new(container: &DomNode) -> Self {
		Self {
			container: container.clone(),
			next: container.first_child(),
			claimed: 0,
		}
	}

	/// Claims the next node, which must be an element named `tag`.
	pub(crate) fn claim_element(&mut self, tag: &str) -> Result<DomNode, DomError> {
		let expected = || format!("<{tag}>");
		let node = self.take().ok_or_else(|| DomError::HydrationExhausted { expected: expected() })?;
		if !node.tag_name().is_some_and(|found| found.eq_ignore_ascii_case(tag)) {
			return Err(DomError::HydrationMismatch {
				expected: expected(),
				found: describe(&node),
			});
		}
		self.next = node.first_child().or_else(|| self.following(&node));
		self.claimed += 1;
		tracing::debug!(tag, "claimed element");
		Ok(node)
	}

	/// Claims the next node, which must be a text node; its content is corrected to `text`.
	pub(crate) fn claim_text(&mut self, text: &str) -> Result<DomNode, DomError> {
		let node = self.take().ok_or_else(|| DomError::HydrationExhausted {
			expected: "#text".to_string(),
		})?;
		if node.node_type() != NodeType::Text {
			return Err(DomError::HydrationMismatch {
				expected: "#text".to_string(),
				found: describe(&node),
			});
		}
		if node.text_content() != text {
			tracing::warn!(expected = text, found = %node.text_content(), "hydrated text differs; patched");
			node.set_text(text);
		}
		self.next = self.following(&node);
		self.claimed += 1;
		Ok(node)
	}

	/// Inserts a node that has no existing counterpart at the cursor position.
	pub(crate) fn place(&mut self, parent: &DomNode, child: &DomNode) -> Result<(), DomError> {
		self.skip_ignored();
		let reference = self
			.next
			.as_ref()
			.filter(|next| next.parent_node().is_some_and(|owner| owner.is_same_node(parent)));
		parent.insert_before(child, reference)
	}

	/// Ends hydration; returns the first node nothing claimed.
	pub(crate) fn finish(mut self) -> Option<DomNode> {
		self.skip_ignored();
		tracing::debug!(claimed = self.claimed, "hydration finished");
		self.next
	}

	fn take(&mut self) -> Option<DomNode> {
		self.skip_ignored();
		self.next.take()
	}

	fn skip_ignored(&mut self) {
		while let Some(node) = self.next.take() {
			if node.node_type() != NodeType::Other {
				self.next = Some(node);
				return;
			}
			self.next = self.following(&node);
		}
	}

	fn following(&self, node: &DomNode) -> Option<DomNode> {
		let mut current = node.clone();
		loop {
			if let Some(sibling) = current.next_sibling() {
				return Some(sibling);
			}
			let parent = current.parent_node()?;
			if parent.is_same_node(&self.container) {
				return None;
			}
			current = parent;
		}
	}
}

pub(crate) fn describe(node: &DomNode) -> String {
	match node.node_type() {
		NodeType::Element => format!("<{}>", node.tag_name().unwrap_or_default()),
		NodeType::Text => format!("text {:?}", node.text_content()),
		NodeType::Other => "#comment".to_string(),
	}
}
