//! Scene objects

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use arbor_core::Props;

/// Kind of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
	/// The stage every root renders into
	Stage,
	/// Offsets its children by its `x`/`y`
	Group,
	/// Filled rectangle (`x`, `y`, `width`, `height`, `fill`)
	Rect,
	/// Filled circle (`x`, `y`, `radius`, `fill`)
	Circle,
	/// Text drawn at the offset of its parent
	Label,
}

impl ObjectKind {
	/// Maps a host tag to an object kind.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"group" => Some(Self::Group),
			"rect" => Some(Self::Rect),
			"circle" => Some(Self::Circle),
			_ => None,
		}
	}

	/// Returns true if objects of this kind take children.
	pub fn is_container(self) -> bool {
		matches!(self, Self::Stage | Self::Group | Self::Rect | Self::Circle)
	}
}

/// A retained scene object.
pub struct SceneObject {
	pub(crate) id: u32,
	pub(crate) kind: ObjectKind,
	pub(crate) props: Props,
	pub(crate) text: String,
	pub(crate) children: Vec<SceneHandle>,
}

impl SceneObject {
	/// Returns the object id.
	pub fn id(&self) -> u32 {
		self.id
	}

	/// Returns the object kind.
	pub fn kind(&self) -> ObjectKind {
		self.kind
	}

	/// Returns the props the object was last updated with.
	pub fn props(&self) -> &Props {
		&self.props
	}

	/// Returns the text of a label.
	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the attached children.
	pub fn children(&self) -> &[SceneHandle] {
		&self.children
	}

	pub(crate) fn number(&self, key: &str) -> f64 {
		self.props.get_number(key).unwrap_or(0.0)
	}
}

/// Shared handle to a [`SceneObject`].
#[derive(Clone)]
pub struct SceneHandle(Rc<RefCell<SceneObject>>);

impl SceneHandle {
	pub(crate) fn new(id: u32, kind: ObjectKind, props: Props, text: String) -> Self {
		Self(Rc::new(RefCell::new(SceneObject {
			id,
			kind,
			props,
			text,
			children: Vec::new(),
		})))
	}

	/// Borrows the object.
	pub fn get(&self) -> Ref<'_, SceneObject> {
		self.0.borrow()
	}

	pub(crate) fn get_mut(&self) -> RefMut<'_, SceneObject> {
		self.0.borrow_mut()
	}

	/// Returns the object id.
	pub fn id(&self) -> u32 {
		self.0.borrow().id
	}

	/// Returns true if both handles refer to the same object.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}

impl fmt::Debug for SceneHandle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let object = self.0.borrow();
		f.debug_struct("SceneHandle")
			.field("id", &object.id)
			.field("kind", &object.kind)
			.field("children", &object.children.len())
			.finish()
	}
}
