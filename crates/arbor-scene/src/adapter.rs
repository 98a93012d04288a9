//! Retained scene host adapter
//!
//! Host elements become scene objects (`group`, `rect`, `circle`) and text
//! becomes labels. Nothing is drawn while the reconciler mutates the scene;
//! each commit flattens the object tree into a fresh draw list, the way a
//! GPU backend would rebuild its command buffer once per frame.

use arbor_core::attributes::event_name;
use arbor_core::{Error, EventHandler, HostAdapter, HostElement, Props, Result};
use thiserror::Error;

use crate::object::{ObjectKind, SceneHandle};

/// Errors raised by the scene adapter.
#[derive(Debug, Error)]
pub enum SceneError {
	/// The tag does not name a scene object kind.
	#[error("unknown scene object kind: {0}")]
	UnknownKind(String),
	/// Labels do not take children.
	#[error("object {0} cannot have children")]
	NotAContainer(u32),
	/// The child is not attached to the parent.
	#[error("object {child} is not a child of object {parent}")]
	NotAChild {
		/// Parent object id
		parent: u32,
		/// Child object id
		child: u32,
	},
}

impl From<SceneError> for Error {
	fn from(err: SceneError) -> Self {
		Self::adapter(err)
	}
}

/// One entry of the flattened draw list, in absolute coordinates.
#[allow(missing_docs, reason = "fields mirror the object props")]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
	Rect {
		id: u32,
		x: f64,
		y: f64,
		width: f64,
		height: f64,
		fill: String,
	},
	Circle {
		id: u32,
		x: f64,
		y: f64,
		radius: f64,
		fill: String,
	},
	Text {
		id: u32,
		x: f64,
		y: f64,
		text: String,
	},
}

struct HitArea {
	command: DrawCommand,
	handler: EventHandler,
}

impl HitArea {
	fn contains(&self, px: f64, py: f64) -> bool {
		match &self.command {
			DrawCommand::Rect {
				x, y, width, height, ..
			} => px >= *x && px < x + width && py >= *y && py < y + height,
			DrawCommand::Circle { x, y, radius, .. } => (px - x).powi(2) + (py - y).powi(2) <= radius.powi(2),
			DrawCommand::Text { .. } => false,
		}
	}
}

/// Host adapter driving a retained scene.
pub struct SceneAdapter {
	stage: SceneHandle,
	next_id: u32,
	draw_list: Vec<DrawCommand>,
	hit_areas: Vec<HitArea>,
	frames: usize,
}

impl Default for SceneAdapter {
	fn default() -> Self {
		Self {
			stage: SceneHandle::new(0, ObjectKind::Stage, Props::new(), String::new()),
			next_id: 1,
			draw_list: Vec::new(),
			hit_areas: Vec::new(),
			frames: 0,
		}
	}
}

impl SceneAdapter {
	/// Creates an adapter with an empty stage.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the stage, the container to render into.
	pub fn stage(&self) -> SceneHandle {
		self.stage.clone()
	}

	/// Returns the draw list built by the last commit.
	pub fn draw_list(&self) -> &[DrawCommand] {
		&self.draw_list
	}

	/// Returns how many frames were committed.
	pub fn frames(&self) -> usize {
		self.frames
	}

	/// Returns the click handler of the topmost shape under the point.
	pub fn handler_at(&self, x: f64, y: f64) -> Option<EventHandler> {
		self.hit_areas
			.iter()
			.rev()
			.find(|area| area.contains(x, y))
			.map(|area| area.handler.clone())
	}

	fn allocate(&mut self) -> u32 {
		let id = self.next_id;
		self.next_id += 1;
		id
	}

	fn rebuild(&mut self) {
		self.draw_list.clear();
		self.hit_areas.clear();
		let stage = self.stage.clone();
		self.flatten(&stage, 0.0, 0.0);
	}

	fn flatten(&mut self, handle: &SceneHandle, x: f64, y: f64) {
		let object = handle.get();
		let (ox, oy) = match object.kind {
			ObjectKind::Stage | ObjectKind::Label => (x, y),
			_ => (x + object.number("x"), y + object.number("y")),
		};
		let fill = || object.props.get_str("fill").unwrap_or("black").to_string();
		let command = match object.kind {
			ObjectKind::Rect => Some(DrawCommand::Rect {
				id: object.id,
				x: ox,
				y: oy,
				width: object.number("width"),
				height: object.number("height"),
				fill: fill(),
			}),
			ObjectKind::Circle => Some(DrawCommand::Circle {
				id: object.id,
				x: ox,
				y: oy,
				radius: object.number("radius"),
				fill: fill(),
			}),
			ObjectKind::Label => Some(DrawCommand::Text {
				id: object.id,
				x: ox,
				y: oy,
				text: object.text.clone(),
			}),
			ObjectKind::Stage | ObjectKind::Group => None,
		};
		if let Some(command) = command {
			let handler = object
				.props
				.iter()
				.find(|(key, _)| event_name(key).as_deref() == Some("click"))
				.and_then(|(_, value)| value.as_handler().cloned());
			if let Some(handler) = handler {
				self.hit_areas.push(HitArea {
					command: command.clone(),
					handler,
				});
			}
			self.draw_list.push(command);
		}
		let children = object.children.clone();
		drop(object);
		for child in &children {
			self.flatten(child, ox, oy);
		}
	}
}

impl HostAdapter for SceneAdapter {
	type Native = SceneHandle;

	fn create_host_node(&mut self, _parent: &SceneHandle, element: &HostElement) -> Result<SceneHandle> {
		let kind = ObjectKind::from_tag(&element.tag).ok_or_else(|| SceneError::UnknownKind(element.tag.clone()))?;
		let id = self.allocate();
		tracing::debug!(id, ?kind, "create scene object");
		Ok(SceneHandle::new(id, kind, element.props.without_children(), String::new()))
	}

	fn update_host_node(&mut self, native: &SceneHandle, _previous: &Props, next: &Props) -> Result<()> {
		let mut object = native.get_mut();
		tracing::debug!(id = object.id, "update scene object");
		object.props = next.without_children();
		Ok(())
	}

	fn rebind_handlers(&mut self, native: &SceneHandle, next: &Props) -> Result<()> {
		native.get_mut().props = next.without_children();
		Ok(())
	}

	fn create_text_node(&mut self, text: &str) -> Result<SceneHandle> {
		let id = self.allocate();
		tracing::debug!(id, text, "create label");
		Ok(SceneHandle::new(id, ObjectKind::Label, Props::new(), text.to_string()))
	}

	fn update_text_node(&mut self, native: &SceneHandle, text: &str) -> Result<()> {
		text.clone_into(&mut native.get_mut().text);
		Ok(())
	}

	fn append_child(&mut self, parent: &SceneHandle, child: &SceneHandle) -> Result<()> {
		let mut object = parent.get_mut();
		if !object.kind.is_container() {
			return Err(SceneError::NotAContainer(object.id).into());
		}
		object.children.push(child.clone());
		Ok(())
	}

	fn replace_child(&mut self, parent: &SceneHandle, previous: &SceneHandle, next: &SceneHandle) -> Result<()> {
		let mut object = parent.get_mut();
		let index = object
			.children
			.iter()
			.position(|candidate| candidate.ptr_eq(previous))
			.ok_or_else(|| SceneError::NotAChild {
				parent: object.id,
				child: previous.id(),
			})?;
		object.children[index] = next.clone();
		Ok(())
	}

	fn detach(&mut self, parent: &SceneHandle, child: &SceneHandle) -> Result<()> {
		let mut object = parent.get_mut();
		let index = object
			.children
			.iter()
			.position(|candidate| candidate.ptr_eq(child))
			.ok_or_else(|| SceneError::NotAChild {
				parent: object.id,
				child: child.id(),
			})?;
		let removed = object.children.remove(index);
		tracing::debug!(id = removed.id(), "remove scene object");
		Ok(())
	}

	fn commit(&mut self) -> Result<()> {
		self.rebuild();
		self.frames += 1;
		tracing::debug!(frame = self.frames, commands = self.draw_list.len(), "frame committed");
		Ok(())
	}
}
