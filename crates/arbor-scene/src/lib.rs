//! Arbor Scene - retained scene graph backend
//!
//! A host adapter for a non-DOM target: host elements become shapes of a
//! retained scene and every committed update pass produces a flat draw list,
//! ready for a canvas or GPU renderer. Clicks are hit-tested against the
//! shapes of the last frame.
//!
//! ```ignore
//! let root = arbor_scene::render(create_element("rect", Props::new().set("width", 10), no_children()))?;
//! root.with_adapter(|scene| println!("{:?}", scene.draw_list()));
//! ```

#![warn(missing_docs)]

pub mod adapter;
pub mod object;

pub use adapter::{DrawCommand, SceneAdapter, SceneError};
pub use object::{ObjectKind, SceneHandle, SceneObject};

use arbor_core::{Element, Event, Result, Root, RootConfig};

/// Mounts `element` on the stage of a new scene.
pub fn render(element: Element) -> Result<Root<SceneAdapter>> {
	let adapter = SceneAdapter::new();
	let stage = adapter.stage();
	let root = Root::with_config(adapter, stage, RootConfig::new().name("scene"));
	root.render(element)?;
	Ok(root)
}

/// Delivers a click at `(x, y)` to the topmost shape with a click handler.
///
/// Returns false if no shape was hit.
pub fn click(root: &Root<SceneAdapter>, x: f64, y: f64) -> bool {
	let Some(handler) = root.with_adapter(|scene| scene.handler_at(x, y)) else {
		return false;
	};
	handler.call(&Event::new("click"));
	true
}
