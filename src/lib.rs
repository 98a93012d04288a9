//! # Arbor
//!
//! A component-based UI rendering engine. Applications describe their UI as
//! element trees returned by component render functions; Arbor keeps a
//! persistent node tree mirroring the last render, reconciles it against each
//! new render, and drives a pluggable host backend with the minimal set of
//! changes.
//!
//! ## Feature Flags
//!
//! - `full` (default) - every backend
//! - `dom` - direct DOM backend with hydration ([`dom`])
//! - `ssr` - string building backend for server-side rendering ([`ssr`])
//! - `scene` - retained scene graph backend ([`scene`])
//! - `testing` - the recording adapter of `arbor_core::testing`
//!
//! ## Example
//!
//! ```rust,ignore
//! use arbor::prelude::*;
//!
//! fn counter(scope: &mut Scope<'_>, _: &Props) -> RenderResult {
//!     let (count, set_count) = scope.use_state(|| 0)?;
//!     Ok(Some(create_element(
//!         "button",
//!         Props::new().on("click", move |_| set_count.update(|n| n + 1)),
//!         ["Clicked ".into(), Child::from(count), " times!".into()],
//!     )))
//! }
//!
//! const COUNTER: Component = Component::new("Counter", counter);
//!
//! let html = arbor::render_to_string(create_element(COUNTER, Props::new(), no_children()))?;
//! ```

#[cfg(feature = "dom")]
pub mod dom;
#[cfg(feature = "scene")]
pub mod scene;
#[cfg(feature = "ssr")]
pub mod ssr;

pub use arbor_core::*;

#[cfg(feature = "dom")]
pub use arbor_dom::{hydrate, render};
#[cfg(feature = "ssr")]
pub use arbor_ssr::render_to_string;

/// Commonly used items.
pub mod prelude {
	pub use arbor_core::prelude::*;
	pub use arbor_core::{Child, Component, RenderResult, Scope, StateSetter};

	#[cfg(feature = "dom")]
	pub use arbor_dom::{hydrate, render};
	#[cfg(feature = "ssr")]
	pub use arbor_ssr::render_to_string;
}
