//! Direct DOM backend
//!
//! Renders into DOM containers (the page document on `wasm32`, an in-memory
//! DOM elsewhere) and hydrates server-rendered markup.
//!
//! ```rust,ignore
//! use arbor::dom::Document;
//!
//! let container = Document::current()?.create_element("div")?;
//! let root = arbor::render(create_element(App, Props::new(), no_children()), &container)?;
//! ```

// Re-export all arbor-dom functionality
pub use arbor_dom::*;
