//! Server-side rendering
//!
//! ```rust,ignore
//! let html = arbor::ssr::render_to_string_with(element, &SsrOptions::new().doctype(true))?;
//! ```

// Re-export all arbor-ssr functionality
pub use arbor_ssr::*;
