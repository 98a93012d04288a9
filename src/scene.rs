//! Retained scene graph backend

// Re-export all arbor-scene functionality
pub use arbor_scene::*;
