//! Storage module for downloaded wallpapers
//!
//! This module handles:
//! - Existence checks used for filename-based deduplication
//! - Writing image bytes without leaving partial files under the final name

mod local;
mod traits;

pub use local::LocalImageStore;
pub use traits::ImageStore;
