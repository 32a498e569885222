//! Storage traits
//!
//! The crawler deduplicates by filename alone, so the store only needs to
//! answer "does this name exist" and "write these bytes under this name".

use async_trait::async_trait;
use std::io;

/// Destination for downloaded images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Returns true if a file with this name is already stored
    async fn exists(&self, filename: &str) -> io::Result<bool>;

    /// Stores the bytes under the given name
    ///
    /// A failed write must not leave a file behind that `exists` would report.
    async fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<()>;

    /// Human-readable location of a stored file, for logs
    fn location(&self, filename: &str) -> String;
}
