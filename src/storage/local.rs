use crate::storage::ImageStore;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of in-progress downloads
const PARTIAL_SUFFIX: &str = ".part";

/// Image store backed by a local directory
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    /// Opens the directory, creating it if needed
    pub async fn open(root: impl AsRef<Path>) -> io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn exists(&self, filename: &str) -> io::Result<bool> {
        tokio::fs::try_exists(self.path_for(filename)).await
    }

    async fn write(&self, filename: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.path_for(filename);
        let partial = self.path_for(&format!("{}{}", filename, PARTIAL_SUFFIX));

        if let Err(e) = tokio::fs::write(&partial, bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &target).await
    }

    fn location(&self, filename: &str) -> String {
        self.path_for(filename).display().to_string()
    }
}
