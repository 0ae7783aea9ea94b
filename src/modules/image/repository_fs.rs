use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::{
    api::error,
    modules::image::{
        model::{ImageMeta, NewImage},
        repository::ImageRepository,
    },
};

/// Flat directory of image files; all metadata is read live from disk.
#[derive(Clone)]
pub struct ImageFsRepository {
    root: PathBuf,
}

impl ImageFsRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }
}

#[async_trait::async_trait]
impl ImageRepository for ImageFsRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn exists(&self, file_name: &str) -> bool {
        tokio::fs::try_exists(self.path_of(file_name)).await.unwrap_or_else(|err| {
            log::debug!("Existence check of {file_name:?} failed: {err}");
            false
        })
    }

    async fn is_file(&self, file_name: &str) -> bool {
        match tokio::fs::metadata(self.path_of(file_name)).await {
            Ok(meta) => meta.is_file(),
            Err(err) => {
                log::debug!("Lookup of {file_name:?} failed: {err}");
                false
            }
        }
    }

    async fn list_names(&self) -> Result<Vec<String>, error::SystemError> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::warn!("Skipping non UTF-8 entry {raw:?}"),
            }
        }

        Ok(names)
    }

    async fn metadata(&self, file_name: &str) -> Result<ImageMeta, error::SystemError> {
        let meta = tokio::fs::metadata(self.path_of(file_name)).await?;

        Ok(ImageMeta { file_name: file_name.to_string(), size: meta.len(), modified: meta.modified()? })
    }

    async fn create_new(&self, image: &NewImage) -> Result<ImageMeta, error::SystemError> {
        let path = self.path_of(&image.file_name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::AlreadyExists => error::SystemError::conflict(format!(
                    "File '{}' already exists",
                    image.file_name
                )),
                _ => error::SystemError::from(err),
            })?;

        file.write_all(&image.bytes).await?;
        file.flush().await?;
        drop(file);

        self.metadata(&image.file_name).await
    }

    async fn remove(&self, file_name: &str) -> Result<(), error::SystemError> {
        let path = self.path_of(file_name);

        tokio::fs::remove_file(&path).await.map_err(|source| error::SystemError::Delete {
            path: path.display().to_string(),
            source,
        })
    }
}
