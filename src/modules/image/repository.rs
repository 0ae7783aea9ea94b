use std::path::Path;

use crate::{
    api::error,
    modules::image::model::{ImageMeta, NewImage},
};

#[async_trait::async_trait]
pub trait ImageRepository: Send + Sync {
    /// Directory the images live in
    fn root(&self) -> &Path;

    /// True if any entry of that name exists; lookup failures count as absent.
    async fn exists(&self, file_name: &str) -> bool;

    /// True only for an existing regular file; lookup failures count as absent.
    async fn is_file(&self, file_name: &str) -> bool;

    /// Entry names in enumeration order, unfiltered.
    async fn list_names(&self) -> Result<Vec<String>, error::SystemError>;

    async fn metadata(&self, file_name: &str) -> Result<ImageMeta, error::SystemError>;

    /// Writes a new file; fails with `Conflict` instead of overwriting.
    async fn create_new(&self, image: &NewImage) -> Result<ImageMeta, error::SystemError>;

    async fn remove(&self, file_name: &str) -> Result<(), error::SystemError>;
}
