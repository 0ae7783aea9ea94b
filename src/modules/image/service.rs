use base64::{prelude::BASE64_STANDARD, Engine};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::error;
use crate::modules::image::{
    model::{NewImage, StorageConfig},
    repository::ImageRepository,
    schema::{FileInfo, UploadImageForm},
};
use crate::utils::{allowed_file, gen_file_name, is_plain_file_name, secure_filename};

pub struct ImageService<R>
where
    R: ImageRepository,
{
    image_repo: Arc<R>,
    config: StorageConfig,
}

impl<R> Clone for ImageService<R>
where
    R: ImageRepository,
{
    fn clone(&self) -> Self {
        Self { image_repo: Arc::clone(&self.image_repo), config: self.config.clone() }
    }
}

impl<R> ImageService<R>
where
    R: ImageRepository,
{
    pub fn new(image_repo: Arc<R>, config: StorageConfig) -> Self {
        Self { image_repo, config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Sanitize, disambiguate and check the extension of the requested name
    async fn prepare_file_name(&self, file_name: Option<&str>) -> Result<String, error::SystemError> {
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| error::SystemError::bad_request("Missing required key in data: 'filename'"))?;

        let secure_name = secure_filename(file_name);
        let final_name = gen_file_name(self.image_repo.as_ref(), &secure_name).await;

        if !allowed_file(&final_name) {
            return Err(error::SystemError::bad_request("File type not allowed"));
        }

        Ok(final_name)
    }

    /// Decode the base64 payload, ignoring MIME line breaks
    fn prepare_file_body(&self, data: Option<&str>) -> Result<Vec<u8>, error::SystemError> {
        let data = data
            .filter(|data| !data.is_empty())
            .ok_or_else(|| error::SystemError::bad_request("Missing required key in data: 'data'"))?;

        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = BASE64_STANDARD.decode(compact.as_bytes())?;

        Ok(bytes)
    }

    /// Store an uploaded image under a fresh, non-colliding name
    pub async fn upload(&self, form: UploadImageForm) -> Result<FileInfo, error::SystemError> {
        let file_name = self.prepare_file_name(form.filename.as_deref()).await?;
        let bytes = self.prepare_file_body(form.data.as_deref())?;

        let meta = self.image_repo.create_new(&NewImage { file_name, bytes }).await?;
        log::info!("Stored image {} ({} bytes)", meta.file_name, meta.size);

        Ok(FileInfo::from(meta))
    }

    pub async fn is_image_file(&self, file_name: &str) -> bool {
        is_plain_file_name(file_name)
            && allowed_file(file_name)
            && self.image_repo.is_file(file_name).await
    }

    /// File Info for every stored image, in directory order
    pub async fn list(&self) -> Result<Vec<FileInfo>, error::SystemError> {
        let names = self.image_repo.list_names().await?;
        let mut files = Vec::with_capacity(names.len());

        for name in names {
            if !self.is_image_file(&name).await {
                continue;
            }
            let meta = self.image_repo.metadata(&name).await?;
            files.push(FileInfo::from(meta));
        }

        Ok(files)
    }

    /// Path of a servable image
    pub async fn locate(&self, file_name: &str) -> Result<PathBuf, error::SystemError> {
        if !self.is_image_file(file_name).await {
            return Err(error::SystemError::not_found("Image file not found"));
        }

        Ok(self.image_repo.root().join(file_name))
    }

    pub async fn delete(&self, file_name: &str) -> Result<(), error::SystemError> {
        if !is_plain_file_name(file_name) {
            return Err(error::SystemError::bad_request("Invalid file name"));
        }

        self.image_repo.remove(file_name).await?;
        log::info!("Deleted image {file_name}");

        Ok(())
    }
}
