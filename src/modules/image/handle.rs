use actix_files::NamedFile;
use actix_web::web;
use std::collections::HashMap;

use crate::api::{error, success::Success};
use crate::modules::image::{
    repository::ImageRepository,
    schema::{DeleteImageRequest, FileInfo, FileList, UploadImageForm},
    service::ImageService,
};
use crate::utils::{FormFields, ValidatedJson};

/// Upload image handler
pub async fn upload_image<R>(
    form: FormFields,
    service: web::Data<ImageService<R>>,
) -> Result<Success<FileInfo>, error::Error>
where
    R: ImageRepository + 'static,
{
    if form.0.is_empty() {
        return Err(error::Error::bad_request("Missing file in data payload"));
    }

    let info = service.upload(UploadImageForm::from(form.0)).await?;
    Ok(Success::ok(info))
}

/// List images handler
pub async fn list_images<R>(
    service: web::Data<ImageService<R>>,
) -> Result<Success<FileList>, error::Error>
where
    R: ImageRepository + 'static,
{
    let files = service.list().await?;
    Ok(Success::ok(FileList { files }))
}

/// Delete image handler
pub async fn delete_image<R>(
    body: ValidatedJson<DeleteImageRequest>,
    service: web::Data<ImageService<R>>,
) -> Result<Success<HashMap<String, &'static str>>, error::Error>
where
    R: ImageRepository + 'static,
{
    // presence is guaranteed by validation
    let file_name = body.0.file.unwrap_or_default();

    service.delete(&file_name).await?;
    Ok(Success::ok(HashMap::from([(file_name, "True")])))
}

/// Serve raw image bytes handler
pub async fn get_image<R>(
    file_name: web::Path<String>,
    service: web::Data<ImageService<R>>,
) -> Result<NamedFile, error::Error>
where
    R: ImageRepository + 'static,
{
    let path = service.locate(&file_name).await?;
    let content_type = mime_guess::from_path(&path).first_or_octet_stream();

    let file = NamedFile::open_async(&path)
        .await
        .map_err(|_| error::Error::not_found("Image file not found"))?
        .set_content_type(content_type)
        .use_last_modified(true);

    Ok(file)
}
