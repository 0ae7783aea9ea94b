use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use crate::{modules::image::model::ImageMeta, utils::format_timestamp};

/// File Info projection returned by upload and list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub file_name: String,
    pub size: u64,
    pub last_modification_time: String,
}

impl From<ImageMeta> for FileInfo {
    fn from(meta: ImageMeta) -> Self {
        Self {
            file_name: meta.file_name,
            size: meta.size,
            last_modification_time: format_timestamp(meta.modified),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileList {
    pub files: Vec<FileInfo>,
}

/// Upload form: `filename` plus base64 `data`
#[derive(Debug, Default)]
pub struct UploadImageForm {
    pub filename: Option<String>,
    pub data: Option<String>,
}

impl From<HashMap<String, String>> for UploadImageForm {
    fn from(mut fields: HashMap<String, String>) -> Self {
        Self { filename: fields.remove("filename"), data: fields.remove("data") }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DeleteImageRequest {
    #[validate(
        required(message = "Missing required key 'file'"),
        length(min = 1, message = "Missing required key 'file'")
    )]
    pub file: Option<String>,
}
