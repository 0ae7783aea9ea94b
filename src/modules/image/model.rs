use std::{path::PathBuf, time::SystemTime};

use crate::constants::{Env, DEFAULT_MAX_CONTENT_LENGTH, DEFAULT_UPLOAD_FOLDER};

/// Decoded upload, ready to be written under its final name
#[derive(Debug, Clone)]
pub struct NewImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Filesystem attributes of a stored image
#[derive(Debug, Clone)]
pub struct ImageMeta {
    pub file_name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Image storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_content_length: usize,
}

impl StorageConfig {
    pub fn from_env(env: &Env) -> Self {
        Self {
            upload_dir: PathBuf::from(&env.upload_folder),
            max_content_length: env.max_content_length,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH, // 50MB
        }
    }
}
