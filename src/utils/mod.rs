use actix_multipart::Multipart;
use actix_web::{web, FromRequest, HttpMessage};
use futures_util::{future::LocalBoxFuture, TryStreamExt};
use std::{collections::HashMap, time::SystemTime};
use unicode_normalization::UnicodeNormalization;
use validator::{Validate, ValidationErrors};

use crate::{
    api::error,
    constants::{ALLOWED_EXTENSIONS, DEFAULT_MAX_CONTENT_LENGTH},
    modules::image::{model::StorageConfig, repository::ImageRepository},
};

/// Reduces an arbitrary client-supplied name to a flat, ASCII-only file name.
///
/// Accented letters are decomposed (NFKD) to their ASCII base before
/// non-ASCII is dropped. `/` becomes a word break, whitespace runs collapse into `_`,
/// anything outside `[A-Za-z0-9_.-]` is dropped and leading/trailing `.`/`_`
/// are trimmed, so the result can never escape the storage directory.
/// May return an empty string.
pub fn secure_filename(name: &str) -> String {
    let ascii: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

pub fn allowed_file(file_name: &str) -> bool {
    file_name.rsplit_once('.').is_some_and(|(_, ext)| {
        let ext = ext.to_ascii_lowercase();
        ALLOWED_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Splits `name` into stem and extension (extension keeps its dot).
/// Leading dots belong to the stem: `.jpg` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    let leading = name.len() - name.trim_start_matches('.').len();
    match name[leading..].rfind('.') {
        Some(idx) => name.split_at(leading + idx),
        None => (name, ""),
    }
}

/// Returns `file_name` if it is free in the repository, otherwise the first
/// free `stem_N.ext` for N = 1, 2, ...
pub async fn gen_file_name<R>(repo: &R, file_name: &str) -> String
where
    R: ImageRepository + ?Sized,
{
    let (stem, ext) = split_extension(file_name);
    let mut candidate = file_name.to_string();
    let mut i = 1;

    while repo.exists(&candidate).await {
        candidate = format!("{stem}_{i}{ext}");
        i += 1;
    }

    candidate
}

/// A single path component: no separators, not `.` or `..`.
pub fn is_plain_file_name(file_name: &str) -> bool {
    !file_name.is_empty()
        && file_name != "."
        && file_name != ".."
        && !file_name.contains(['/', '\\', '\0'])
}

pub fn format_timestamp(time: SystemTime) -> String {
    chrono::DateTime::<chrono::Local>::from(time).format("%Y-%m-%d %H:%M:%S").to_string()
}

fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest for ValidatedJson<T>
where
    T: Validate + serde::de::DeserializeOwned + 'static,
{
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let fut = web::Json::<T>::from_request(req, payload);

        Box::pin(async move {
            // Body errors are already translated by the JsonConfig error handler.
            let model = fut.await?.into_inner();
            model.validate().map_err(|e| error::Error::bad_request(first_message(&e)))?;
            Ok(ValidatedJson(model))
        })
    }
}

/// Text fields of a form body, either urlencoded or multipart.
///
/// A request without a form content type yields an empty set of fields.
pub struct FormFields(pub HashMap<String, String>);

impl FromRequest for FormFields {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let essence = match req.mime_type() {
            Ok(Some(mime)) => mime.essence_str().to_string(),
            _ => String::new(),
        };

        match essence.as_str() {
            "multipart/form-data" => {
                let limit = req
                    .app_data::<web::Data<StorageConfig>>()
                    .map(|cfg| cfg.max_content_length)
                    .unwrap_or(DEFAULT_MAX_CONTENT_LENGTH);
                let multipart = Multipart::new(req.headers(), payload.take());
                Box::pin(read_multipart(multipart, limit))
            }
            "application/x-www-form-urlencoded" => {
                let fut = web::Form::<HashMap<String, String>>::from_request(req, payload);
                Box::pin(async move { Ok(FormFields(fut.await?.into_inner())) })
            }
            _ => Box::pin(async { Ok(FormFields(HashMap::new())) }),
        }
    }
}

async fn read_multipart(
    mut multipart: Multipart,
    limit: usize,
) -> Result<FormFields, actix_web::Error> {
    let mut fields = HashMap::new();
    let mut total = 0usize;

    while let Some(mut field) =
        multipart.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
    {
        let disposition = field.content_disposition();
        // file parts are not form fields
        let is_file = disposition.and_then(|cd| cd.get_filename()).is_some();
        let name = disposition.and_then(|cd| cd.get_name()).map(str::to_string);

        let mut value = Vec::new();
        while let Some(chunk) =
            field.try_next().await.map_err(|e| error::Error::bad_request(e.to_string()))?
        {
            total += chunk.len();
            if total > limit {
                return Err(error::Error::payload_too_large(format!(
                    "Request body exceeds maximum allowed size of {limit} bytes"
                ))
                .into());
            }
            if !is_file {
                value.extend_from_slice(&chunk);
            }
        }

        if is_file {
            continue;
        }

        if let Some(name) = name {
            let text = String::from_utf8(value).map_err(|_| {
                error::Error::bad_request(format!("Form field '{name}' is not valid UTF-8"))
            })?;
            fields.insert(name, text);
        }
    }

    Ok(FormFields(fields))
}
