use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Method Not Allowed: {0}")]
    MethodNotAllowed(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal Server Error: {0}")]
    InternalServer(Cow<'static, str>),
}

/// Uniform error body: `{code, name, description}`.
#[derive(serde::Serialize, serde::Deserialize, Debug)]
pub struct ErrorBody {
    pub code: u16,
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn method_not_allowed(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::MethodNotAllowed(msg.into())
    }

    pub fn payload_too_large(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::MethodNotAllowed(msg)
            | Error::Conflict(msg)
            | Error::PayloadTooLarge(msg)
            | Error::InternalServer(msg) => msg,
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let name = status.canonical_reason().unwrap_or("Unknown Error");

        HttpResponse::build(status).json(ErrorBody {
            code: status.as_u16(),
            name: name.into(),
            description: self.message().to_string().into(),
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // io errors
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    // base64 errors
    #[error("invalid data in base64: {0}")]
    Decode(#[from] base64::DecodeError),
    // Custom Errors
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Conflict: {0}")]
    Conflict(Cow<'static, str>),
    // removal failures keep the OS message and the path
    #[error("deleting error: {}: '{}'", os_error_text(.source), .path)]
    Delete { path: String, source: std::io::Error },
}

/// `[Errno N] <strerror>` for OS errors, plain display otherwise.
fn os_error_text(err: &std::io::Error) -> String {
    let text = err.to_string();
    match err.raw_os_error() {
        Some(code) => {
            let strerror = text.strip_suffix(&format!(" (os error {code})")).unwrap_or(&text);
            format!("[Errno {code}] {strerror}")
        }
        None => text,
    }
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::Conflict(msg) => Error::Conflict(msg),
            SystemError::Decode(err) => {
                Error::BadRequest(format!("invalid data in base64: {err}").into())
            }
            SystemError::Delete { .. } => {
                log::error!("{value}");
                Error::InternalServer(value.to_string().into())
            }
            SystemError::Io(err) => {
                log::error!("Internal Server Error: {err:?}");
                Error::InternalServer(err.to_string().into())
            }
        }
    }
}

impl SystemError {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::Conflict(msg.into())
    }
}
