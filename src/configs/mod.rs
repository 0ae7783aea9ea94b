use actix_web::{
    error::{JsonPayloadError, UrlencodedError},
    web, HttpRequest, HttpResponse,
};

use crate::{
    api::error,
    modules::{self, image::ImageRepository, image::ImageService, image::StorageConfig},
};

#[actix_web::get("/")]
async fn health_check() -> &'static str {
    "Server is running"
}

pub async fn not_found() -> Result<HttpResponse, error::Error> {
    Err(error::Error::not_found("The requested URL was not found on the server."))
}

pub async fn method_not_allowed() -> Result<HttpResponse, error::Error> {
    Err(error::Error::method_not_allowed("The method is not allowed for the requested URL."))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let err = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            error::Error::payload_too_large(err.to_string())
        }
        JsonPayloadError::ContentType => error::Error::bad_request("Request body must be JSON"),
        _ => error::Error::bad_request(err.to_string()),
    };
    err.into()
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    let err = match &err {
        UrlencodedError::Overflow { .. } => error::Error::payload_too_large(err.to_string()),
        _ => error::Error::bad_request(err.to_string()),
    };
    err.into()
}

/// Creates the storage directory if it is missing.
pub async fn prepare_storage(config: &StorageConfig) -> std::io::Result<()> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    log::info!("Serving images from {}", config.upload_dir.display());
    Ok(())
}

/// Registers shared state, body limits, routes and the fallback handler.
pub fn configure<R>(service: ImageService<R>) -> impl FnOnce(&mut web::ServiceConfig)
where
    R: ImageRepository + 'static,
{
    move |cfg| {
        let limit = service.config().max_content_length;

        cfg.app_data(web::Data::new(service.config().clone()))
            .app_data(web::Data::new(service))
            .app_data(web::JsonConfig::default().limit(limit).error_handler(json_error))
            .app_data(web::FormConfig::default().limit(limit).error_handler(form_error))
            .service(health_check)
            .configure(modules::image::route::configure::<R>)
            .default_service(web::to(not_found));
    }
}
