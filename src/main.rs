use actix_web::{middleware::Logger, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::modules::image::{ImageFsRepository, ImageService, StorageConfig};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = StorageConfig::from_env(&ENV);
    configs::prepare_storage(&config).await?;

    let image_repo = ImageFsRepository::new(config.upload_dir.clone());
    let image_service = ImageService::new(Arc::new(image_repo), config);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new().wrap(Logger::default()).configure(configs::configure(image_service.clone()))
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
