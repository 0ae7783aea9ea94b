use actix_web::web;

use crate::configs::method_not_allowed;
use crate::modules::image::{handle, repository::ImageRepository};

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: ImageRepository + 'static,
{
    cfg.service(
        web::resource("/image")
            .route(web::get().to(handle::list_images::<R>))
            .route(web::post().to(handle::upload_image::<R>))
            .route(web::delete().to(handle::delete_image::<R>))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/images/{filename}")
            .route(web::get().to(handle::get_image::<R>))
            .default_service(web::to(method_not_allowed)),
    );
}
