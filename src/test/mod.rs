use actix_web::{http::header, http::StatusCode, test, App};
use base64::{prelude::BASE64_STANDARD, Engine};
use serde_json::json;
use std::{collections::HashMap, path::Path, sync::Arc};

use crate::{
    api::error::ErrorBody,
    configs,
    modules::image::{
        schema::{FileInfo, FileList},
        ImageFsRepository, ImageService, StorageConfig,
    },
    utils::{format_timestamp, gen_file_name},
};

const FILE_NAMES: [&str; 2] = ["photo.jpg", "photo_1.jpg"];

// JPEG SOI/APP0 marker followed by filler
const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9];

fn images_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (i, name) in FILE_NAMES.iter().enumerate() {
        let mut bytes = JPEG_BYTES.to_vec();
        bytes.extend(std::iter::repeat(0xAB).take(i + 1));
        std::fs::write(dir.path().join(name), bytes).unwrap();
    }
    dir
}

fn image_service(dir: &Path, max_content_length: usize) -> ImageService<ImageFsRepository> {
    let config = StorageConfig { upload_dir: dir.to_path_buf(), max_content_length };
    ImageService::new(Arc::new(ImageFsRepository::new(dir)), config)
}

macro_rules! init_app {
    ($dir:expr) => {
        init_app!($dir, crate::constants::DEFAULT_MAX_CONTENT_LENGTH)
    };
    ($dir:expr, $limit:expr) => {
        test::init_service(App::new().configure(configs::configure(image_service($dir, $limit))))
            .await
    };
}

#[actix_web::test]
async fn health_check_responds() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, "Server is running");
}

#[actix_web::test]
async fn list_reports_size_and_local_mtime() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/image").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: FileList = test::read_body_json(resp).await;
    assert_eq!(body.files.len(), FILE_NAMES.len());

    for file in body.files {
        let meta = std::fs::metadata(dir.path().join(&file.file_name)).unwrap();
        assert_eq!(file.size, meta.len());
        assert_eq!(file.last_modification_time, format_timestamp(meta.modified().unwrap()));
    }
}

#[actix_web::test]
async fn get_serves_exact_bytes_as_jpeg() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    for name in FILE_NAMES {
        let req = test::TestRequest::get().uri(&format!("/images/{name}")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/jpeg");

        let expected = std::fs::read(dir.path().join(name)).unwrap();
        assert_eq!(test::read_body(resp).await, expected);
    }
}

#[actix_web::test]
async fn post_get_delete_round_trip() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let file_name = "photo_1.jpg";
    let future_name = gen_file_name(&ImageFsRepository::new(dir.path()), file_name).await;
    let img_data = std::fs::read(dir.path().join(file_name)).unwrap();
    let encoded = BASE64_STANDARD.encode(&img_data);

    let req = test::TestRequest::post()
        .uri("/image")
        .set_form([("filename", file_name), ("data", encoded.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let posted: FileInfo = test::read_body_json(resp).await;
    assert_eq!(posted.file_name, future_name);
    assert_eq!(posted.size, img_data.len() as u64);

    let req = test::TestRequest::get().uri("/image").to_request();
    let listed: FileList = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.files.len(), FILE_NAMES.len() + 1);

    let req = test::TestRequest::get().uri(&format!("/images/{}", posted.file_name)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(test::read_body(resp).await, img_data);

    let req = test::TestRequest::delete()
        .uri("/image")
        .set_json(json!({ "file": posted.file_name }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let deleted: HashMap<String, String> = test::read_body_json(resp).await;
    assert_eq!(deleted.get(&posted.file_name).map(String::as_str), Some("True"));

    let req = test::TestRequest::get().uri("/image").to_request();
    let listed: FileList = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.files.len(), FILE_NAMES.len());
}

#[actix_web::test]
async fn multipart_upload_is_accepted() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let encoded = BASE64_STANDARD.encode(JPEG_BYTES);
    let body = format!(
        "--XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"filename\"\r\n\r\n\
         upload.jpeg\r\n\
         --XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"data\"\r\n\r\n\
         {encoded}\r\n\
         --XBOUNDARYX--\r\n"
    );

    let req = test::TestRequest::post()
        .uri("/image")
        .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARYX"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let posted: FileInfo = test::read_body_json(resp).await;
    assert_eq!(posted.file_name, "upload.jpeg");
    assert_eq!(std::fs::read(dir.path().join("upload.jpeg")).unwrap(), JPEG_BYTES);
}

#[actix_web::test]
async fn multipart_file_parts_are_not_form_fields() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let encoded = BASE64_STANDARD.encode(JPEG_BYTES);
    let mut body = format!(
        "--XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"filename\"\r\n\r\n\
         up.jpg\r\n\
         --XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"data\"\r\n\r\n\
         {encoded}\r\n\
         --XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"thumb\"; filename=\"t.jpg\"\r\n\
         Content-Type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(JPEG_BYTES);
    body.extend_from_slice(b"\r\n--XBOUNDARYX--\r\n");

    let req = test::TestRequest::post()
        .uri("/image")
        .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARYX"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let posted: FileInfo = test::read_body_json(resp).await;
    assert_eq!(posted.file_name, "up.jpg");
    assert_eq!(std::fs::read(dir.path().join("up.jpg")).unwrap(), JPEG_BYTES);

    // a file part cannot stand in for the data field
    let body = format!(
        "--XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"filename\"\r\n\r\n\
         other.jpg\r\n\
         --XBOUNDARYX\r\n\
         Content-Disposition: form-data; name=\"data\"; filename=\"d.txt\"\r\n\r\n\
         {encoded}\r\n\
         --XBOUNDARYX--\r\n"
    );
    let req = test::TestRequest::post()
        .uri("/image")
        .insert_header((header::CONTENT_TYPE, "multipart/form-data; boundary=XBOUNDARYX"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.description, "Missing required key in data: 'data'");
    assert!(!dir.path().join("other.jpg").exists());
}

#[actix_web::test]
async fn image_not_found_error() {
    let dir = images_dir();
    std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
    let app = init_app!(dir.path());

    for uri in ["/images/foo", "/images/missing.jpg", "/images/notes.txt"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ErrorBody = test::read_body_json(resp).await;
        assert_eq!(body.code, 404);
        assert_eq!(body.name, "Not Found");
        assert_eq!(body.description, "Image file not found");
    }
}

#[actix_web::test]
async fn post_without_form_is_rejected() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let resp = test::call_service(&app, test::TestRequest::post().uri("/image").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.description, "Missing file in data payload");
}

#[actix_web::test]
async fn post_with_disallowed_type_is_rejected() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let req = test::TestRequest::post()
        .uri("/image")
        .set_form([("filename", "foo"), ("data", "111")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.description, "File type not allowed");
}

#[actix_web::test]
async fn post_with_invalid_base64_is_rejected() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let req = test::TestRequest::post()
        .uri("/image")
        .set_form([("filename", "foo.jpg"), ("data", "111")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert!(body.description.contains("invalid data in base64"));
    assert!(!dir.path().join("foo.jpg").exists());
}

#[actix_web::test]
async fn post_over_size_limit_is_rejected() {
    let dir = images_dir();
    let app = init_app!(dir.path(), 64);

    let encoded = BASE64_STANDARD.encode([0u8; 256]);
    let req = test::TestRequest::post()
        .uri("/image")
        .set_form([("filename", "big.jpg"), ("data", encoded.as_str())])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 413);
    assert!(!dir.path().join("big.jpg").exists());
}

#[actix_web::test]
async fn delete_without_key_is_rejected() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let req = test::TestRequest::delete().uri("/image").set_json(json!({ "foo": "bar" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.description, "Missing required key 'file'");

    let listed: FileList =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/image").to_request())
            .await;
    assert_eq!(listed.files.len(), FILE_NAMES.len());
}

#[actix_web::test]
async fn delete_missing_file_reports_os_error() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let req = test::TestRequest::delete().uri("/image").set_json(json!({ "file": "foo" })).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.name, "Internal Server Error");
    assert!(body.description.starts_with("deleting error: [Errno 2] "));
    assert!(body.description.contains("No such file or directory: '"));
    assert!(body.description.contains("foo'"));
}

#[actix_web::test]
async fn unknown_routes_and_methods_use_error_shape() {
    let dir = images_dir();
    let app = init_app!(dir.path());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.code, 404);

    let resp = test::call_service(&app, test::TestRequest::put().uri("/image").to_request()).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorBody = test::read_body_json(resp).await;
    assert_eq!(body.name, "Method Not Allowed");
}
