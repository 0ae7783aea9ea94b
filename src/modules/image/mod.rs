pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_fs;
pub mod route;
pub mod schema;
pub mod service;

pub use model::StorageConfig;
pub use repository::ImageRepository;
pub use repository_fs::ImageFsRepository;
pub use service::ImageService;
