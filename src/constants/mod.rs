pub const ALLOWED_EXTENSIONS: [&str; 2] = ["jpg", "jpeg"];

pub const DEFAULT_UPLOAD_FOLDER: &str = "images/";
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 50 * 1024 * 1024;

pub struct Env {
    pub ip: String,
    pub port: u16,
    pub workers: usize,
    pub upload_folder: String,
    pub max_content_length: usize,
}

impl Env {
    fn new() -> Self {
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");
        let workers = std::env::var("WORKERS")
            .unwrap_or_else(|_| "2".to_string())
            .parse::<usize>()
            .expect("WORKERS must be a valid usize integer");

        let upload_folder =
            std::env::var("UPLOAD_FOLDER").unwrap_or_else(|_| DEFAULT_UPLOAD_FOLDER.to_string());
        let max_content_length = std::env::var("MAX_CONTENT_LENGTH")
            .map(|v| v.parse::<usize>().expect("MAX_CONTENT_LENGTH must be a valid usize integer"))
            .unwrap_or(DEFAULT_MAX_CONTENT_LENGTH);

        Env { ip, port, workers, upload_folder, max_content_length }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
