use envconfig::Envconfig;
use std::path::PathBuf;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: String,
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
    #[envconfig(from = "PICTURE_STORAGE_PATH", default = "./pictures")]
    pub picture_storage_path: PathBuf,
}
