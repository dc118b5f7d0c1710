use std::path::{Path, PathBuf};

/// Uploads larger than this are refused.
pub const MAX_PICTURE_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix the stored pictures are served under.
pub const PICTURE_URL_PREFIX: &str = "/static/clubphoto";

#[derive(Debug, Clone)]
pub struct PictureStore {
    root: PathBuf,
}

impl PictureStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub async fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(self.root.join(file_name), bytes).await
    }

    pub async fn remove(&self, file_name: &str) -> std::io::Result<()> {
        tokio::fs::remove_file(self.root.join(file_name)).await
    }
}

pub fn picture_url(file_name: &str) -> String {
    format!("{PICTURE_URL_PREFIX}/{file_name}")
}

/// Sniffs the upload and returns the file extension to store it under, or
/// `None` when the bytes are not an image.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    if !infer::is_image(bytes) {
        return None;
    }
    infer::get(bytes).map(|kind| kind.extension())
}
