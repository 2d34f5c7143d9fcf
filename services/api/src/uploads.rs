//! Image storage on the local filesystem
//!
//! Uploaded part images land under `{UPLOAD_DIR}/parts/` with generated
//! names; the router serves the whole upload directory at `/uploads`.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rand::Rng;
use tracing::warn;

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

/// Upper bound per image file
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Upper bound on images per part
pub const MAX_IMAGES_PER_PART: usize = 5;

/// Local image store rooted at the upload directory
#[derive(Clone)]
pub struct ImageStore {
    root: PathBuf,
}

fn extension_of(file_name: &str) -> Option<&str> {
    Path::new(file_name).extension().and_then(|ext| ext.to_str())
}

/// True when the name carries an allowed image extension
pub fn is_allowed_image(file_name: &str) -> bool {
    extension_of(file_name)
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn generated_name(original_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let nonce: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = extension_of(original_name)
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpg".to_string());
    format!("part-{millis}-{nonce}.{ext}")
}

impl ImageStore {
    /// Open the store, creating the parts directory if needed. The root
    /// comes from `UPLOAD_DIR` (default `uploads`).
    pub fn from_env() -> Result<Self> {
        let root = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        Self::new(PathBuf::from(root))
    }

    pub fn new(root: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(root.join("parts"))
            .with_context(|| format!("Failed to create upload directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Filesystem root served at `/uploads`
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist one uploaded image and return its public URL path.
    /// The caller has already checked the extension and size.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let file_name = generated_name(original_name);
        let path = self.root.join("parts").join(&file_name);

        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write image {}", path.display()))?;

        Ok(format!("/uploads/parts/{file_name}"))
    }

    /// Best-effort removal of a previously saved image, used to clean up
    /// when the database write after an upload fails
    pub async fn remove(&self, url_path: &str) {
        let Some(file_name) = url_path.strip_prefix("/uploads/parts/") else {
            return;
        };
        let path = self.root.join("parts").join(file_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove uploaded image {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_whitelist() {
        assert!(is_allowed_image("photo.jpg"));
        assert!(is_allowed_image("photo.JPEG"));
        assert!(is_allowed_image("photo.webp"));
        assert!(!is_allowed_image("archive.zip"));
        assert!(!is_allowed_image("script.jpg.exe"));
        assert!(!is_allowed_image("no-extension"));
    }

    #[test]
    fn generated_names_keep_the_extension_and_differ() {
        let a = generated_name("front.PNG");
        let b = generated_name("front.PNG");
        assert!(a.ends_with(".png"));
        assert!(a.starts_with("part-"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn save_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("img-store-{}", std::process::id()));
        let store = ImageStore::new(dir.clone()).unwrap();

        let url = store.save("wheel.jpg", b"not really a jpeg").await.unwrap();
        assert!(url.starts_with("/uploads/parts/part-"));

        let on_disk = dir.join("parts").join(url.rsplit('/').next().unwrap());
        assert!(on_disk.exists());

        store.remove(&url).await;
        assert!(!on_disk.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
