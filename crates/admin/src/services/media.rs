//! Menu item image storage.
//!
//! Images are written under `MEDIA_DIR` with keys of the form
//! `menu/<uuid>.<ext>`. The storefront and admin both serve that directory at
//! `/media`, so a key maps directly to a public URL.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

/// Key prefix for menu item images.
const MENU_PREFIX: &str = "menu";

/// Errors from the media store.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Upload had no content.
    #[error("Image is empty")]
    Empty,

    /// Upload exceeds the configured limit.
    #[error("Image must be at most {max_mb} MB")]
    TooLarge { max_mb: usize },

    /// Content is not a supported image type.
    #[error("Image must be a JPEG, PNG, WebP or GIF file")]
    UnsupportedType,

    /// Key does not name a file inside the media directory.
    #[error("invalid media key: {0}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("media storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Whether the error was caused by the uploaded file rather than storage.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Empty | Self::TooLarge { .. } | Self::UnsupportedType)
    }
}

/// Image formats accepted for menu items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Detect the format from the file's leading bytes.
    ///
    /// The browser-supplied content type is not trusted.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP")
        {
            Some(Self::Webp)
        } else {
            None
        }
    }

    /// File extension used in stored keys.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }
}

/// Filesystem-backed image store.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    max_bytes: usize,
}

impl MediaStore {
    /// Create a store rooted at `root` accepting uploads up to `max_bytes`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Largest accepted upload, in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Validate an upload without storing it.
    ///
    /// # Errors
    ///
    /// Returns `Empty`, `TooLarge` or `UnsupportedType`.
    pub fn validate(&self, bytes: &[u8]) -> Result<ImageFormat, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(MediaError::TooLarge {
                max_mb: self.max_bytes.div_ceil(1024 * 1024),
            });
        }
        ImageFormat::sniff(bytes).ok_or(MediaError::UnsupportedType)
    }

    /// Store a menu item image and return its key.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad uploads and `MediaError::Io` if the
    /// file cannot be written.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save_menu_image(&self, bytes: &[u8]) -> Result<String, MediaError> {
        let format = self.validate(bytes)?;
        let key = format!("{MENU_PREFIX}/{}.{}", Uuid::new_v4(), format.extension());

        let path = self.path_for(&key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(key = %key, "Stored menu image");
        Ok(key)
    }

    /// Delete a stored image. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::InvalidKey` for keys outside the store and
    /// `MediaError::Io` if removal fails.
    #[instrument(skip(self))]
    pub async fn delete(&self, key: &str) -> Result<(), MediaError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(key = %key, "Media file already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a key to a path, rejecting anything but plain relative segments.
    fn path_for(&self, key: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain {
            return Err(MediaError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    /// The directory is removed when the returned `TempDir` drops.
    fn temp_store(max_bytes: usize) -> (TempDir, MediaStore) {
        let dir = TempDir::new().unwrap();
        let store = MediaStore::new(dir.path(), max_bytes);
        (dir, store)
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
        assert_eq!(
            ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::sniff(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(
            ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_validate_rejects_empty_and_oversized() {
        let (_dir, store) = temp_store(8);
        assert!(matches!(store.validate(b""), Err(MediaError::Empty)));
        assert!(matches!(
            store.validate(PNG),
            Err(MediaError::TooLarge { max_mb: 1 })
        ));
    }

    #[test]
    fn test_validate_rejects_non_images() {
        let (_dir, store) = temp_store(1024);
        let err = store.validate(b"<html></html>").unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedType));
        assert!(err.is_client_error());
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let (_dir, store) = temp_store(1024);
        assert!(store.path_for("menu/a.png").is_ok());
        assert!(store.path_for("../etc/passwd").is_err());
        assert!(store.path_for("/etc/passwd").is_err());
        assert!(store.path_for("menu/./a.png").is_ok());
        assert!(store.path_for("").is_err());
    }

    #[tokio::test]
    async fn test_save_then_delete() {
        let (_dir, store) = temp_store(1024);
        let key = store.save_menu_image(PNG).await.unwrap();
        assert!(key.starts_with("menu/"));
        assert!(key.ends_with(".png"));

        let path = store.path_for(&key).unwrap();
        assert_eq!(tokio::fs::read(&path).await.unwrap(), PNG);

        store.delete(&key).await.unwrap();
        assert!(!path.exists());

        // Second delete is a no-op
        store.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_images_stay_inside_root() {
        let (dir, store) = temp_store(1024);
        let key = store.save_menu_image(PNG).await.unwrap();

        let path = store.path_for(&key).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
    }
}
