// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Avatar image files: type sniffing, generated names, disk storage.
//!
//! Uploaded files are stored under names we generate, never under the
//! client-supplied name, so lookups only need to accept that shape.

use std::io;
use std::path::PathBuf;

/// Largest accepted upload.
pub const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

const NAME_HEX_LEN: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

/// Identify an image from its leading magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageKind::Jpeg)
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageKind::Png)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(ImageKind::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(ImageKind::Webp)
    } else {
        None
    }
}

/// Fresh `<32 hex>.<ext>` file name.
pub fn generate_filename(kind: ImageKind) -> anyhow::Result<String> {
    let bytes: [u8; NAME_HEX_LEN / 2] = crate::password::random_bytes()?;
    Ok(format!("{}.{}", hex::encode(bytes), kind.extension()))
}

/// Image kind of a name produced by [`generate_filename`]; `None` for
/// anything else, including path separators and `..`.
pub fn parse_filename(name: &str) -> Option<ImageKind> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    let (stem, ext) = name.split_once('.')?;
    if stem.len() != NAME_HEX_LEN
        || !stem
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return None;
    }
    ImageKind::from_extension(ext)
}

/// Avatar files on disk.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn write(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), bytes).await
    }

    pub async fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.dir.join(name)).await
    }

    /// Remove a file; one that is already gone is not an error.
    pub async fn remove(&self, name: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_image(&[0xFF, 0xD8, 0xFF, 0xE0, 0]), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image(b"\x89PNG\r\n\x1a\n...."), Some(ImageKind::Png));
        assert_eq!(sniff_image(b"GIF89a...."), Some(ImageKind::Gif));
        assert_eq!(sniff_image(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageKind::Webp));
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert_eq!(sniff_image(b""), None);
        assert_eq!(sniff_image(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"), None);
        assert_eq!(sniff_image(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(sniff_image(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_generated_names_parse_back() {
        let name = generate_filename(ImageKind::Png).unwrap();
        assert_eq!(name.len(), NAME_HEX_LEN + 4);
        assert_eq!(parse_filename(&name), Some(ImageKind::Png));
    }

    #[test]
    fn test_parse_filename_rejects_traversal_and_foreign_names() {
        let stem = "0123456789abcdef0123456789abcdef";
        assert_eq!(parse_filename(&format!("{stem}.jpg")), Some(ImageKind::Jpeg));
        assert_eq!(parse_filename(&format!("../{stem}.jpg")), None);
        assert_eq!(parse_filename(&format!("{stem}/x.jpg")), None);
        assert_eq!(parse_filename(&format!("{stem}\\x.jpg")), None);
        assert_eq!(parse_filename(&format!("{stem}.exe")), None);
        assert_eq!(parse_filename(&format!("{stem}.jpg.png")), None);
        assert_eq!(parse_filename("0123456789ABCDEF0123456789ABCDEF.jpg"), None);
        assert_eq!(parse_filename("avatar.jpg"), None);
        assert_eq!(parse_filename(".."), None);
    }

    #[tokio::test]
    async fn test_store_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::new(dir.path().join("avatars"));

        store.write("a.png", b"data").await.unwrap();
        assert_eq!(store.read("a.png").await.unwrap(), b"data");

        store.remove("a.png").await.unwrap();
        assert!(store.read("a.png").await.is_err());
        // Removing twice is fine.
        store.remove("a.png").await.unwrap();
    }
}
