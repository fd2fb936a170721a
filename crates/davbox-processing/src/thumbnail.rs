//! Thumbnail generation
//!
//! Stills are bounded to the configured edge length and re-encoded as
//! JPEG under the public thumbnail root. The returned path is relative
//! to the public root so API responses never leak server paths.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;

use crate::ingest::types::Derivation;

const JPEG_QUALITY: u8 = 85;

/// A thumbnail written below the public root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredThumbnail {
    /// Path relative to the public static root, always forward-slashed.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Thumbnails keep the cleaned filename but always carry a JPEG extension.
fn thumbnail_filename(cleaned_filename: &str) -> String {
    let lower = cleaned_filename.to_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        return cleaned_filename.to_string();
    }
    match cleaned_filename.rsplit_once('.') {
        Some((stem, _)) => format!("{}.jpg", stem),
        None => format!("{}.jpg", cleaned_filename),
    }
}

/// Derive a thumbnail for the still at `source`. Any failure degrades
/// softly; the upload itself never fails over a missing thumbnail.
pub fn generate_thumbnail(
    source: &Path,
    cleaned_filename: &str,
    date_dir: &str,
    thumbnail_root: &Path,
    max_px: u32,
) -> Derivation<StoredThumbnail> {
    match try_generate(source, cleaned_filename, date_dir, thumbnail_root, max_px) {
        Ok(thumbnail) => {
            tracing::debug!(path = %thumbnail.relative_path, "Thumbnail generated");
            Derivation::Ready(thumbnail)
        }
        Err(e) => Derivation::Degraded(format!("{:#}", e)),
    }
}

fn try_generate(
    source: &Path,
    cleaned_filename: &str,
    date_dir: &str,
    thumbnail_root: &Path,
    max_px: u32,
) -> Result<StoredThumbnail, anyhow::Error> {
    let img = image::ImageReader::open(source)
        .context("Failed to open still")?
        .with_guessed_format()
        .context("Failed to sniff image format")?
        .decode()
        .context("Failed to decode still")?;

    // Bound the longer edge, never upscale.
    let img = if img.width() > max_px || img.height() > max_px {
        img.thumbnail(max_px, max_px)
    } else {
        img
    };
    let rgb = img.to_rgb8();

    let target_dir = thumbnail_root.join(date_dir);
    std::fs::create_dir_all(&target_dir).context("Failed to create thumbnail directory")?;

    let filename = thumbnail_filename(cleaned_filename);
    let absolute_path = target_dir.join(&filename);

    let file = std::fs::File::create(&absolute_path).context("Failed to create thumbnail file")?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .context("Failed to encode thumbnail")?;

    Ok(StoredThumbnail {
        relative_path: format!("thumbnails/{}/{}", date_dir, filename),
        absolute_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 40, 200, 255]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn large_stills_are_bounded_to_the_max_edge() {
        let scratch = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let source = write_png(scratch.path(), "wide.png", 800, 400);

        let thumbnail = generate_thumbnail(&source, "wide.png", "2025/09/23", root.path(), 200)
            .ready()
            .unwrap();

        let decoded = image::open(&thumbnail.absolute_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
        assert_eq!(thumbnail.relative_path, "thumbnails/2025/09/23/wide.jpg");
    }

    #[test]
    fn small_stills_are_never_upscaled() {
        let scratch = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let source = write_png(scratch.path(), "icon.png", 64, 32);

        let thumbnail = generate_thumbnail(&source, "icon.png", "2025/09/23", root.path(), 200)
            .ready()
            .unwrap();

        let decoded = image::open(&thumbnail.absolute_path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 32));
    }

    #[test]
    fn jpeg_names_are_kept_and_others_are_swapped() {
        assert_eq!(thumbnail_filename("photo.png"), "photo.jpg");
        assert_eq!(thumbnail_filename("clip.mp4"), "clip.jpg");
        assert_eq!(thumbnail_filename("snap.jpg"), "snap.jpg");
        assert_eq!(thumbnail_filename("scan.JPEG"), "scan.JPEG");
        assert_eq!(thumbnail_filename("noext"), "noext.jpg");
    }

    #[test]
    fn undecodable_input_degrades_softly() {
        let scratch = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let source = scratch.path().join("garbage.png");
        std::fs::write(&source, b"not an image at all").unwrap();

        let result = generate_thumbnail(&source, "garbage.png", "2025/09/23", root.path(), 200);
        assert!(matches!(result, Derivation::Degraded(_)));
    }

    #[test]
    fn transparency_is_flattened_to_rgb_jpeg() {
        let scratch = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let path = scratch.path().join("ghost.png");
        let img = image::RgbaImage::from_pixel(10, 10, image::Rgba([255, 0, 0, 0]));
        img.save_with_format(&path, image::ImageFormat::Png).unwrap();

        let thumbnail = generate_thumbnail(&path, "ghost.png", "2025/09/23", root.path(), 200)
            .ready()
            .unwrap();

        let decoded = image::ImageReader::open(&thumbnail.absolute_path)
            .unwrap()
            .with_guessed_format()
            .unwrap();
        assert_eq!(decoded.format(), Some(image::ImageFormat::Jpeg));
    }
}
