//! Video cover derivation
//!
//! A cover is a single JPEG still written into the batch scratch
//! directory; the thumbnail step consumes it afterwards. A user-supplied
//! cover wins over frame extraction. Failures degrade softly, the video
//! upload itself proceeds without a cover.

use std::io::{BufWriter, Cursor};
use std::path::{Path, PathBuf};

use anyhow::Context;
use image::codecs::jpeg::JpegEncoder;
use uuid::Uuid;

use crate::ingest::types::Derivation;

const JPEG_QUALITY: u8 = 85;

/// Derive a cover still for the video at `video_path`.
pub async fn derive_cover(
    video_path: &Path,
    user_cover: Option<&[u8]>,
    scratch_dir: &Path,
    ffmpeg_path: &str,
) -> Derivation<PathBuf> {
    let cover_path = scratch_dir.join(format!("cover_{}.jpg", Uuid::new_v4().simple()));

    match user_cover {
        Some(bytes) if !bytes.is_empty() => match reencode_user_cover(bytes, &cover_path) {
            Ok(()) => Derivation::Ready(cover_path),
            Err(e) => {
                let _ = std::fs::remove_file(&cover_path);
                Derivation::Degraded(format!("user cover: {:#}", e))
            }
        },
        _ => extract_first_frame(video_path, &cover_path, ffmpeg_path).await,
    }
}

/// User covers are normalized to RGB JPEG regardless of the submitted
/// format; sizing is left to the thumbnail step.
fn reencode_user_cover(bytes: &[u8], cover_path: &Path) -> Result<(), anyhow::Error> {
    let img = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to sniff cover format")?
        .decode()
        .context("Failed to decode cover")?;
    let rgb = img.to_rgb8();

    let file = std::fs::File::create(cover_path).context("Failed to create cover file")?;
    let mut writer = BufWriter::new(file);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
    encoder.encode_image(&rgb).context("Failed to encode cover")?;

    Ok(())
}

async fn extract_first_frame(
    video_path: &Path,
    cover_path: &Path,
    ffmpeg_path: &str,
) -> Derivation<PathBuf> {
    let output = tokio::process::Command::new(ffmpeg_path)
        .arg("-loglevel")
        .arg("error")
        .arg("-y")
        .arg("-i")
        .arg(video_path)
        .arg("-frames:v")
        .arg("1")
        .arg(cover_path)
        .output()
        .await;

    let output = match output {
        Ok(output) => output,
        Err(e) => {
            return Derivation::Degraded(format!("ffmpeg could not be spawned: {}", e));
        }
    };

    if !output.status.success() {
        let _ = std::fs::remove_file(cover_path);
        return Derivation::Degraded(format!(
            "ffmpeg exited with {}: {}",
            output.status,
            truncate_lossy(&output.stderr)
        ));
    }

    // ffmpeg can exit zero without writing a frame on streams it cannot decode.
    match std::fs::metadata(cover_path) {
        Ok(meta) if meta.len() > 0 => Derivation::Ready(cover_path.to_path_buf()),
        _ => {
            let _ = std::fs::remove_file(cover_path);
            Derivation::Degraded("ffmpeg produced no frame".to_string())
        }
    }
}

fn truncate_lossy(stderr: &[u8]) -> String {
    const MAX_CHARS: usize = 200;
    let text = String::from_utf8_lossy(stderr);
    let trimmed = text.trim();
    if trimmed.chars().count() > MAX_CHARS {
        let head: String = trimmed.chars().take(MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        trimmed.to_string()
    }
}
