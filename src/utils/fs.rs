use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;
use crate::core::{ResultPayload, SourceImage};
use crate::utils::{ImagifyError, ImagifyResult, format_from_extension};

/// Reads an image file from disk, deriving its content type from the extension.
pub async fn read_source_image(path: impl AsRef<Path>) -> ImagifyResult<SourceImage> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(ImagifyError::io(format!("Input file does not exist: {}", path.display())));
    }

    let format = format_from_extension(path.to_str().unwrap_or_default())?;
    let data = fs::read(path)
        .await
        .map_err(|e| ImagifyError::io(format!("Failed to read {}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| format!("upload.{}", format.primary_extension()));

    SourceImage::new(file_name, format.content_type(), data)
}

/// Writes `payload` into `dir` under its suggested file name and returns the path.
pub async fn save_payload(dir: impl AsRef<Path>, payload: &ResultPayload) -> ImagifyResult<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ImagifyError::io(format!("Failed to create {}: {}", dir.display(), e)))?;

    let path = dir.join(payload.file_name());
    fs::write(&path, payload.data())
        .await
        .map_err(|e| ImagifyError::io(format!("Failed to write {}: {}", path.display(), e)))?;

    info!("Saved {} ({} bytes)", path.display(), payload.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MediaKind;
    use crate::utils::InputError;

    #[tokio::test]
    async fn reads_image_with_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("face.webp");
        std::fs::write(&path, b"RIFFxxxxWEBP").unwrap();

        let image = read_source_image(&path).await.unwrap();
        assert_eq!(image.file_name(), "face.webp");
        assert_eq!(image.content_type(), "image/webp");
        assert_eq!(image.data(), b"RIFFxxxxWEBP");
    }

    #[tokio::test]
    async fn rejects_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let err = read_source_image(&path).await.unwrap_err();
        assert!(matches!(err, ImagifyError::Input(InputError::UnsupportedExtension(_))));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let err = read_source_image("/nonexistent/photo.png").await.unwrap_err();
        assert!(matches!(err, ImagifyError::IO(_)));
    }

    #[tokio::test]
    async fn save_writes_under_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("downloads");
        let payload = ResultPayload::new(MediaKind::Video, "video/mp4", "imagify_pro_video.mp4", vec![1u8, 2, 3]);

        let path = save_payload(&out, &payload).await.unwrap();
        assert_eq!(path, out.join("imagify_pro_video.mp4"));
        assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
    }
}
