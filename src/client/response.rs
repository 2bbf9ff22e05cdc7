//! Decoding of backend responses into [`ResultPayload`]s.
//!
//! Kept free of any HTTP types so every branch can be tested with plain bytes.

use base64::{Engine as _, engine::general_purpose};
use serde::Deserialize;
use crate::core::{MediaKind, OperationKind, ResultPayload};
use crate::utils::{ClientError, ClientResult, ImageFormat};

pub const ENHANCED_FILE_NAME: &str = "enhanced_image.png";
pub const SMILE_FILE_STEM: &str = "smile_result";
pub const VIDEO_FILE_NAME: &str = "imagify_pro_video.mp4";

/// Body of a successful enhance call.
#[derive(Debug, Deserialize)]
struct EnhanceBody {
    image: String,
}

/// FastAPI error body. `detail` is a string for `HTTPException` and a list of
/// objects for request validation failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Turns a raw response into a payload or a [`ClientError`].
pub fn decode(
    operation: OperationKind,
    status: u16,
    content_type: Option<&str>,
    body: &[u8],
) -> ClientResult<ResultPayload> {
    if !(200..300).contains(&status) {
        return Err(ClientError::response(status, error_detail(operation, body)));
    }

    match operation {
        OperationKind::Enhance => decode_enhanced(body),
        OperationKind::Smile => decode_smile(content_type, body),
        OperationKind::Video => decode_video(content_type, body),
    }
}

fn decode_enhanced(body: &[u8]) -> ClientResult<ResultPayload> {
    let parsed: EnhanceBody = serde_json::from_slice(body)
        .map_err(|e| ClientError::malformed(format!("Failed to parse enhance response: {}", e)))?;

    // Tolerate a full data URL as well as the bare base64 the backend sends.
    let encoded = match parsed.image.split_once(";base64,") {
        Some((_, data)) => data,
        None => parsed.image.as_str(),
    };

    let bytes = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ClientError::malformed(format!("Enhanced image is not valid base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(ClientError::malformed("Enhanced image is empty"));
    }

    Ok(ResultPayload::new(
        MediaKind::Image,
        ImageFormat::PNG.content_type(),
        ENHANCED_FILE_NAME,
        bytes,
    ))
}

fn decode_smile(content_type: Option<&str>, body: &[u8]) -> ClientResult<ResultPayload> {
    let content_type = content_type.unwrap_or_default();
    let format = ImageFormat::from_content_type(content_type)
        .ok_or_else(|| ClientError::malformed(format!("Expected an image, got '{}'", content_type)))?;

    if body.is_empty() {
        return Err(ClientError::malformed("Smile image is empty"));
    }

    let file_name = format!("{}.{}", SMILE_FILE_STEM, format.primary_extension());
    Ok(ResultPayload::new(MediaKind::Image, format.content_type(), file_name, body.to_vec()))
}

fn decode_video(content_type: Option<&str>, body: &[u8]) -> ClientResult<ResultPayload> {
    let content_type = content_type.unwrap_or_default();
    let essence = content_type.split(';').next().unwrap_or_default().trim();
    if !essence.starts_with("video/") {
        return Err(ClientError::malformed(format!("Expected a video, got '{}'", content_type)));
    }

    if body.is_empty() {
        return Err(ClientError::malformed("Video is empty"));
    }

    Ok(ResultPayload::new(MediaKind::Video, essence, VIDEO_FILE_NAME, body.to_vec()))
}

/// Human-readable reason for a failed call, preferring the backend's `detail`.
pub fn error_detail(operation: OperationKind, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        match parsed.detail {
            serde_json::Value::String(detail) if !detail.is_empty() => return detail,
            serde_json::Value::Array(items) => {
                let messages: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                    .map(str::to_string)
                    .collect();
                if !messages.is_empty() {
                    return messages.join("; ");
                }
            }
            _ => {}
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && text.len() <= 512 {
        return text.to_string();
    }

    match operation {
        OperationKind::Enhance => "Enhance failed".to_string(),
        OperationKind::Smile => "Failed to generate smile".to_string(),
        OperationKind::Video => "Failed to generate video".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhance_body_is_base64_png() {
        let body = format!(r#"{{"image":"{}"}}"#, general_purpose::STANDARD.encode(b"\x89PNG fake"));
        let payload = decode(OperationKind::Enhance, 200, Some("application/json"), body.as_bytes()).unwrap();
        assert_eq!(payload.data(), b"\x89PNG fake");
        assert_eq!(payload.content_type(), "image/png");
        assert_eq!(payload.file_name(), ENHANCED_FILE_NAME);
    }

    #[test]
    fn enhance_accepts_data_url() {
        let body = format!(
            r#"{{"image":"data:image/png;base64,{}"}}"#,
            general_purpose::STANDARD.encode(b"pixels")
        );
        let payload = decode(OperationKind::Enhance, 200, None, body.as_bytes()).unwrap();
        assert_eq!(payload.data(), b"pixels");
    }

    #[test]
    fn enhance_with_bad_base64_is_malformed() {
        let err = decode(OperationKind::Enhance, 200, None, br#"{"image":"@@not base64@@"}"#).unwrap_err();
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }

    #[test]
    fn enhance_returning_a_file_is_malformed() {
        let err = decode(OperationKind::Enhance, 200, Some("image/png"), b"\x89PNG raw").unwrap_err();
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }

    #[test]
    fn smile_webp_keeps_its_extension() {
        let payload = decode(OperationKind::Smile, 200, Some("image/webp"), b"RIFF").unwrap();
        assert_eq!(payload.file_name(), "smile_result.webp");
        assert_eq!(payload.media(), MediaKind::Image);
    }

    #[test]
    fn smile_jpeg_is_named_jpg() {
        let payload = decode(OperationKind::Smile, 200, Some("image/jpeg"), b"\xff\xd8").unwrap();
        assert_eq!(payload.file_name(), "smile_result.jpg");
    }

    #[test]
    fn video_requires_video_content_type() {
        let payload = decode(OperationKind::Video, 200, Some("video/mp4"), b"ftyp").unwrap();
        assert_eq!(payload.media(), MediaKind::Video);
        assert_eq!(payload.file_name(), VIDEO_FILE_NAME);

        let err = decode(OperationKind::Video, 200, Some("application/json"), b"{}").unwrap_err();
        assert!(matches!(err, ClientError::MalformedPayload(_)));
    }

    #[test]
    fn error_status_surfaces_detail() {
        let err = decode(
            OperationKind::Video,
            500,
            Some("application/json"),
            br#"{"detail":"Insufficient credits. Please add credits to your Replicate account."}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ClientError::response(500, "Insufficient credits. Please add credits to your Replicate account.")
        );
    }

    #[test]
    fn validation_error_list_is_flattened() {
        let body = br#"{"detail":[{"loc":["query","enh"],"msg":"value too large"},{"msg":"field required"}]}"#;
        assert_eq!(error_detail(OperationKind::Enhance, body), "value too large; field required");
    }

    #[test]
    fn empty_error_body_falls_back_to_operation_message() {
        assert_eq!(error_detail(OperationKind::Smile, b""), "Failed to generate smile");
    }
}
