//! Image loading and validation for analysis requests.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine};
use once_cell::sync::Lazy;
use plantdoc_core::PlantDocError;
use regex::Regex;

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/\w+;base64,").unwrap());

/// An image that passed validation, ready to send to a provider.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl ImagePayload {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

/// Detect MIME type by file extension.
pub fn detect_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Detect MIME type from leading magic bytes.
pub fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

/// Strip a `data:image/...;base64,` prefix if present.
pub fn strip_data_url_prefix(data: &str) -> &str {
    match DATA_URL_PREFIX.find(data) {
        Some(m) => &data[m.end()..],
        None => data,
    }
}

/// Read an image from disk and validate size and format.
pub fn load_image(path: &Path, max_bytes: u64) -> Result<ImagePayload, PlantDocError> {
    let bytes = fs::read(path).map_err(|e| {
        PlantDocError::InvalidImage(format!("Cannot read {}: {}", path.display(), e))
    })?;
    image_from_bytes(bytes, detect_mime_type(path), max_bytes)
}

/// Validate raw bytes against the size cap and supported formats.
///
/// Magic bytes win over the extension hint; the hint only covers files
/// whose leading bytes we do not recognize.
pub fn image_from_bytes(
    bytes: Vec<u8>,
    extension_hint: Option<&'static str>,
    max_bytes: u64,
) -> Result<ImagePayload, PlantDocError> {
    if bytes.len() as u64 > max_bytes {
        return Err(PlantDocError::InvalidImage(format!(
            "Image size must be less than {}MB",
            max_bytes / (1024 * 1024)
        )));
    }

    let mime_type = match sniff_mime_type(&bytes).or(extension_hint) {
        Some(m) => m,
        None => {
            return Err(PlantDocError::InvalidImage(
                "Please upload a JPEG, PNG, or WebP image".to_string(),
            ))
        }
    };

    Ok(ImagePayload { bytes, mime_type })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn png_header() -> Vec<u8> {
        vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0]
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime_type(&png_header()), Some("image/png"));

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(sniff_mime_type(&webp), Some("image/webp"));

        assert_eq!(sniff_mime_type(b"GIF89a"), None);
    }

    #[test]
    fn extension_detection() {
        assert_eq!(detect_mime_type(&PathBuf::from("leaf.JPG")), Some("image/jpeg"));
        assert_eq!(detect_mime_type(&PathBuf::from("leaf.gif")), None);
    }

    #[test]
    fn rejects_oversized_image() {
        let err = image_from_bytes(png_header(), None, 4).unwrap_err();
        assert!(err.to_string().contains("less than"));
    }

    #[test]
    fn rejects_unknown_format() {
        let err = image_from_bytes(b"GIF89a....".to_vec(), None, 1024).unwrap_err();
        assert!(err.to_string().contains("JPEG, PNG, or WebP"));
    }

    #[test]
    fn magic_bytes_override_extension_hint() {
        let img = image_from_bytes(png_header(), Some("image/jpeg"), 1024).unwrap();
        assert_eq!(img.mime_type, "image/png");
    }

    #[test]
    fn strips_data_url_prefix() {
        assert_eq!(strip_data_url_prefix("data:image/png;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url_prefix("QUJD"), "QUJD");
    }
}
