//! Client-side image staging for the analysis endpoint
//!
//! Files are validated (type, size ceiling) before any pixels are read,
//! downsized to fit the preview bounds, and re-encoded as JPEG. The
//! staged bytes are what gets submitted, never the original file.

// Allow unused code that's part of the public API for future features
#![allow(dead_code)]

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, ImageFormat};

use aria_utils::{AriaError, Result};

/// Upload size ceiling: 5 MiB
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Staged images are downsized to fit within these bounds
pub const MAX_WIDTH: u32 = 800;
pub const MAX_HEIGHT: u32 = 600;

/// Re-encode quality for staged JPEGs
const JPEG_QUALITY: u8 = 80;

/// A validated, downsized, re-encoded image held pending submission
#[derive(Debug, Clone)]
pub struct StagedImage {
    /// JPEG-encoded bytes actually submitted to the backend
    pub bytes: Vec<u8>,
    /// Original file name, forwarded with the upload
    pub file_name: String,
    /// MIME type of the original file
    pub mime: String,
    /// Dimensions after downsizing
    pub width: u32,
    pub height: u32,
    /// Dimensions of the original file
    pub original_width: u32,
    pub original_height: u32,
}

impl StagedImage {
    /// Encode as a `data:` URI, mirroring what the staged preview holds
    pub fn data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.bytes))
    }

    /// Short label for rendering the staged image as a chat/preview entry
    pub fn label(&self) -> String {
        format!(
            "[image {} {}x{}, {:.1} KB]",
            self.file_name,
            self.width,
            self.height,
            self.bytes.len() as f64 / 1024.0
        )
    }
}

/// Downsize dimensions to fit within `max_w` x `max_h`, preserving aspect
/// ratio. The dominant dimension is clamped and the other is scaled by
/// the same factor; images already within bounds pass through unchanged.
pub fn fit_within(width: u32, height: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if width > height {
        if width > max_w {
            let scaled = (height as f64 * max_w as f64 / width as f64).round() as u32;
            (max_w, scaled.max(1))
        } else {
            (width, height)
        }
    } else if height > max_h {
        let scaled = (width as f64 * max_h as f64 / height as f64).round() as u32;
        (scaled.max(1), max_h)
    } else {
        (width, height)
    }
}

/// Validate a candidate file before reading its contents.
///
/// Rejections happen locally, before any decode or network call.
pub fn validate_candidate(path: &Path, declared_len: u64) -> Result<()> {
    if declared_len > MAX_UPLOAD_BYTES {
        return Err(AriaError::validation(format!(
            "Image exceeds the 5 MB upload limit ({:.1} MB)",
            declared_len as f64 / (1024.0 * 1024.0)
        )));
    }

    let looks_like_image = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ImageFormat::from_extension(ext).is_some())
        .unwrap_or(false);
    if !looks_like_image {
        return Err(AriaError::validation(
            "Please select an image file".to_string(),
        ));
    }

    Ok(())
}

/// Validate, decode, downsize, and re-encode an image from disk
pub fn stage_image(path: &Path) -> Result<StagedImage> {
    let metadata = std::fs::metadata(path).map_err(|e| AriaError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    validate_candidate(path, metadata.len())?;

    let raw = std::fs::read(path).map_err(|e| AriaError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let format = image::guess_format(&raw)
        .map_err(|_| AriaError::validation("Please select an image file".to_string()))?;
    let decoded = image::load_from_memory(&raw)
        .map_err(|e| AriaError::validation(format!("Failed to decode image: {}", e)))?;

    let (original_width, original_height) = (decoded.width(), decoded.height());
    let (width, height) = fit_within(original_width, original_height, MAX_WIDTH, MAX_HEIGHT);

    let resized = if (width, height) != (original_width, original_height) {
        decoded.resize_exact(width, height, FilterType::Triangle)
    } else {
        decoded
    };

    let rgb = resized.to_rgb8();
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .encode_image(&rgb)
        .map_err(|e| AriaError::internal(format!("Failed to encode staged image: {}", e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    Ok(StagedImage {
        bytes,
        file_name,
        mime: mime_for_format(format).to_string(),
        width,
        height,
        original_width,
        original_height,
    })
}

/// Which input on the vision tab holds focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisionFocus {
    #[default]
    Path,
    Prompt,
}

/// Analysis sections rendered after a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct VisionOutcome {
    pub analysis: String,
    pub description: String,
}

/// Vision tab state
#[derive(Debug, Default)]
pub struct VisionState {
    /// Path of the image file to stage
    pub path_input: String,
    /// Free-text prompt sent with the upload
    pub prompt_input: String,
    pub focus: VisionFocus,
    /// Image pending submission, already validated and downsized
    pub staged: Option<StagedImage>,
    /// True while staging or while the analysis call is in flight
    pub busy: bool,
    pub result: Option<VisionOutcome>,
}

impl VisionState {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            VisionFocus::Path => VisionFocus::Prompt,
            VisionFocus::Prompt => VisionFocus::Path,
        };
    }

    /// Take the trimmed path to stage, or None for the empty no-op
    pub fn take_path(&mut self) -> Option<String> {
        let path = self.path_input.trim().to_owned();
        if path.is_empty() {
            return None;
        }
        Some(path)
    }
}

/// Short trusted label for a `data:` URI, with a decoded-size estimate
pub fn data_uri_label(uri: &str, kind: &str) -> String {
    let mime = uri
        .strip_prefix("data:")
        .and_then(|rest| rest.split(';').next())
        .filter(|m| !m.is_empty())
        .unwrap_or("image");

    let payload_len = uri.split_once("base64,").map(|(_, b64)| b64.len()).unwrap_or(0);
    let approx_bytes = payload_len * 3 / 4;

    format!("[{} {}, {:.1} KB]", kind, mime, approx_bytes as f64 / 1024.0)
}

fn mime_for_format(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    // ==================== Resize Rule Tests ====================

    #[test]
    fn test_fit_within_wide_image() {
        // Width dominates and exceeds the bound
        assert_eq!(fit_within(1600, 900, 800, 600), (800, 450));
        assert_eq!(fit_within(1000, 900, 800, 600), (800, 720));
    }

    #[test]
    fn test_fit_within_tall_image() {
        // Height dominates and exceeds the bound
        assert_eq!(fit_within(900, 1800, 800, 600), (300, 600));
        assert_eq!(fit_within(600, 1200, 800, 600), (300, 600));
    }

    #[test]
    fn test_fit_within_rounds_scaled_dimension() {
        // 1000 wide, 333 tall: 333 * 0.8 = 266.4 -> 266
        assert_eq!(fit_within(1000, 333, 800, 600), (800, 266));
        // 1000 wide, 334 tall: 334 * 0.8 = 267.2 -> 267
        assert_eq!(fit_within(1000, 334, 800, 600), (800, 267));
    }

    #[test]
    fn test_fit_within_small_image_unchanged() {
        assert_eq!(fit_within(640, 480, 800, 600), (640, 480));
        assert_eq!(fit_within(1, 1, 800, 600), (1, 1));
    }

    #[test]
    fn test_fit_within_never_zero() {
        // Extreme aspect ratio must not collapse to zero
        assert_eq!(fit_within(10000, 1, 800, 600), (800, 1));
        assert_eq!(fit_within(1, 10000, 800, 600), (1, 600));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_oversized_file_rejected_before_read() {
        let err = validate_candidate(Path::new("big.png"), MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(err.is_local());
        assert!(err.to_string().contains("5 MB"));
    }

    #[test]
    fn test_size_exactly_at_ceiling_accepted() {
        assert!(validate_candidate(Path::new("ok.png"), MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_non_image_extension_rejected() {
        let err = validate_candidate(Path::new("notes.txt"), 100).unwrap_err();
        assert!(err.is_local());
    }

    #[test]
    fn test_no_extension_rejected() {
        assert!(validate_candidate(Path::new("mystery"), 100).is_err());
    }

    #[test]
    fn test_non_image_bytes_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"definitely not a PNG").unwrap();

        assert!(stage_image(&path).is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = stage_image(Path::new("/nonexistent/image.png")).unwrap_err();
        assert!(matches!(err, AriaError::FileRead { .. }));
    }

    // ==================== Staging Tests ====================

    #[test]
    fn test_stage_small_image_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "small.png", 320, 240);

        let staged = stage_image(&path).unwrap();
        assert_eq!((staged.width, staged.height), (320, 240));
        assert_eq!((staged.original_width, staged.original_height), (320, 240));
        assert_eq!(staged.mime, "image/png");
        assert_eq!(staged.file_name, "small.png");
        assert!(!staged.bytes.is_empty());
    }

    #[test]
    fn test_stage_downsizes_wide_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "wide.png", 1600, 900);

        let staged = stage_image(&path).unwrap();
        assert_eq!((staged.width, staged.height), (800, 450));
        assert_eq!(
            (staged.original_width, staged.original_height),
            (1600, 900)
        );
    }

    #[test]
    fn test_staged_bytes_are_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "img.png", 64, 64);

        let staged = stage_image(&path).unwrap();
        assert_eq!(image::guess_format(&staged.bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_data_uri_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "img.png", 16, 16);

        let staged = stage_image(&path).unwrap();
        assert!(staged.data_uri().starts_with("data:image/jpeg;base64,"));
    }

    // ==================== Tab State Tests ====================

    #[test]
    fn test_focus_toggle() {
        let mut state = VisionState::default();
        assert_eq!(state.focus, VisionFocus::Path);
        state.toggle_focus();
        assert_eq!(state.focus, VisionFocus::Prompt);
        state.toggle_focus();
        assert_eq!(state.focus, VisionFocus::Path);
    }

    #[test]
    fn test_take_path_trims() {
        let mut state = VisionState::default();
        state.path_input = "  /tmp/cat.png  ".into();
        assert_eq!(state.take_path().as_deref(), Some("/tmp/cat.png"));
    }

    #[test]
    fn test_take_path_empty_is_noop() {
        let mut state = VisionState::default();
        state.path_input = "   ".into();
        assert!(state.take_path().is_none());
    }

    #[test]
    fn test_data_uri_label() {
        // 8 base64 chars ~ 6 bytes
        let label = data_uri_label("data:image/png;base64,AAAAAAAA", "screenshot");
        assert!(label.starts_with("[screenshot image/png,"));
        assert!(label.contains("0.0 KB"));
    }

    #[test]
    fn test_data_uri_label_unknown_scheme() {
        let label = data_uri_label("bare-string", "image");
        assert!(label.starts_with("[image image,"));
    }

    #[test]
    fn test_label_mentions_name_and_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_png(dir.path(), "photo.png", 32, 16);

        let staged = stage_image(&path).unwrap();
        let label = staged.label();
        assert!(label.contains("photo.png"));
        assert!(label.contains("32x16"));
    }
}
