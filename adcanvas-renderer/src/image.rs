//! Image decoding, encoding and source classification.
//!
//! Supports images from files, HTTP URLs and base64 or percent-encoded
//! data URIs.

use std::io::Cursor;
use std::path::PathBuf;

use adcanvas_core::ImagePixels;
use base64::Engine;

use crate::error::{RenderError, RenderResult};

/// Image container formats recognised by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF; only the first frame is used.
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            Self::Png
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Self::Jpeg
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            Self::WebP
        } else if data.starts_with(b"GIF8") {
            Self::Gif
        } else {
            Self::Unknown
        }
    }

    fn codec(self) -> Option<image::ImageFormat> {
        match self {
            Self::Png => Some(image::ImageFormat::Png),
            Self::Jpeg => Some(image::ImageFormat::Jpeg),
            Self::WebP => Some(image::ImageFormat::WebP),
            Self::Gif => Some(image::ImageFormat::Gif),
            Self::Unknown => None,
        }
    }
}

/// Where an image request points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Inline `data:` URI.
    DataUri,
    /// Local file, from a bare path or a `file://` URL.
    File(PathBuf),
    /// Remote `http://` or `https://` URL.
    Http,
}

impl ImageSource {
    /// Classify a request URL.
    #[must_use]
    pub fn classify(url: &str) -> Self {
        let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
        if lower.starts_with("data:") {
            Self::DataUri
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Http
        } else if let Some(path) = url.strip_prefix("file://") {
            Self::File(PathBuf::from(path))
        } else {
            Self::File(PathBuf::from(url))
        }
    }
}

/// Decode encoded image bytes to straight-alpha RGBA pixels.
///
/// The container is sniffed from its magic bytes; unrecognised data is
/// handed to the codec's own detection.
///
/// # Errors
///
/// Returns an error, naming the sniffed format, if the bytes are not a
/// supported image.
pub fn decode_image(data: &[u8]) -> RenderResult<ImagePixels> {
    let format = ImageFormat::from_magic_bytes(data);
    let decoded = match format.codec() {
        Some(codec) => image::load_from_memory_with_format(data, codec),
        None => image::load_from_memory(data),
    };
    let img = decoded.map_err(|e| RenderError::Decode(format!("{format:?} image: {e}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(ImagePixels {
        width,
        height,
        rgba: rgba.into_raw().into(),
    })
}

/// Extract the payload of a `data:` URI.
///
/// Supports `data:image/png;base64,iVBORw0KGgo...` and percent-encoded
/// payloads.
///
/// # Errors
///
/// Returns an error if the URI is malformed.
pub fn data_uri_bytes(uri: &str) -> RenderResult<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;

    if metadata.split(';').any(|part| part.eq_ignore_ascii_case("base64")) {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| RenderError::Decode(format!("Invalid base64: {e}")))
    } else {
        percent_decode(payload)
    }
}

fn percent_decode(input: &str) -> RenderResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| RenderError::Resource("Invalid URL encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}

/// Encode pixels as PNG.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match its dimensions.
pub fn encode_png(pixels: &ImagePixels) -> RenderResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(pixels.width, pixels.height, pixels.rgba.to_vec())
        .ok_or_else(|| RenderError::Export("Pixel buffer does not match size".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| RenderError::Export(e.to_string()))?;
    Ok(out.into_inner())
}

/// Encode pixels as a base64 PNG `data:` URI.
///
/// # Errors
///
/// Returns an error if the pixels cannot be encoded.
pub fn png_data_uri(pixels: &ImagePixels) -> RenderResult<String> {
    let png = encode_png(pixels)?;
    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png)
    ))
}
