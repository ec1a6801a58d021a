//! # Ad Canvas Renderer
//!
//! Image loading and export for ad canvas scenes.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │  data: URI │ file path │ http(s) URL           │
//! ├────────────────────────────────────────────────┤
//! │  ImageFetcher ─► decode ─► ImageCache          │
//! │  (implements adcanvas_core::ImageLoader)       │
//! ├────────────────────────────────────────────────┤
//! │  Scene ─► SVG ─► resvg/tiny-skia ─► PNG/JPEG   │
//! └────────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod error;
pub mod export;
pub mod fetch;
pub mod image;

pub use cache::{CacheConfig, CacheStats, ImageCache};
pub use error::{RenderError, RenderResult};
pub use export::{
    ExportConfig, ExportFormat, SceneExporter, DEFAULT_EXPORT_FILE, DEFAULT_EXPORT_QUALITY,
};
pub use fetch::{ImageFetcher, LoaderConfig, DEFAULT_FETCH_TIMEOUT_SECS};
pub use image::{decode_image, encode_png, ImageFormat, ImageSource};
