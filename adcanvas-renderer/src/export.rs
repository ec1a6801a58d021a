//! Scene export to image formats.
//!
//! Renders a [`Scene`] to PNG, JPEG or SVG using an SVG intermediate
//! representation and the resvg/tiny-skia rasterization pipeline. Guide
//! objects are never exported.

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use adcanvas_core::element::{
    ImageObject, LineObject, TextAlign, TextObject, FONT_SIZE_MULT, LINE_HEIGHT,
};
use adcanvas_core::{
    BlendMode, Gradient, GradientKind, ImageFilter, ObjectKind, Paint, Scene, SceneObject,
};
use image::ImageEncoder;

use crate::error::{RenderError, RenderResult};
use crate::image::png_data_uri;

/// File name offered for downloaded designs.
pub const DEFAULT_EXPORT_FILE: &str = "ai-ad-design.png";

/// Quality factor applied on top of the zoom correction.
pub const DEFAULT_EXPORT_QUALITY: f64 = 3.0;

/// Fraction of the font size that sits below the baseline.
const DESCENT: f64 = 0.222;

/// Blur strength 1.0 spreads over this fraction of the image's longer side.
const BLUR_EXTENT: f64 = 0.25;

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// SVG vector graphics (the SVG XML as UTF-8 bytes).
    Svg,
}

impl ExportFormat {
    /// Format implied by a file extension; PNG when unknown.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => Self::Jpeg,
            Some("svg") => Self::Svg,
            _ => Self::Png,
        }
    }
}

/// Configuration for scene export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Raster quality factor; the output is `quality` pixels per logical unit
    /// whatever the on-screen zoom.
    pub quality: f64,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Color transparent pixels are flattened onto for JPEG output.
    pub matte: [u8; 4],
    /// Load system fonts so text is rasterized.
    pub system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_EXPORT_QUALITY,
            jpeg_quality: 90,
            matte: [255, 255, 255, 255],
            system_fonts: true,
        }
    }
}

/// Exports a [`Scene`] to image formats.
pub struct SceneExporter {
    config: ExportConfig,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        if config.system_fonts {
            fontdb.load_system_fonts();
            tracing::debug!(faces = fontdb.len(), "Loaded system fonts");
        }
        Self {
            config,
            fontdb: Arc::new(fontdb),
        }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// The exporter configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Export a scene to the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene cannot be rendered or encoded.
    pub fn export(&self, scene: &Scene, format: ExportFormat) -> RenderResult<Vec<u8>> {
        match format {
            ExportFormat::Png => self.render_to_png(scene),
            ExportFormat::Jpeg => self.render_to_jpeg(scene),
            ExportFormat::Svg => Ok(self.render_to_svg(scene).into_bytes()),
        }
    }

    /// Export a scene to a file, picking the format from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub fn export_to_file(&self, scene: &Scene, path: &Path) -> RenderResult<ExportFormat> {
        let format = ExportFormat::from_path(path);
        let bytes = self.export(scene, format)?;
        std::fs::write(path, &bytes)?;
        tracing::info!(
            path = %path.display(),
            bytes = bytes.len(),
            ?format,
            "Design exported"
        );
        Ok(format)
    }

    /// Export the scene to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_png(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(scene)?;
        pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }

    /// Export the scene to JPEG bytes, flattened onto the matte color.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    pub fn render_to_jpeg(&self, scene: &Scene) -> RenderResult<Vec<u8>> {
        let pixmap = self.rasterize(scene)?;
        let (width, height) = (pixmap.width(), pixmap.height());
        let matte = self.config.matte;

        // Pixmap data is premultiplied.
        let rgb: Vec<u8> = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| {
                let inv = 255 - u16::from(px[3]);
                std::array::from_fn::<u8, 3, _>(|i| {
                    let value = u16::from(px[i]) + u16::from(matte[i]) * inv / 255;
                    u8::try_from(value.min(255)).unwrap_or(u8::MAX)
                })
            })
            .collect();

        let mut buf = std::io::Cursor::new(Vec::new());
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality)
            .write_image(&rgb, width, height, image::ExtendedColorType::Rgb8)
            .map_err(|e| RenderError::Export(format!("JPEG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    }

    /// Raster size `(width, height)` of an export.
    ///
    /// The on-screen canvas is `size × zoom` pixels and is scaled by the
    /// viewport's export multiplier, so the result does not depend on zoom.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn output_dimensions(&self, scene: &Scene) -> (u32, u32) {
        let viewport = scene.viewport;
        let zoom = if viewport.zoom.is_finite() && viewport.zoom > 0.0 {
            viewport.zoom
        } else {
            1.0
        };
        let scale = zoom * viewport.export_multiplier(self.config.quality);
        let out = |logical: u32| (f64::from(logical) * scale).round().max(1.0) as u32;
        (out(scene.width), out(scene.height))
    }

    /// Export the scene to an SVG string.
    #[must_use]
    pub fn render_to_svg(&self, scene: &Scene) -> String {
        let (out_w, out_h) = self.output_dimensions(scene);
        let mut writer = SvgWriter::default();

        writer.background(&scene.background, scene.width, scene.height);
        for (index, object) in scene.objects().filter(|o| !o.guide).enumerate() {
            writer.object(index, object);
        }

        writer.finish(out_w, out_h, scene.width, scene.height)
    }

    fn rasterize(&self, scene: &Scene) -> RenderResult<tiny_skia::Pixmap> {
        let svg = self.render_to_svg(scene);
        let opt = usvg::Options {
            fontdb: Arc::clone(&self.fontdb),
            ..usvg::Options::default()
        };
        let tree = usvg::Tree::from_str(&svg, &opt)
            .map_err(|e| RenderError::Export(format!("SVG parsing failed: {e}")))?;

        let (width, height) = self.output_dimensions(scene);
        let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Export(format!("Cannot allocate a {width}x{height} pixmap"))
        })?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        Ok(pixmap)
    }
}

/// Accumulates SVG definitions and body content.
#[derive(Default)]
struct SvgWriter {
    defs: String,
    body: String,
}

impl SvgWriter {
    fn finish(self, out_w: u32, out_h: u32, width: u32, height: u32) -> String {
        let mut svg = String::with_capacity(self.defs.len() + self.body.len() + 256);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {width} {height}\">",
        );
        if !self.defs.is_empty() {
            let _ = write!(svg, "<defs>{}</defs>", self.defs);
        }
        svg.push_str(&self.body);
        svg.push_str("</svg>");
        svg
    }

    fn background(&mut self, paint: &Paint, width: u32, height: u32) {
        let fill = self.paint("bg", paint, None);
        let _ = write!(
            self.body,
            "<rect width=\"{width}\" height=\"{height}\" fill=\"{fill}\"/>"
        );
    }

    /// Attribute value for a paint; gradients become a definition.
    ///
    /// `origin` shifts gradient coordinates given relative to an object's
    /// top-left corner into its centered local frame.
    fn paint(&mut self, id: &str, paint: &Paint, origin: Option<(f64, f64)>) -> String {
        match paint {
            Paint::Color(color) => escape_xml(color),
            Paint::Gradient(gradient) => match gradient.normalized() {
                Some(gradient) => {
                    self.gradient(id, &gradient, origin);
                    format!("url(#{id})")
                }
                None => "none".to_string(),
            },
        }
    }

    fn gradient(&mut self, id: &str, gradient: &Gradient, origin: Option<(f64, f64)>) {
        let c = gradient.coords;
        let transform = origin
            .map(|(x, y)| format!(" gradientTransform=\"translate({x} {y})\""))
            .unwrap_or_default();
        let tag = match gradient.kind {
            GradientKind::Linear => {
                let _ = write!(
                    self.defs,
                    "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{transform}>",
                    c.x1, c.y1, c.x2, c.y2,
                );
                "linearGradient"
            }
            GradientKind::Radial => {
                let _ = write!(
                    self.defs,
                    "<radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" fx=\"{}\" fy=\"{}\" cx=\"{}\" cy=\"{}\" r=\"{}\"{transform}>",
                    c.x1,
                    c.y1,
                    c.x2,
                    c.y2,
                    c.r2.unwrap_or(0.0),
                );
                "radialGradient"
            }
        };
        for stop in &gradient.stops {
            let _ = write!(
                self.defs,
                "<stop offset=\"{}\" stop-color=\"{}\"/>",
                stop.offset,
                escape_xml(&stop.color)
            );
        }
        let _ = write!(self.defs, "</{tag}>");
    }

    fn object(&mut self, index: usize, object: &SceneObject) {
        let (width, height) = object.intrinsic_size();
        // Adding zero folds -0 so matrices print cleanly.
        let coeffs = object
            .placement
            .transform(width, height)
            .as_coeffs()
            .map(|c| c + 0.0);
        let _ = write!(
            self.body,
            "<g transform=\"matrix({} {} {} {} {} {})\"",
            coeffs[0], coeffs[1], coeffs[2], coeffs[3], coeffs[4], coeffs[5],
        );
        if object.opacity < 1.0 {
            let _ = write!(self.body, " opacity=\"{}\"", object.opacity.max(0.0));
        }
        if object.blend_mode != BlendMode::SourceOver {
            let _ = write!(
                self.body,
                " style=\"mix-blend-mode:{}\"",
                object.blend_mode.css_name()
            );
        }
        if let Some(shadow) = &object.shadow {
            let id = format!("shadow-{index}");
            let _ = write!(
                self.defs,
                "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\"/></filter>",
                shadow.offset_x,
                shadow.offset_y,
                shadow.blur / 2.0,
                escape_xml(&shadow.color),
            );
            let _ = write!(self.body, " filter=\"url(#{id})\"");
        }
        self.body.push('>');

        let origin = Some((-width / 2.0, -height / 2.0));
        let fill = match &object.fill {
            Some(paint) => self.paint(&format!("fill-{index}"), paint, origin),
            None => "none".to_string(),
        };
        let stroke = stroke_attrs(object);

        match &object.kind {
            ObjectKind::Rect { rx, ry, .. } => {
                let _ = write!(
                    self.body,
                    "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\"",
                    -width / 2.0,
                    -height / 2.0,
                );
                if *rx > 0.0 || *ry > 0.0 {
                    let _ = write!(self.body, " rx=\"{rx}\" ry=\"{ry}\"");
                }
                let _ = write!(self.body, " fill=\"{fill}\"{stroke}/>");
            }
            ObjectKind::Circle { radius } => {
                let _ = write!(
                    self.body,
                    "<circle cx=\"0\" cy=\"0\" r=\"{radius}\" fill=\"{fill}\"{stroke}/>"
                );
            }
            ObjectKind::Text(text) => self.text(text, width, height, &fill, &stroke),
            ObjectKind::Image(image) => self.image(index, image, &stroke),
            ObjectKind::Line(line) => self.line(line, width, height, &stroke),
        }
        self.body.push_str("</g>");
    }

    fn text(&mut self, text: &TextObject, width: f64, height: f64, fill: &str, stroke: &str) {
        let font_size = text.font_size.unwrap_or(0.0);
        let (x, anchor) = match text.text_align {
            TextAlign::Left | TextAlign::Justify => (-width / 2.0, "start"),
            TextAlign::Center => (0.0, "middle"),
            TextAlign::Right => (width / 2.0, "end"),
        };
        let _ = write!(
            self.body,
            "<text font-size=\"{font_size}\" font-family=\"{}\" font-weight=\"{}\" font-style=\"{}\" text-anchor=\"{anchor}\" fill=\"{fill}\"{stroke}",
            escape_xml(&text.font_family),
            escape_xml(&text.font_weight),
            escape_xml(&text.font_style),
        );
        if text.char_spacing.abs() > f64::EPSILON {
            let _ = write!(
                self.body,
                " letter-spacing=\"{}\"",
                text.char_spacing / 1000.0 * font_size
            );
        }
        self.body.push('>');

        let line_advance = font_size * FONT_SIZE_MULT * LINE_HEIGHT;
        let mut top = -height / 2.0;
        for line in text.content.split('\n') {
            let baseline = top + font_size * (FONT_SIZE_MULT - DESCENT);
            let _ = write!(
                self.body,
                "<tspan x=\"{x}\" y=\"{baseline}\">{}</tspan>",
                escape_xml(line)
            );
            top += line_advance;
        }
        self.body.push_str("</text>");
    }

    fn image(&mut self, index: usize, image: &ImageObject, stroke: &str) {
        let (width, height) = (
            f64::from(image.natural_width),
            f64::from(image.natural_height),
        );
        let href = match &image.pixels {
            Some(pixels) => match png_data_uri(pixels) {
                Ok(uri) => uri,
                Err(e) => {
                    tracing::warn!(src = %image.src, error = %e, "Image not embedded");
                    return;
                }
            },
            None => escape_xml(&image.src),
        };

        let filter = self.image_filter(index, image);
        let _ = write!(
            self.body,
            "<image x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" preserveAspectRatio=\"none\" href=\"{href}\"{filter}/>",
            -width / 2.0,
            -height / 2.0,
        );
        if !stroke.is_empty() {
            let _ = write!(
                self.body,
                "<rect x=\"{}\" y=\"{}\" width=\"{width}\" height=\"{height}\" fill=\"none\"{stroke}/>",
                -width / 2.0,
                -height / 2.0,
            );
        }
    }

    /// Filter chain definition; returns the attribute to reference it.
    fn image_filter(&mut self, index: usize, image: &ImageObject) -> String {
        if image.filters.is_empty() {
            return String::new();
        }
        let id = format!("filters-{index}");
        let longer_side = f64::from(image.natural_width.max(image.natural_height));
        let _ = write!(self.defs, "<filter id=\"{id}\">");
        for filter in &image.filters {
            match *filter {
                ImageFilter::Blur(value) => {
                    let _ = write!(
                        self.defs,
                        "<feGaussianBlur stdDeviation=\"{}\"/>",
                        value.clamp(0.0, 1.0) * longer_side * BLUR_EXTENT
                    );
                }
                ImageFilter::Brightness(value) => {
                    self.component_transfer(1.0, value.clamp(-1.0, 1.0));
                }
                ImageFilter::Contrast(value) => {
                    let c = value.clamp(-1.0, 1.0) * 255.0;
                    let factor = 259.0 * (c + 255.0) / (255.0 * (259.0 - c));
                    self.component_transfer(factor, 0.5 * (1.0 - factor));
                }
            }
        }
        self.defs.push_str("</filter>");
        format!(" filter=\"url(#{id})\"")
    }

    fn component_transfer(&mut self, slope: f64, intercept: f64) {
        self.defs.push_str("<feComponentTransfer>");
        for channel in ["R", "G", "B"] {
            let _ = write!(
                self.defs,
                "<feFunc{channel} type=\"linear\" slope=\"{slope}\" intercept=\"{intercept}\"/>"
            );
        }
        self.defs.push_str("</feComponentTransfer>");
    }

    fn line(&mut self, line: &LineObject, width: f64, height: f64, stroke: &str) {
        let dx = line.x1.min(line.x2) + width / 2.0;
        let dy = line.y1.min(line.y2) + height / 2.0;
        let _ = write!(
            self.body,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{stroke}",
            line.x1 - dx,
            line.y1 - dy,
            line.x2 - dx,
            line.y2 - dy,
        );
        if !line.dash.is_empty() {
            let dash: Vec<String> = line.dash.iter().map(f64::to_string).collect();
            let _ = write!(self.body, " stroke-dasharray=\"{}\"", dash.join(","));
        }
        self.body.push_str("/>");
    }
}

fn stroke_attrs(object: &SceneObject) -> String {
    match &object.stroke {
        Some(color) if object.stroke_width > 0.0 => format!(
            " stroke=\"{}\" stroke-width=\"{}\"",
            escape_xml(color),
            object.stroke_width
        ),
        _ => String::new(),
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
