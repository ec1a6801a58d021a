//! Integration tests for image loading and scene export (adcanvas-renderer).
//!
//! Renders layouts through the real fetcher from temporary files and data
//! URIs, then checks the exported rasters.

use std::path::Path;

use adcanvas_core::{
    draw_safe_zone_guides, ImagePixels, LayoutConfig, LayoutRenderer, Scene, Viewport,
};
use adcanvas_renderer::export::{ExportConfig, ExportFormat, SceneExporter};
use adcanvas_renderer::image::png_data_uri;
use adcanvas_renderer::{encode_png, ImageFetcher, DEFAULT_EXPORT_FILE};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];

fn exporter(quality: f64) -> SceneExporter {
    SceneExporter::new(ExportConfig {
        quality,
        system_fonts: false,
        ..ExportConfig::default()
    })
}

/// Write a solid PNG into `dir` and return its path as a string.
fn write_png(dir: &Path, name: &str, rgba: [u8; 4]) -> String {
    let path = dir.join(name);
    let png = encode_png(&ImagePixels::solid(4, 4, rgba)).expect("encode");
    std::fs::write(&path, png).expect("write png");
    path.to_string_lossy().into_owned()
}

fn layout(elements: &serde_json::Value) -> LayoutConfig {
    let json = serde_json::json!({
        "width": 100,
        "height": 80,
        "backgroundColor": "#000000",
        "elements": elements,
    });
    LayoutConfig::from_json(&json.to_string()).expect("layout")
}

fn pixel(png: &[u8], x: u32, y: u32) -> [u8; 4] {
    image::load_from_memory(png)
        .expect("decode")
        .to_rgba8()
        .get_pixel(x, y)
        .0
}

// ==========================================================================
// Render-then-export tests
// ==========================================================================

#[tokio::test]
async fn test_file_image_rendered_and_exported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let product = write_png(dir.path(), "product.png", RED);
    let layout = layout(&serde_json::json!([
        { "type": "image", "url": product, "left": 10, "top": 10, "width": 20 },
        { "type": "rect", "left": 60, "top": 40, "width": 20, "height": 20, "fill": "#00ff00" },
    ]));

    let renderer = LayoutRenderer::new(ImageFetcher::new().expect("fetcher"));
    let mut scene = Scene::new(100, 80);
    let report = renderer.render(&mut scene, &layout).await;
    assert_eq!(report.added, 2);
    assert_eq!(report.failed_images, 0);

    let png = exporter(1.0).render_to_png(&scene).expect("png");
    assert_eq!(pixel(&png, 20, 20), RED);
    assert_eq!(pixel(&png, 70, 50), GREEN);
    assert_eq!(pixel(&png, 50, 5), [0, 0, 0, 255]);
}

#[tokio::test]
async fn test_data_uri_and_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let inline = png_data_uri(&ImagePixels::solid(2, 2, GREEN)).expect("data uri");
    let missing = dir.path().join("gone.png").to_string_lossy().into_owned();
    let layout = layout(&serde_json::json!([
        { "type": "image", "url": missing, "left": 0, "top": 0, "width": 50 },
        { "type": "image", "url": inline, "left": 50, "top": 0, "width": 50 },
    ]));

    let renderer = LayoutRenderer::new(ImageFetcher::new().expect("fetcher"));
    let mut scene = Scene::new(100, 80);
    let report = renderer.render(&mut scene, &layout).await;
    assert_eq!(report.added, 1);
    assert_eq!(report.failed_images, 1);

    let png = exporter(1.0).render_to_png(&scene).expect("png");
    assert_eq!(pixel(&png, 75, 25), GREEN);
    assert_eq!(pixel(&png, 25, 25), [0, 0, 0, 255]);
}

// ==========================================================================
// Export tests
// ==========================================================================

#[test]
fn test_export_size_independent_of_zoom() {
    let mut scene = Scene::new(120, 60);
    let exporter = exporter(3.0);
    let at_rest = exporter.render_to_png(&scene).expect("png");

    scene.viewport = Viewport::fit(300.0, 200.0, 120.0, 60.0);
    let zoomed = exporter.render_to_png(&scene).expect("png");

    let size = |png: &[u8]| {
        let img = image::load_from_memory(png).expect("decode");
        (img.width(), img.height())
    };
    assert_eq!(size(&at_rest), (360, 180));
    assert_eq!(size(&at_rest), size(&zoomed));
}

#[test]
fn test_export_to_file_uses_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut scene = Scene::new(1080, 1920);
    draw_safe_zone_guides(&mut scene);
    let exporter = exporter(0.1);

    let png_path = dir.path().join(DEFAULT_EXPORT_FILE);
    let format = exporter.export_to_file(&scene, &png_path).expect("png file");
    assert_eq!(format, ExportFormat::Png);
    let bytes = std::fs::read(&png_path).expect("read");
    assert_eq!(&bytes[0..4], &[137, 80, 78, 71]);
    // Guides stay out of the export.
    assert_eq!(pixel(&bytes, 50, 1), [255, 255, 255, 255]);

    let svg_path = dir.path().join("design.svg");
    let format = exporter.export_to_file(&scene, &svg_path).expect("svg file");
    assert_eq!(format, ExportFormat::Svg);
    let svg = std::fs::read_to_string(&svg_path).expect("read");
    assert!(svg.starts_with("<svg"));
    assert!(!svg.contains("<line"));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("out.png");
    let result = exporter(1.0).export_to_file(&Scene::new(10, 10), &path);
    assert!(matches!(result, Err(adcanvas_renderer::RenderError::Io(_))));
}
