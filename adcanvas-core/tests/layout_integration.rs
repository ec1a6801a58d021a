//! Layout Rendering and Validation Integration Tests
//!
//! Tests the complete design flow including:
//! - Full-replace, idempotent rendering
//! - Origin, clamp-and-scale and z-order fidelity
//! - Platform rule validation and violation marking
//! - Copy compliance

use adcanvas_core::{
    check_copy, mark_validation_errors, validate_canvas, validate_copy, CopyCategory,
    LayoutConfig, LayoutRenderer, MemoryLoader, ObjectId, ObjectKind, Platform, Scene, SceneObject,
    Viewport, ViolationKind,
};

const STORY_LAYOUT: &str = r##"{
    "width": 1080,
    "height": 1920,
    "backgroundColor": "#509E66",
    "undefinedField": null,
    "elements": [
        { "type": "rect", "width": 1080, "height": 420, "top": 1500, "left": 0, "fill": "#1d1d1d" },
        { "type": "image", "url": "product.png", "top": 900, "left": 540,
          "originX": "center", "originY": "center", "width": 600 },
        { "type": "text", "content": "STEP UP", "top": 100, "left": 540,
          "originX": "center", "fontSize": 200, "color": "white" },
        { "type": "image", "url": "logo.png", "top": 1700, "left": 540,
          "originX": "center", "originY": "center", "width": 200 },
        { "type": "circle", "radius": 40, "top": 300, "left": 100 },
        { "type": "sparkles" }
    ]
}"##;

/// Loader serving the images referenced by the test layouts.
fn loader() -> MemoryLoader {
    MemoryLoader::new()
        .with_solid("product.png", 400, 300, [240, 240, 240, 255])
        .with_solid("logo.png", 100, 100, [0, 0, 0, 255])
}

fn parse(json: &str) -> LayoutConfig {
    LayoutConfig::from_json(json).expect("valid layout")
}

/// Content summary that ignores generated ids.
fn signature(scene: &Scene) -> Vec<String> {
    scene
        .objects()
        .map(|o| {
            let mut o: SceneObject = o.clone();
            o.id = ObjectId::from_uuid(uuid::Uuid::nil());
            serde_json::to_string(&o).expect("serialize object")
        })
        .collect()
}

fn kind_name(object: &SceneObject) -> &'static str {
    match &object.kind {
        ObjectKind::Rect { .. } => "rect",
        ObjectKind::Circle { .. } => "circle",
        ObjectKind::Text(_) => "text",
        ObjectKind::Image(image) if image.src == "logo.png" => "logo",
        ObjectKind::Image(_) => "image",
        ObjectKind::Line(_) => "line",
    }
}

// ============================================================================
// Rendering Tests
// ============================================================================

#[tokio::test]
async fn test_render_is_idempotent() {
    let renderer = LayoutRenderer::new(loader());
    let layout = parse(STORY_LAYOUT);
    let mut scene = Scene::new(1080, 1920);

    renderer.render(&mut scene, &layout).await;
    let first = signature(&scene);
    renderer.render(&mut scene, &layout).await;
    let second = signature(&scene);

    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_render_is_full_replace() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);

    renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;
    let previous: Vec<_> = scene.objects().map(|o| o.id).collect();

    let next = parse(
        r#"{ "width": 1080, "height": 1920, "elements": [
            { "type": "rect", "width": 10, "height": 10, "top": 500 },
            { "type": "text" }
        ] }"#,
    );
    let report = renderer.render(&mut scene, &next).await;

    assert_eq!(scene.len(), 1);
    assert_eq!(report.added, 1);
    assert!(scene.objects().all(|o| !previous.contains(&o.id)));
    assert_eq!(scene.background.as_color(), Some("#ffffff"));
}

#[tokio::test]
async fn test_images_keep_declared_z_order() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);
    let report = renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;

    let order: Vec<_> = scene.objects().map(kind_name).collect();
    assert_eq!(order, vec!["rect", "image", "text", "logo", "circle"]);
    assert_eq!(report.skipped, 1);
    assert_eq!(scene.paint_count(), 1);
}

#[tokio::test]
async fn test_loosely_typed_fields_do_not_drop_elements() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);
    let layout = parse(
        r##"{
            "width": 1080.0,
            "height": 1920,
            "backgroundGradient": { "type": "conic", "stops": [] },
            "texture": { "opacity": 0.3 },
            "elements": [
                { "type": "text", "content": "SUMMER SALE", "top": 300, "fontSize": 90,
                  "shadow": "0 4px 10px rgba(0,0,0,0.5)" },
                { "type": "text", "content": "New season", "top": 500, "fontSize": 60,
                  "opacity": "0.9" }
            ]
        }"##,
    );
    let report = renderer.render(&mut scene, &layout).await;

    assert_eq!(report.added, 2);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.failed_images, 0);
    assert_eq!(scene.background.as_color(), Some("#ffffff"));
    assert!(scene.objects().all(SceneObject::is_text));
}

#[tokio::test]
async fn test_large_text_reaches_requested_height() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);
    renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;

    let headline = scene.objects().find(|o| o.is_text()).expect("headline");
    assert_eq!(headline.text().and_then(|t| t.font_size), Some(80.0));
    let bbox = headline.bounding_box();
    assert!((bbox.height() - 200.0).abs() < 1e-9);
    assert!((bbox.y0 - 100.0).abs() < 1e-9);
    assert!((bbox.center().x - 540.0).abs() < 1e-9);
}

// ============================================================================
// Validation Tests
// ============================================================================

#[tokio::test]
async fn test_validation_is_deterministic_and_zoom_independent() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);
    renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;

    let baseline = validate_canvas(&scene, Platform::Social, 1080, 1920);
    let again = validate_canvas(&scene, Platform::Social, 1080, 1920);
    assert_eq!(
        serde_json::to_string(&baseline).expect("serialize"),
        serde_json::to_string(&again).expect("serialize")
    );

    scene.viewport = Viewport::fit(800.0, 900.0, 1080.0, 1920.0);
    let zoomed = validate_canvas(&scene, Platform::Social, 1080, 1920);
    assert_eq!(baseline, zoomed);

    // The dark footer rect reaches the canvas bottom.
    assert!(baseline
        .iter()
        .any(|e| e.kind == ViolationKind::BottomSafeZone));
}

#[tokio::test]
async fn test_aspect_mismatch_reported_without_id() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1080);
    renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;

    let errors = validate_canvas(&scene, Platform::Social, 1080, 1080);
    assert_eq!(errors[0].kind, ViolationKind::CanvasSize);
    assert!(errors[0].id.is_none());
    assert!(errors.len() > 1);
}

#[tokio::test]
async fn test_mark_then_fix_then_mark() {
    let renderer = LayoutRenderer::new(loader());
    let mut scene = Scene::new(1080, 1920);
    renderer.render(&mut scene, &parse(STORY_LAYOUT)).await;

    let errors = validate_canvas(&scene, Platform::Social, 1080, 1920);
    let flagged = mark_validation_errors(&mut scene, &errors);
    assert!(flagged > 0);
    assert_eq!(mark_validation_errors(&mut scene, &errors), flagged);

    // Delete every offender, then re-validate and re-mark.
    for id in errors.iter().filter_map(|e| e.id) {
        let _ = scene.remove(id);
    }
    let errors = validate_canvas(&scene, Platform::Social, 1080, 1920);
    assert!(errors.is_empty());
    assert_eq!(mark_validation_errors(&mut scene, &errors), 0);
    assert!(scene.objects().all(|o| o.stroke.is_none()));
}

// ============================================================================
// Copy Compliance Tests
// ============================================================================

#[test]
fn test_copy_checker_examples() {
    assert_eq!(
        check_copy("Save £5 now!").map(|v| v.category),
        Some(CopyCategory::Pricing)
    );
    assert_eq!(validate_copy(""), None);
    assert_eq!(validate_copy("Fresh quality you can trust"), None);
}
