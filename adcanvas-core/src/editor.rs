//! Editor state: the scene, the active design and the wiring between them.

use std::sync::Arc;

use crate::element::ObjectId;
use crate::format::FormatSelector;
use crate::geometry::Viewport;
use crate::guides::{draw_safe_zone_guides, place_safe_zone_guides};
use crate::layout::{fallback_campaign, AiResponse, LayoutFormat};
use crate::loader::ImageLoader;
use crate::marker::mark_validation_errors;
use crate::platform::Platform;
use crate::render::{LayoutRenderer, RenderReport};
use crate::scene::Scene;
use crate::validation::{validate_canvas, ValidationError};
use crate::{CanvasError, CanvasResult};

/// Result of rendering the format selected for the current canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRender {
    /// Rendered format.
    pub format: LayoutFormat,
    /// Render summary.
    pub report: RenderReport,
}

/// Owns one canvas and everything that mutates it.
#[derive(Debug)]
pub struct Editor<L> {
    scene: Scene,
    design: Option<Arc<AiResponse>>,
    selector: FormatSelector,
    renderer: LayoutRenderer<L>,
    show_guides: bool,
}

impl<L: ImageLoader> Editor<L> {
    /// Editor with an empty canvas of the given size.
    #[must_use]
    pub fn new(renderer: LayoutRenderer<L>, width: u32, height: u32) -> Self {
        Self {
            scene: Scene::new(width, height),
            design: None,
            selector: FormatSelector::new(),
            renderer,
            show_guides: true,
        }
    }

    /// Turn safe-zone guides on or off.
    #[must_use]
    pub fn with_guides(mut self, show: bool) -> Self {
        self.show_guides = show;
        self
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable access for direct edits.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The active design.
    #[must_use]
    pub fn design(&self) -> Option<&Arc<AiResponse>> {
        self.design.as_ref()
    }

    /// Canvas size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.scene.width, self.scene.height)
    }

    /// Resize the canvas, re-rendering if a layout matches the new size.
    pub async fn set_size(&mut self, width: u32, height: u32) -> Option<FormatRender> {
        self.scene.set_size(width, height);
        let rendered = self.sync().await;
        if rendered.is_none() {
            self.refresh_guides();
        }
        rendered
    }

    /// Replace the active design, re-rendering if a layout matches.
    pub async fn set_design(&mut self, design: Option<AiResponse>) -> Option<FormatRender> {
        self.design = design.map(Arc::new);
        self.sync().await
    }

    /// Activate the built-in three-format campaign.
    pub async fn load_fallback_campaign(&mut self) -> Option<FormatRender> {
        self.set_design(Some(fallback_campaign())).await
    }

    /// Render whatever the selector picks for the current inputs.
    ///
    /// Guides are placed before the render commits, so its single redraw
    /// already shows them.
    async fn sync(&mut self) -> Option<FormatRender> {
        let (width, height) = self.size();
        let format = self.selector.update(width, height, self.design.as_ref())?;
        let design = Arc::clone(self.design.as_ref()?);
        let pending = self.renderer.begin(&mut self.scene, design.layout(format));
        if self.show_guides {
            place_safe_zone_guides(&mut self.scene);
        }
        let settled = self.renderer.settle(pending).await;
        let report = self.renderer.commit(&mut self.scene, settled);
        Some(FormatRender { format, report })
    }

    /// Re-render the current format even if nothing changed.
    pub async fn rerender(&mut self) -> Option<FormatRender> {
        self.selector.reset();
        self.sync().await
    }

    fn refresh_guides(&mut self) {
        if self.show_guides {
            draw_safe_zone_guides(&mut self.scene);
        } else {
            self.scene.remove_where(|o| o.guide);
        }
    }

    /// Fit the canvas into a container of the given size.
    pub fn fit_to(&mut self, container_width: f64, container_height: f64) -> Viewport {
        let (width, height) = self.size();
        self.scene.viewport = Viewport::fit(
            container_width,
            container_height,
            f64::from(width),
            f64::from(height),
        );
        self.scene.viewport
    }

    /// Validate the canvas and outline offending objects.
    pub fn validate(&mut self, platform: Platform) -> Vec<ValidationError> {
        let (width, height) = self.size();
        let errors = validate_canvas(&self.scene, platform, width, height);
        mark_validation_errors(&mut self.scene, &errors);
        errors
    }

    /// Replace the content of a text object, keeping its anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing or is not text.
    pub fn edit_text(&mut self, id: ObjectId, content: &str) -> CanvasResult<()> {
        let object = self
            .scene
            .get_mut(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))?;
        if !object.set_text(content) {
            return Err(CanvasError::InvalidOperation(format!("{id} is not text")));
        }
        self.scene.request_render_all();
        Ok(())
    }

    /// Remove an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is missing.
    pub fn remove(&mut self, id: ObjectId) -> CanvasResult<()> {
        self.scene.remove(id)?;
        self.scene.request_render_all();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::fallback_campaign;
    use crate::loader::MemoryLoader;

    const SHOE: &str =
        "https://png.pngtree.com/png-clipart/20240901/original/pngtree-sports-shoes-png-image_15910407.png";

    fn editor(width: u32, height: u32) -> Editor<MemoryLoader> {
        let loader = MemoryLoader::new().with_solid(SHOE, 400, 300, [255, 255, 255, 255]);
        Editor::new(LayoutRenderer::new(loader), width, height)
    }

    #[tokio::test]
    async fn test_campaign_renders_matching_format() {
        let mut editor = editor(1080, 1920);
        let rendered = editor.load_fallback_campaign().await.expect("story matches");
        assert_eq!(rendered.format, LayoutFormat::Story);
        assert_eq!(rendered.report.added, 2);
        // Two content objects plus two guides.
        assert_eq!(editor.scene().len(), 4);
    }

    #[tokio::test]
    async fn test_story_render_paints_once() {
        let mut story = editor(1080, 1920);
        story.load_fallback_campaign().await.expect("story matches");
        assert_eq!(story.scene().paint_count(), 1);
        assert_eq!(story.scene().objects().filter(|o| o.guide).count(), 2);

        story.rerender().await.expect("story matches");
        assert_eq!(story.scene().paint_count(), 2);

        let mut hidden = editor(1080, 1920).with_guides(false);
        hidden.load_fallback_campaign().await.expect("story matches");
        assert_eq!(hidden.scene().paint_count(), 1);
        assert!(hidden.scene().objects().all(|o| !o.guide));
    }

    #[tokio::test]
    async fn test_unmatched_size_keeps_last_render() {
        let mut editor = editor(1080, 1080);
        editor.load_fallback_campaign().await.expect("post matches");
        let before: Vec<_> = editor.scene().objects().map(|o| o.id).collect();

        assert!(editor.set_size(640, 480).await.is_none());
        let after: Vec<_> = editor.scene().objects().map(|o| o.id).collect();
        assert_eq!(before, after);

        let rendered = editor.set_size(1200, 628).await.expect("banner matches");
        assert_eq!(rendered.format, LayoutFormat::Banner);
    }

    #[tokio::test]
    async fn test_validate_marks_offenders() {
        let mut editor = editor(1080, 1920);
        editor
            .set_design(Some(fallback_campaign()))
            .await
            .expect("rendered");
        let errors = editor.validate(Platform::Social);
        for error in errors.iter().filter_map(|e| e.id) {
            let object = editor.scene().get(error).expect("present");
            assert_eq!(object.stroke.as_deref(), Some(crate::marker::HIGHLIGHT_STROKE));
        }
        assert_eq!(errors, editor.validate(Platform::Social));
    }

    #[tokio::test]
    async fn test_edit_text_rejects_non_text() {
        let mut editor = editor(1080, 1080);
        editor.load_fallback_campaign().await.expect("rendered");
        let image = editor
            .scene()
            .objects()
            .find(|o| !o.is_text())
            .map(|o| o.id)
            .expect("image present");
        assert!(matches!(
            editor.edit_text(image, "nope"),
            Err(CanvasError::InvalidOperation(_))
        ));
        assert!(editor.remove(image).is_ok());
        assert!(matches!(
            editor.remove(image),
            Err(CanvasError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_fit_to_container() {
        let mut editor = editor(1080, 1920);
        let viewport = editor.fit_to(600.0, 1020.0);
        assert!((viewport.zoom - 0.5).abs() < 1e-12);
    }
}
