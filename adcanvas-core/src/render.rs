//! Layout rendering: clear the scene, paint the background, materialize
//! every element in document order and wait for every image to settle.
//!
//! A render runs in three steps so a caller can interleave it with other
//! work on the scene while images load:
//!
//! 1. [`LayoutRenderer::begin`] clears the scene, starts a new epoch and
//!    adds every synchronous object.
//! 2. [`LayoutRenderer::settle`] awaits all image loads. It does not touch
//!    the scene.
//! 3. [`LayoutRenderer::commit`] inserts the resolved images at their
//!    declared positions and requests one redraw, unless a newer render has
//!    started in the meantime, in which case the images are discarded.
//!
//! [`LayoutRenderer::render`] runs all three back to back.

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::element::{Paint, SceneObject};
use crate::layout::{LayoutConfig, Texture};
use crate::loader::{ImageLoader, ImageRequest};
use crate::materialize::{Materialized, Materializer, PendingImage};
use crate::scene::Scene;

/// Summary of one render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// Render generation this report belongs to.
    pub epoch: u64,
    /// Objects added to the scene, texture included.
    pub added: usize,
    /// Descriptors skipped as malformed.
    pub skipped: usize,
    /// Images (texture included) whose load failed.
    pub failed_images: usize,
    /// Whether a newer render superseded this one before it committed.
    pub stale: bool,
}

/// A render whose synchronous part is done and whose images are pending.
#[derive(Debug)]
#[must_use = "a pending render does nothing until settled and committed"]
pub struct PendingRender {
    epoch: u64,
    width: u32,
    height: u32,
    texture: Option<Texture>,
    images: Vec<(usize, PendingImage)>,
    report: RenderReport,
}

impl PendingRender {
    /// Render generation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of outstanding image loads, texture included.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.images.len() + usize::from(self.texture.is_some())
    }
}

/// A render whose images have all settled.
#[derive(Debug)]
#[must_use = "a settled render does nothing until committed"]
pub struct SettledRender {
    epoch: u64,
    objects: Vec<SceneObject>,
    report: RenderReport,
}

/// Renders [`LayoutConfig`]s into a [`Scene`].
#[derive(Debug, Clone)]
pub struct LayoutRenderer<L> {
    loader: L,
    materializer: Materializer,
}

impl<L: ImageLoader> LayoutRenderer<L> {
    /// Renderer loading images through `loader`.
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            materializer: Materializer::default(),
        }
    }

    /// Use a specific materializer.
    #[must_use]
    pub fn with_materializer(mut self, materializer: Materializer) -> Self {
        self.materializer = materializer;
        self
    }

    /// The image loader.
    #[must_use]
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// The materializer.
    #[must_use]
    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    /// Render a layout from start to finish.
    pub async fn render(&self, scene: &mut Scene, layout: &LayoutConfig) -> RenderReport {
        let pending = self.begin(scene, layout);
        let settled = self.settle(pending).await;
        self.commit(scene, settled)
    }

    /// Clear the scene and add every synchronous object in document order.
    ///
    /// Image slots are reserved so that images later land between the
    /// objects declared around them.
    pub fn begin(&self, scene: &mut Scene, layout: &LayoutConfig) -> PendingRender {
        scene.clear();
        let epoch = scene.advance_epoch();
        scene.background = layout.background();
        if let Paint::Gradient(_) = scene.background {
            debug!(epoch, "Gradient background");
        }

        let mut report = RenderReport {
            epoch,
            ..RenderReport::default()
        };
        let mut images = Vec::new();
        // Slot 0 belongs to the texture.
        for (index, descriptor) in layout.elements.iter().enumerate() {
            let slot = index + 1;
            match self.materializer.materialize(descriptor) {
                Materialized::Ready(mut object) => {
                    object.layout_slot = Some(slot);
                    scene.add(object);
                    report.added += 1;
                }
                Materialized::Pending(image) => images.push((slot, image)),
                Materialized::Skipped(_) => report.skipped += 1,
            }
        }

        PendingRender {
            epoch,
            width: layout.width,
            height: layout.height,
            texture: layout.texture.clone().filter(|t| !t.url.is_empty()),
            images,
            report,
        }
    }

    /// Wait for every image load to settle. Failures are tolerated.
    pub async fn settle(&self, pending: PendingRender) -> SettledRender {
        let PendingRender {
            epoch,
            width,
            height,
            texture,
            images,
            mut report,
        } = pending;

        let texture_load = async {
            match &texture {
                Some(texture) => Some(
                    self.loader
                        .load(&ImageRequest::anonymous(texture.url.clone()))
                        .await,
                ),
                None => None,
            }
        };
        let image_loads = join_all(
            images
                .iter()
                .map(|(_, image)| self.loader.load(&image.request)),
        );
        let (texture_result, image_results) = futures::join!(texture_load, image_loads);

        let mut objects = Vec::with_capacity(images.len() + 1);
        if let (Some(texture), Some(result)) = (&texture, texture_result) {
            match result {
                Ok(pixels) => {
                    let mut object =
                        self.materializer.finish_texture(texture, pixels, width, height);
                    object.layout_slot = Some(0);
                    objects.push(object);
                }
                Err(e) => {
                    warn!(epoch, url = %texture.url, error = %e, "Texture failed to load");
                    report.failed_images += 1;
                }
            }
        }
        for ((slot, image), result) in images.iter().zip(image_results) {
            match result {
                Ok(pixels) => {
                    let mut object = self.materializer.finish_image(&image.descriptor, pixels);
                    object.layout_slot = Some(*slot);
                    objects.push(object);
                }
                Err(e) => {
                    warn!(epoch, url = %image.request.url, error = %e, "Image failed to load");
                    report.failed_images += 1;
                }
            }
        }

        SettledRender {
            epoch,
            objects,
            report,
        }
    }

    /// Insert settled images and request one redraw.
    ///
    /// If the scene has moved on to a newer render, nothing is inserted and
    /// the report is marked stale.
    pub fn commit(&self, scene: &mut Scene, settled: SettledRender) -> RenderReport {
        let SettledRender {
            epoch,
            objects,
            mut report,
        } = settled;

        if scene.epoch() != epoch {
            debug!(
                epoch,
                current = scene.epoch(),
                discarded = objects.len(),
                "Discarding stale render"
            );
            report.stale = true;
            return report;
        }

        for object in objects {
            scene.insert_in_slot(object);
            report.added += 1;
        }
        scene.request_render_all();

        info!(
            epoch,
            added = report.added,
            skipped = report.skipped,
            failed_images = report.failed_images,
            "Layout rendered"
        );
        report
    }
}
