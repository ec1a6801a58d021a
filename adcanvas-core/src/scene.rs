//! Scene graph for managing canvas objects.
//!
//! Objects are kept in paint order: index 0 is drawn first (bottom of the
//! z-order), the last object is drawn on top.

use serde::{Deserialize, Serialize};

use crate::element::{ObjectId, Paint, SceneObject};
use crate::geometry::Viewport;
use crate::layout::DEFAULT_BACKGROUND;
use crate::{CanvasError, CanvasResult};

/// A scene containing all canvas objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Objects in paint order.
    objects: Vec<SceneObject>,
    /// Logical canvas width.
    pub width: u32,
    /// Logical canvas height.
    pub height: u32,
    /// Background paint.
    pub background: Paint,
    /// On-screen zoom and pan.
    #[serde(default)]
    pub viewport: Viewport,
    /// Render generation; bumped whenever a new render starts.
    #[serde(skip)]
    epoch: u64,
    /// Number of full redraws requested.
    #[serde(skip)]
    paint_count: u64,
}

impl Scene {
    /// Create a new empty scene with the given logical size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            objects: Vec::new(),
            width,
            height,
            background: Paint::Color(DEFAULT_BACKGROUND.to_string()),
            viewport: Viewport::default(),
            epoch: 0,
            paint_count: 0,
        }
    }

    /// Add an object on top of the scene.
    pub fn add(&mut self, object: SceneObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    /// Insert an object at a paint index, clamped to the scene length.
    pub fn insert(&mut self, index: usize, object: SceneObject) -> ObjectId {
        let id = object.id;
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        id
    }

    /// Insert an object according to its layout slot: below the first
    /// object declared after it, otherwise on top.
    pub fn insert_in_slot(&mut self, object: SceneObject) -> ObjectId {
        let index = object.layout_slot.map_or(self.objects.len(), |slot| {
            self.objects
                .iter()
                .position(|o| o.layout_slot.is_some_and(|s| s > slot))
                .unwrap_or(self.objects.len())
        });
        self.insert(index, object)
    }

    /// Remove an object from the scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn remove(&mut self, id: ObjectId) -> CanvasResult<SceneObject> {
        let index = self.require_index(id)?;
        Ok(self.objects.remove(index))
    }

    /// Remove every object matching a predicate, returning how many went.
    pub fn remove_where(&mut self, predicate: impl Fn(&SceneObject) -> bool) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !predicate(o));
        before - self.objects.len()
    }

    /// Get an object by ID.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Get a mutable reference to an object by ID.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    /// Paint index of an object.
    #[must_use]
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id == id)
    }

    fn require_index(&self, id: ObjectId) -> CanvasResult<usize> {
        self.index_of(id)
            .ok_or_else(|| CanvasError::ObjectNotFound(id.to_string()))
    }

    /// All objects in paint order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Mutable references to all objects in paint order.
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    /// Number of objects in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the scene has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Remove every object and reset the background.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background = Paint::Color(DEFAULT_BACKGROUND.to_string());
    }

    /// Set the logical canvas size.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Move an object one step up the z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_forward(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        if index + 1 < self.objects.len() {
            self.objects.swap(index, index + 1);
        }
        Ok(())
    }

    /// Move an object one step down the z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_backwards(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        if index > 0 {
            self.objects.swap(index, index - 1);
        }
        Ok(())
    }

    /// Move an object to the top of the z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn bring_to_front(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        let object = self.objects.remove(index);
        self.objects.push(object);
        Ok(())
    }

    /// Move an object to the bottom of the z-order.
    ///
    /// # Errors
    ///
    /// Returns an error if the object is not found.
    pub fn send_to_back(&mut self, id: ObjectId) -> CanvasResult<()> {
        let index = self.require_index(id)?;
        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        Ok(())
    }

    /// Current render generation.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a new render generation and return it.
    pub fn advance_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Request a full redraw.
    pub fn request_render_all(&mut self) {
        self.paint_count += 1;
        tracing::trace!(paint = self.paint_count, objects = self.objects.len(), "Redraw requested");
    }

    /// Number of full redraws requested so far.
    #[must_use]
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    /// Serialize the scene to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CanvasResult<String> {
        serde_json::to_string(self).map_err(CanvasError::Serialization)
    }

    /// Deserialize a scene from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> CanvasResult<Self> {
        serde_json::from_str(json).map_err(CanvasError::Serialization)
    }
}
