//! Picks the layout variant matching the live canvas size.

use std::sync::Arc;

use crate::layout::{AiResponse, LayoutFormat};

/// Reactive binding over canvas size and the active design.
///
/// [`FormatSelector::update`] answers "what should be rendered now?" and
/// answers it at most once per distinct set of inputs.
#[derive(Debug, Clone, Default)]
pub struct FormatSelector {
    last: Option<(u32, u32, Option<Arc<AiResponse>>)>,
}

impl FormatSelector {
    /// Selector that has seen no inputs yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current inputs.
    ///
    /// Returns the format to render when the inputs changed since the last
    /// call, a design is present and the canvas size matches one of its
    /// formats. Otherwise returns `None` and the scene should be left alone.
    pub fn update(
        &mut self,
        width: u32,
        height: u32,
        design: Option<&Arc<AiResponse>>,
    ) -> Option<LayoutFormat> {
        let unchanged = self.last.as_ref().is_some_and(|(w, h, d)| {
            *w == width
                && *h == height
                && match (d, design) {
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                    (None, None) => true,
                    _ => false,
                }
        });
        if unchanged {
            return None;
        }
        self.last = Some((width, height, design.cloned()));

        design?;
        let format = LayoutFormat::from_dimensions(width, height);
        if format.is_none() {
            tracing::debug!(width, height, "No layout matches canvas size");
        }
        format
    }

    /// Forget the last inputs so the next update selects again.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
