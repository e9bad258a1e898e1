use thiserror::Error;

use crate::hologram::Hologram;
use crate::host::ObserverId;
use crate::interact::InteractHandler;
use crate::line::{HologramLine, LineContent};
use crate::metadata::DisplaySettings;
use crate::registry::{HologramId, HologramRegistry};

/// Vertical footprint of one line, in blocks.
pub const LINE_HEIGHT: f32 = 0.26;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("hologram requires at least one line")]
    NoLines,
}

/// Fluent composition of hologram lines, top to bottom.
///
/// Content variants are closed: anything a line can render is expressible
/// here, so there is no unsupported-type failure left for build time beyond
/// the zero-line check.
#[derive(Default)]
pub struct HologramBuilder {
    lines: Vec<(LineContent, DisplaySettings)>,
    interact_handler: Option<InteractHandler>,
}

impl HologramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fixed-text line below the ones already added.
    pub fn add_line(mut self, text: impl Into<String>) -> Self {
        self.lines
            .push((LineContent::Static(text.into()), DisplaySettings::text_line()));
        self
    }

    /// Append a line whose text is resolved per observer on every update.
    pub fn add_dynamic_line<F>(mut self, resolver: F) -> Self
    where
        F: Fn(ObserverId) -> String + Send + Sync + 'static,
    {
        self.lines.push((
            LineContent::Dynamic(Box::new(resolver)),
            DisplaySettings::text_line(),
        ));
        self
    }

    /// Append an invisible spacer line.
    pub fn add_empty_line(mut self) -> Self {
        self.lines
            .push((LineContent::Empty, DisplaySettings::empty_line()));
        self
    }

    pub fn interact_handler(mut self, handler: InteractHandler) -> Self {
        self.interact_handler = Some(handler);
        self
    }

    /// Allocate entity ids, compute line offsets, and register the hologram.
    pub fn build(self, registry: &mut HologramRegistry) -> Result<HologramId, BuildError> {
        if self.lines.is_empty() {
            return Err(BuildError::NoLines);
        }

        let count = self.lines.len();
        let mut lines = Vec::with_capacity(count);
        for (index, (content, settings)) in self.lines.into_iter().enumerate() {
            // Offsets accumulate from the bottom row upward, so the top line
            // (index 0) sits highest above the anchor.
            let offset = LINE_HEIGHT * (count - index) as f32;
            let entity_id = registry.allocator_mut().next_id();
            lines.push(HologramLine::new(entity_id, settings, offset, content));
        }

        Ok(registry.register(Hologram::new(lines, self.interact_handler)))
    }
}
