use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::slide::{ImageRef, Slide, SlideId, SlideImage, TransitionKind};

/// Immutable snapshot of the slides in presentation order.
///
/// Cloning is cheap. Every update returns a new deck in which only the targeted slide
/// differs, so in-flight exports keep reading the snapshot they started with.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlideDeck {
    slides: Arc<[Slide]>,
}

impl SlideDeck {
    pub fn new(slides: Vec<Slide>) -> Self {
        Self {
            slides: slides.into(),
        }
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, id: SlideId) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    /// Copy-on-write update of the slide with `id`.
    pub fn with_slide(&self, id: SlideId, update: impl FnOnce(&Slide) -> Slide) -> ReelResult<Self> {
        let pos = self
            .slides
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| ReelError::validation(format!("unknown slide {id}")))?;
        let replacement = update(&self.slides[pos]);
        if replacement.id != id {
            return Err(ReelError::validation(format!(
                "slide update must keep id {id} (got {})",
                replacement.id
            )));
        }
        let slides = self
            .slides
            .iter()
            .enumerate()
            .map(|(i, s)| if i == pos { replacement.clone() } else { s.clone() })
            .collect::<Vec<_>>();
        Ok(Self::new(slides))
    }

    /// Shorthand for replacing one slide's image state.
    pub fn with_image(&self, id: SlideId, image: SlideImage) -> ReelResult<Self> {
        self.with_slide(id, |s| Slide {
            image,
            status_text: None,
            ..s.clone()
        })
    }

    /// Transition of every slide, indexed like [`Self::slides`].
    pub fn transitions(&self) -> Vec<Option<TransitionKind>> {
        self.slides.iter().map(|s| s.transition).collect()
    }

    /// Image sources of every slide, or the first condition that blocks an export.
    pub fn ready_sources(&self) -> ReelResult<Vec<ImageRef>> {
        if self.slides.is_empty() {
            return Err(ReelError::export_blocked("there are no slides to export"));
        }
        self.slides
            .iter()
            .enumerate()
            .map(|(i, s)| match &s.image {
                SlideImage::Ready(r) => Ok(r.clone()),
                SlideImage::Pending => Err(ReelError::export_blocked(format!(
                    "slide {} ({}) is still waiting for its image",
                    i + 1,
                    s.id
                ))),
                SlideImage::Failed { reason } => Err(ReelError::export_blocked(format!(
                    "slide {} ({}) has no image: {reason}",
                    i + 1,
                    s.id
                ))),
            })
            .collect()
    }

    /// `true` once every slide has a resolved image.
    pub fn is_exportable(&self) -> bool {
        !self.slides.is_empty() && self.slides.iter().all(|s| s.image.is_ready())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/deck.rs"]
mod tests;
