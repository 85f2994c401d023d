use std::sync::Arc;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Canvas, FrameIndex, Rgba8Premul, Vec2};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::surface::Surface;
use crate::render::transitions::{TransitionCtx, draw_cover, lookup};
use crate::scene::slide::TransitionKind;
use crate::timeline::{EntryKind, Timeline};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOpts {
    /// Straight RGBA, forced opaque when cleared.
    pub background_rgba: [u8; 4],
    /// Extra scale a slide gains over its interval (`0.1` means 100% -> 110%).
    pub ken_burns_zoom: f64,
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            background_rgba: [0, 0, 0, 255],
            ken_burns_zoom: 0.1,
        }
    }
}

/// What is on screen at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameState {
    Slide { index: usize, progress: f64 },
    Transition { from: usize, to: usize, progress: f64 },
}

/// Draws frames of a slideshow from its timeline and decoded slide images.
pub struct FrameRenderer {
    timeline: Timeline,
    images: Vec<Arc<DecodedImage>>,
    transitions: Vec<Option<TransitionKind>>,
    opts: RenderOpts,
    surface: Surface,
}

impl FrameRenderer {
    /// `transitions[i]` is the transition *into* slide `i`; entry 0 is ignored.
    pub fn new(
        timeline: Timeline,
        images: Vec<Arc<DecodedImage>>,
        transitions: Vec<Option<TransitionKind>>,
        canvas: Canvas,
        opts: RenderOpts,
    ) -> ReelResult<Self> {
        let slides = timeline.slide_count();
        if images.len() != slides {
            return Err(ReelError::validation(format!(
                "renderer got {} image(s) for {slides} slide(s)",
                images.len()
            )));
        }
        if transitions.len() != slides {
            return Err(ReelError::validation(format!(
                "renderer got {} transition tag(s) for {slides} slide(s)",
                transitions.len()
            )));
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::validation("canvas width/height must be > 0"));
        }
        if !opts.ken_burns_zoom.is_finite() || opts.ken_burns_zoom < 0.0 {
            return Err(ReelError::validation(
                "ken burns zoom must be a non-negative finite number",
            ));
        }
        Ok(Self {
            timeline,
            images,
            transitions,
            opts,
            surface: Surface::new(canvas),
        })
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    pub fn state_at(&self, time_ms: f64) -> FrameState {
        let (entry, progress) = self.timeline.sample_ms(time_ms);
        match entry.kind {
            EntryKind::Slide { index } => FrameState::Slide { index, progress },
            EntryKind::Transition { from, to } => FrameState::Transition { from, to, progress },
        }
    }

    /// Compose the frame shown at `time_ms` of virtual time.
    pub fn render_at(&mut self, time_ms: f64) -> &Surface {
        let state = self.state_at(time_ms);
        self.draw_state(state)
    }

    /// Compose frame `frame` at [`Timeline::frame_sample_ms`].
    pub fn render_frame(&mut self, frame: FrameIndex) -> &Surface {
        let ms = self.timeline.frame_sample_ms(frame);
        self.render_at(ms)
    }

    pub fn draw_state(&mut self, state: FrameState) -> &Surface {
        self.surface
            .clear(Rgba8Premul::opaque(self.opts.background_rgba));
        match state {
            FrameState::Slide { index, progress } => {
                let scale = 1.0 + self.opts.ken_burns_zoom * progress;
                draw_cover(
                    &mut self.surface,
                    &self.images[index],
                    scale,
                    Vec2::ZERO,
                    1.0,
                );
            }
            FrameState::Transition { from, to, progress } => {
                let ctx = TransitionCtx {
                    settled_scale: 1.0 + self.opts.ken_burns_zoom,
                };
                lookup(self.transitions[to]).render(
                    &ctx,
                    progress,
                    &self.images[from],
                    &self.images[to],
                    &mut self.surface,
                );
            }
        }
        &self.surface
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
