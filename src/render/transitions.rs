//! Slide transitions.
//!
//! Each transition draws the outgoing slide (frozen at its settled Ken Burns scale) and the
//! incoming slide (at its unzoomed start) for a progress in `[0, 1]`. At progress 0 the output
//! matches the outgoing slide's last frame. Every transition except [`Cut`] ends on the
//! incoming slide's first frame.

use crate::assets::decode::DecodedImage;
use crate::foundation::core::Vec2;
use crate::render::fit::cover_rect;
use crate::render::surface::Surface;
use crate::scene::slide::TransitionKind;

/// Scale the incoming slide starts from in [`ZoomIn`].
const ZOOM_IN_START_SCALE: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionCtx {
    /// Scale the outgoing slide reached at the end of its Ken Burns motion.
    pub settled_scale: f64,
}

impl Default for TransitionCtx {
    fn default() -> Self {
        Self { settled_scale: 1.1 }
    }
}

pub trait Transition: Send + Sync {
    fn name(&self) -> &'static str;

    fn render(
        &self,
        ctx: &TransitionCtx,
        progress: f64,
        outgoing: &DecodedImage,
        incoming: &DecodedImage,
        surface: &mut Surface,
    );
}

/// Draw `image` cover-fitted on `surface`.
pub fn draw_cover(
    surface: &mut Surface,
    image: &DecodedImage,
    scale: f64,
    offset: Vec2,
    opacity: f64,
) {
    let dest = cover_rect(image.width, image.height, surface.canvas(), scale, offset);
    surface.draw_image(image, dest, opacity as f32);
}

/// Cross-fade: outgoing fades out while incoming fades in.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fade;

impl Transition for Fade {
    fn name(&self) -> &'static str {
        "fade"
    }

    fn render(
        &self,
        ctx: &TransitionCtx,
        progress: f64,
        outgoing: &DecodedImage,
        incoming: &DecodedImage,
        surface: &mut Surface,
    ) {
        draw_cover(surface, outgoing, ctx.settled_scale, Vec2::ZERO, 1.0 - progress);
        draw_cover(surface, incoming, 1.0, Vec2::ZERO, progress);
    }
}

/// Push: both slides move left by one canvas width over the transition.
#[derive(Clone, Copy, Debug, Default)]
pub struct SlideLeft;

impl Transition for SlideLeft {
    fn name(&self) -> &'static str {
        "slide-left"
    }

    fn render(
        &self,
        ctx: &TransitionCtx,
        progress: f64,
        outgoing: &DecodedImage,
        incoming: &DecodedImage,
        surface: &mut Surface,
    ) {
        let w = f64::from(surface.canvas().width);
        let shift = progress * w;
        draw_cover(
            surface,
            outgoing,
            ctx.settled_scale,
            Vec2::new(-shift, 0.0),
            1.0,
        );
        draw_cover(surface, incoming, 1.0, Vec2::new(w - shift, 0.0), 1.0);
    }
}

/// Incoming slide grows from half size while fading in over the outgoing slide.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoomIn;

impl Transition for ZoomIn {
    fn name(&self) -> &'static str {
        "zoom-in"
    }

    fn render(
        &self,
        ctx: &TransitionCtx,
        progress: f64,
        outgoing: &DecodedImage,
        incoming: &DecodedImage,
        surface: &mut Surface,
    ) {
        draw_cover(surface, outgoing, ctx.settled_scale, Vec2::ZERO, 1.0);
        let scale = ZOOM_IN_START_SCALE + (1.0 - ZOOM_IN_START_SCALE) * progress;
        draw_cover(surface, incoming, scale, Vec2::ZERO, progress);
    }
}

/// No visual transition: the outgoing slide holds until the incoming slide starts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cut;

impl Transition for Cut {
    fn name(&self) -> &'static str {
        "none"
    }

    fn render(
        &self,
        ctx: &TransitionCtx,
        _progress: f64,
        outgoing: &DecodedImage,
        _incoming: &DecodedImage,
        surface: &mut Surface,
    ) {
        draw_cover(surface, outgoing, ctx.settled_scale, Vec2::ZERO, 1.0);
    }
}

static REGISTRY: [(TransitionKind, &dyn Transition); 3] = [
    (TransitionKind::Fade, &Fade),
    (TransitionKind::SlideLeft, &SlideLeft),
    (TransitionKind::ZoomIn, &ZoomIn),
];

/// Transition implementation for a slide's tag. Missing or unknown tags cut.
pub fn lookup(kind: Option<TransitionKind>) -> &'static dyn Transition {
    kind.and_then(|k| REGISTRY.iter().find(|(tag, _)| *tag == k))
        .map(|(_, t)| *t)
        .unwrap_or(&Cut)
}

#[cfg(test)]
#[path = "../../tests/unit/render/transitions.rs"]
mod tests;
