use crate::foundation::core::{Canvas, Rect, Vec2};

/// Destination rectangle for drawing a `src_w x src_h` image with *cover* semantics.
///
/// The image is scaled uniformly so that it fills the whole canvas (cropping whichever axis
/// overflows), then multiplied by `scale` about the canvas center and shifted by `offset`.
/// With `scale >= 1` and zero offset the rectangle always contains the canvas.
pub fn cover_rect(src_w: u32, src_h: u32, canvas: Canvas, scale: f64, offset: Vec2) -> Rect {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let sw = f64::from(src_w.max(1));
    let sh = f64::from(src_h.max(1));

    let ratio = (cw / sw).max(ch / sh) * scale;
    let w = sw * ratio;
    let h = sh * ratio;
    let x0 = (cw - w) / 2.0 + offset.x;
    let y0 = (ch - h) / 2.0 + offset.y;
    Rect::new(x0, y0, x0 + w, y0 + h)
}

#[cfg(test)]
#[path = "../../tests/unit/render/fit.rs"]
mod tests;
