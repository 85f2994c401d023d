//! CPU compositor: pixel surface, cover-fit placement, transitions and the frame renderer.

/// Premultiplied RGBA8 blending.
pub mod composite;
/// Cover-fit placement math.
pub mod fit;
/// Timeline-driven frame renderer.
pub mod renderer;
/// The drawing surface frames are composed on.
pub mod surface;
/// Closed set of slide transitions.
pub mod transitions;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha**. The renderer always clears to an opaque background,
/// so in practice every pixel has alpha 255.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Straight-alpha copy, for writing PNGs.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}
