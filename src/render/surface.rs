use rayon::prelude::*;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Canvas, Rect, Rgba8Premul};
use crate::foundation::math::opacity_to_u8;
use crate::render::FrameRGBA;
use crate::render::composite::over;

/// Premultiplied RGBA8 pixel buffer that frames are composed on.
///
/// Drawing samples the source image with nearest-neighbour inverse mapping at pixel centers,
/// so a pixel is painted only when its center lies inside the destination rectangle.
#[derive(Clone, Debug)]
pub struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            data: vec![0u8; canvas.byte_len()],
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn clear(&mut self, color: Rgba8Premul) {
        let px = color.to_array();
        for chunk in self.data.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let idx = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Draw `image` stretched into `dest` with the given opacity.
    ///
    /// Draws whose opacity quantizes to zero are skipped entirely.
    pub fn draw_image(&mut self, image: &DecodedImage, dest: Rect, opacity: f32) {
        let op = opacity_to_u8(opacity);
        if op == 0 || image.width == 0 || image.height == 0 {
            return;
        }
        let dw = dest.width();
        let dh = dest.height();
        if !(dw > 0.0 && dh > 0.0) {
            return;
        }

        let cw = self.canvas.width;
        let ch = self.canvas.height;
        let x_lo = dest.x0.max(0.0).floor() as u32;
        let x_hi = (dest.x1.min(f64::from(cw)).ceil().max(0.0) as u32).min(cw);
        let y_lo = dest.y0.max(0.0).floor() as u32;
        let y_hi = (dest.y1.min(f64::from(ch)).ceil().max(0.0) as u32).min(ch);
        if x_lo >= x_hi || y_lo >= y_hi {
            return;
        }

        let sx_scale = f64::from(image.width) / dw;
        let sy_scale = f64::from(image.height) / dh;
        let row_bytes = (cw as usize) * 4;

        self.data
            .par_chunks_exact_mut(row_bytes)
            .enumerate()
            .skip(y_lo as usize)
            .take((y_hi - y_lo) as usize)
            .for_each(|(y, row)| {
                let cy = y as f64 + 0.5;
                if cy < dest.y0 || cy >= dest.y1 {
                    return;
                }
                let sy = src_coord(cy - dest.y0, sy_scale, image.height);
                for x in x_lo..x_hi {
                    let cx = f64::from(x) + 0.5;
                    if cx < dest.x0 || cx >= dest.x1 {
                        continue;
                    }
                    let sx = src_coord(cx - dest.x0, sx_scale, image.width);
                    let i = (x as usize) * 4;
                    let dst = [row[i], row[i + 1], row[i + 2], row[i + 3]];
                    let out = over(dst, image.px(sx, sy), op);
                    row[i..i + 4].copy_from_slice(&out);
                }
            });
    }

    /// Copy the current contents out as a frame.
    pub fn to_frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }
}

fn src_coord(local: f64, scale: f64, extent: u32) -> u32 {
    ((local * scale).floor().max(0.0) as u32).min(extent - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
