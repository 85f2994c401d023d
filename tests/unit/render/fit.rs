use super::*;

const LANDSCAPE: Canvas = Canvas {
    width: 1280,
    height: 720,
};

#[test]
fn wide_image_is_cropped_horizontally() {
    let r = cover_rect(2000, 500, LANDSCAPE, 1.0, Vec2::ZERO);
    assert_eq!(r.height(), 720.0);
    assert_eq!(r.width(), 2880.0);
    assert_eq!(r.x0, (1280.0 - 2880.0) / 2.0);
    assert_eq!(r.y0, 0.0);
}

#[test]
fn tall_image_is_cropped_vertically() {
    let r = cover_rect(100, 400, LANDSCAPE, 1.0, Vec2::ZERO);
    assert_eq!(r.width(), 1280.0);
    assert_eq!(r.height(), 5120.0);
    assert_eq!(r.x0, 0.0);
}

#[test]
fn cover_never_letterboxes_at_or_above_unit_scale() {
    for (w, h) in [(1, 1), (640, 480), (1920, 1080), (300, 1200), (4000, 100)] {
        for scale in [1.0, 1.05, 1.1] {
            let r = cover_rect(w, h, LANDSCAPE, scale, Vec2::ZERO);
            assert!(r.x0 <= 1e-9 && r.y0 <= 1e-9, "{w}x{h}@{scale}: {r:?}");
            assert!(r.x1 >= 1280.0 - 1e-9 && r.y1 >= 720.0 - 1e-9, "{w}x{h}@{scale}: {r:?}");
        }
    }
}

#[test]
fn scale_is_about_the_center_and_offset_translates() {
    let base = cover_rect(1280, 720, LANDSCAPE, 1.0, Vec2::ZERO);
    let zoomed = cover_rect(1280, 720, LANDSCAPE, 1.1, Vec2::ZERO);
    let (a, b) = (base.center(), zoomed.center());
    assert!((a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9);
    assert!((zoomed.width() - 1408.0).abs() < 1e-9);

    let shifted = cover_rect(1280, 720, LANDSCAPE, 1.0, Vec2::new(-100.0, 0.0));
    assert_eq!(shifted.x0, -100.0);
    assert_eq!(shifted.y0, 0.0);
}

#[test]
fn half_scale_is_centered_inside_canvas() {
    let r = cover_rect(1280, 720, LANDSCAPE, 0.5, Vec2::ZERO);
    assert_eq!(r, Rect::new(320.0, 180.0, 960.0, 540.0));
}
