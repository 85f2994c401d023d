use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(6)).unwrap();
    assert_eq!(r.len_frames(), 4);
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(5)));
    assert!(!r.contains(FrameIndex(6)));
}

#[test]
fn empty_range_contains_nothing() {
    let r = FrameRange::new(FrameIndex(3), FrameIndex(3)).unwrap();
    assert!(r.is_empty());
    assert!(!r.contains(FrameIndex(3)));
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn frame_time_is_derived_from_counter() {
    let fps = Fps::whole(60).unwrap();
    // 1000/60 is not representable; summing it 600 times drifts, the counter form does not.
    assert_eq!(fps.frame_time_ms(600), 10_000.0);
    assert_eq!(fps.frame_time_ms(0), 0.0);
    assert!((fps.frame_duration_ms() - 16.666_666).abs() < 1e-3);
}

#[test]
fn ntsc_rates_round_to_nearest_frame() {
    let fps = Fps::new(30_000, 1001).unwrap();
    assert_eq!(fps.secs_to_frames_round(10.0), 300);
    assert!((fps.ms_to_frame_pos(fps.frame_time_ms(42)) - 42.0).abs() < 1e-9);
}

#[test]
fn opaque_background_forces_alpha() {
    assert_eq!(
        Rgba8Premul::opaque([10, 20, 30, 0]).to_array(),
        [10, 20, 30, 255]
    );
}

#[test]
fn canvas_byte_len_is_rgba8() {
    assert_eq!(Canvas { width: 1280, height: 720 }.byte_len(), 1280 * 720 * 4);
    assert_eq!(Canvas { width: 0, height: 720 }.byte_len(), 0);
}
