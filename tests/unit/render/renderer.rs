use super::*;
use crate::foundation::core::Fps;

const CANVAS: Canvas = Canvas {
    width: 64,
    height: 36,
};
const MAGENTA: [u8; 4] = [255, 0, 255, 255];

fn gradient(w: u32, h: u32, seed: u8) -> Arc<DecodedImage> {
    let mut rgba = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            rgba.extend_from_slice(&[(x * 7) as u8, (y * 11) as u8 ^ seed, seed, 255]);
        }
    }
    Arc::new(DecodedImage::from_straight_rgba8(w, h, rgba).unwrap())
}

fn timeline() -> Timeline {
    Timeline::build(3, 10.0, 1.0, Fps::whole(30).unwrap()).unwrap()
}

fn renderer(transitions: Vec<Option<TransitionKind>>) -> FrameRenderer {
    let images = vec![gradient(40, 30, 1), gradient(30, 60, 2), gradient(90, 20, 3)];
    FrameRenderer::new(
        timeline(),
        images,
        transitions,
        CANVAS,
        RenderOpts {
            background_rgba: MAGENTA,
            ..RenderOpts::default()
        },
    )
    .unwrap()
}

fn fades() -> Vec<Option<TransitionKind>> {
    vec![None, Some(TransitionKind::Fade), Some(TransitionKind::Fade)]
}

#[test]
fn rejects_mismatched_inputs() {
    let err = FrameRenderer::new(
        timeline(),
        vec![gradient(2, 2, 0)],
        vec![None],
        CANVAS,
        RenderOpts::default(),
    )
    .err()
    .unwrap();
    assert!(err.to_string().contains("1 image(s) for 3 slide(s)"));

    let err = FrameRenderer::new(
        timeline(),
        vec![gradient(2, 2, 0), gradient(2, 2, 0), gradient(2, 2, 0)],
        vec![None],
        CANVAS,
        RenderOpts::default(),
    )
    .err()
    .unwrap();
    assert!(err.to_string().contains("transition tag"));
}

#[test]
fn state_follows_timeline() {
    let r = renderer(fades());
    let fps = r.timeline().fps;
    assert_eq!(r.state_at(0.0), FrameState::Slide { index: 0, progress: 0.0 });
    assert_eq!(
        r.state_at(fps.frame_time_ms(80)),
        FrameState::Transition { from: 0, to: 1, progress: 0.0 }
    );
    match r.state_at(fps.frame_time_ms(95)) {
        FrameState::Transition { from: 0, to: 1, progress } => assert!((progress - 0.5).abs() < 1e-9),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        r.state_at(r.timeline().end_ms()),
        FrameState::Slide { index: 2, progress: 1.0 }
    );
}

#[test]
fn cover_fit_never_shows_background() {
    let mut r = renderer(vec![
        None,
        Some(TransitionKind::Fade),
        Some(TransitionKind::SlideLeft),
    ]);
    for frame in (0..300).step_by(7) {
        let surface = r.render_frame(FrameIndex(frame));
        assert!(
            surface.data().chunks_exact(4).all(|p| p != MAGENTA),
            "background visible at frame {frame}"
        );
    }
}

#[test]
fn fade_endpoints_match_neighbouring_slides() {
    let mut r = renderer(fades());
    let settled = r
        .draw_state(FrameState::Slide { index: 0, progress: 1.0 })
        .data()
        .to_vec();
    let start = r.render_frame(FrameIndex(80)).data().to_vec();
    assert_eq!(start, settled);

    let fresh = r
        .draw_state(FrameState::Slide { index: 1, progress: 0.0 })
        .data()
        .to_vec();
    let end = r
        .draw_state(FrameState::Transition { from: 0, to: 1, progress: 1.0 })
        .data()
        .to_vec();
    assert_eq!(end, fresh);
    assert_eq!(r.render_frame(FrameIndex(110)).data(), &fresh[..]);
}

#[test]
fn ken_burns_changes_the_slide_over_time() {
    let mut r = renderer(fades());
    let first = r.render_frame(FrameIndex(0)).data().to_vec();
    let last = r.render_frame(FrameIndex(79)).data().to_vec();
    assert_ne!(first, last);
}

#[test]
fn missing_transition_holds_outgoing_slide() {
    let mut r = renderer(vec![None, None, None]);
    let settled = r
        .draw_state(FrameState::Slide { index: 0, progress: 1.0 })
        .data()
        .to_vec();
    for frame in [80, 95, 109] {
        assert_eq!(r.render_frame(FrameIndex(frame)).data(), &settled[..]);
    }
}
