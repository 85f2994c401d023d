use super::*;
use std::path::PathBuf;

fn deck3() -> SlideDeck {
    SlideDeck::new(vec![
        Slide::pending(SlideId(1), "one", Some(TransitionKind::Fade)),
        Slide::pending(SlideId(2), "two", Some(TransitionKind::SlideLeft)),
        Slide::pending(SlideId(3), "three", None),
    ])
}

fn img(name: &str) -> ImageRef {
    ImageRef::Path(PathBuf::from(name))
}

#[test]
fn with_image_replaces_only_target_slide() {
    let before = deck3();
    let after = before
        .with_image(SlideId(2), SlideImage::Ready(img("b.png")))
        .unwrap();

    assert_eq!(before.get(SlideId(2)).unwrap().image, SlideImage::Pending);
    assert_eq!(
        after.get(SlideId(2)).unwrap().image,
        SlideImage::Ready(img("b.png"))
    );
    assert_eq!(after.slides()[0], before.slides()[0]);
    assert_eq!(after.slides()[2], before.slides()[2]);
}

#[test]
fn with_slide_rejects_unknown_id_and_id_changes() {
    let d = deck3();
    assert!(d.with_image(SlideId(9), SlideImage::Pending).is_err());
    assert!(
        d.with_slide(SlideId(1), |s| Slide {
            id: SlideId(5),
            ..s.clone()
        })
        .is_err()
    );
}

#[test]
fn ready_sources_reports_first_blocking_slide() {
    let d = deck3()
        .with_image(SlideId(1), SlideImage::Ready(img("a.png")))
        .unwrap()
        .with_image(
            SlideId(2),
            SlideImage::Failed {
                reason: "HTTP 500".to_owned(),
            },
        )
        .unwrap();

    let err = d.ready_sources().unwrap_err().to_string();
    assert!(err.contains("export blocked"));
    assert!(err.contains("slide 2"));
    assert!(err.contains("HTTP 500"));
    assert!(!d.is_exportable());
}

#[test]
fn pending_slide_blocks_export() {
    let d = deck3();
    let err = d.ready_sources().unwrap_err().to_string();
    assert!(err.contains("slide 1"));
    assert!(err.contains("waiting"));
}

#[test]
fn empty_deck_is_not_exportable() {
    let d = SlideDeck::default();
    assert!(d.ready_sources().is_err());
    assert!(!d.is_exportable());
}

#[test]
fn fully_ready_deck_yields_sources_in_order() {
    let mut d = deck3();
    for (id, name) in [(1, "a.png"), (2, "b.png"), (3, "c.png")] {
        d = d
            .with_image(SlideId(id), SlideImage::Ready(img(name)))
            .unwrap();
    }
    assert!(d.is_exportable());
    assert_eq!(
        d.ready_sources().unwrap(),
        vec![img("a.png"), img("b.png"), img("c.png")]
    );
    assert_eq!(
        d.transitions(),
        vec![
            Some(TransitionKind::Fade),
            Some(TransitionKind::SlideLeft),
            None
        ]
    );
}
