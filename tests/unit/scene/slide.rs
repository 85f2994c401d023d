use super::*;

#[test]
fn transition_tags_parse_leniently() {
    assert_eq!(TransitionKind::parse_tag("fade"), Some(TransitionKind::Fade));
    assert_eq!(
        TransitionKind::parse_tag(" Slide-Left "),
        Some(TransitionKind::SlideLeft)
    );
    assert_eq!(
        TransitionKind::parse_tag("zoom_in"),
        Some(TransitionKind::ZoomIn)
    );
    assert_eq!(TransitionKind::parse_tag("spiral"), None);
    assert_eq!(TransitionKind::parse_tag(""), None);
}

#[test]
fn transition_tags_round_trip_through_as_tag() {
    for kind in TransitionKind::ALL {
        assert_eq!(TransitionKind::parse_tag(kind.as_tag()), Some(kind));
    }
}

#[test]
fn unknown_transition_deserializes_to_none() {
    #[derive(serde::Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_transition")]
        transition: Option<TransitionKind>,
    }

    let p: Probe = serde_json::from_str(r#"{ "transition": "wobble" }"#).unwrap();
    assert_eq!(p.transition, None);
    let p: Probe = serde_json::from_str(r#"{ "transition": 7 }"#).unwrap();
    assert_eq!(p.transition, None);
    let p: Probe = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(p.transition, None);
    let p: Probe = serde_json::from_str(r#"{ "transition": "zoom-in" }"#).unwrap();
    assert_eq!(p.transition, Some(TransitionKind::ZoomIn));
}

#[test]
fn aspect_ratio_canvas_sizes() {
    assert_eq!(
        AspectRatio::Landscape.canvas(),
        Canvas {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(
        AspectRatio::Portrait.canvas(),
        Canvas {
            width: 720,
            height: 1280
        }
    );
    assert!(AspectRatio::parse("4:3").is_err());
    assert_eq!(AspectRatio::parse("9:16").unwrap(), AspectRatio::Portrait);
}

#[test]
fn image_ref_parsing() {
    let base = Path::new("/projects/demo");
    assert_eq!(
        ImageRef::parse("https://picsum.photos/1280/720", base).unwrap(),
        ImageRef::Url("https://picsum.photos/1280/720".to_owned())
    );
    assert_eq!(
        ImageRef::parse("img/a.png", base).unwrap(),
        ImageRef::Path(PathBuf::from("/projects/demo/img/a.png"))
    );
    assert_eq!(
        ImageRef::parse("data:image/png;base64,AQID", base).unwrap(),
        ImageRef::Inline(vec![1u8, 2, 3].into())
    );
    assert!(ImageRef::parse("data:image/png,rawbytes", base).is_err());
    assert!(ImageRef::parse("   ", base).is_err());
}

#[test]
fn inline_image_display_hides_payload() {
    let r = ImageRef::Inline(vec![0u8; 12].into());
    assert_eq!(r.to_string(), "inline image (12 bytes)");
}
