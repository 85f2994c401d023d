use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::scene_generation("x")
            .to_string()
            .contains("scene generation error:")
    );
    assert!(
        ReelError::export_blocked("x")
            .to_string()
            .contains("export blocked:")
    );
    assert!(
        ReelError::unsupported_format("x")
            .to_string()
            .contains("unsupported format:")
    );
    assert!(ReelError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn image_error_names_source_and_attempts() {
    let msg = ReelError::image("https://img.test/a.png", 3, "HTTP 503").to_string();
    assert!(msg.contains("https://img.test/a.png"));
    assert!(msg.contains("3 attempt(s)"));
    assert!(msg.contains("HTTP 503"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
