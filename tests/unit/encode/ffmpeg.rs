use super::*;
use crate::encode::format::{PREFERRED_FORMATS, VideoCodec};
use crate::foundation::core::Fps;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_size_mismatch() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0, 0, 0, 255]).is_err());
}

#[test]
fn final_path_uses_product_name_and_container_extension() {
    let opts = FfmpegSinkOpts::new("target/out", "slidereel");
    assert_eq!(
        opts.final_path(PREFERRED_FORMATS[0]),
        PathBuf::from("target/out/slidereel.mp4")
    );
    assert_eq!(
        opts.final_path(VideoFormat::new(Container::Webm, VideoCodec::Vp8)),
        PathBuf::from("target/out/slidereel.webm")
    );
    assert_ne!(
        opts.staging_path(PREFERRED_FORMATS[0]),
        opts.final_path(PREFERRED_FORMATS[0])
    );
}

#[test]
fn begin_rejects_odd_dimensions_without_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit", "odd"));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::whole(30).unwrap(),
            format: PREFERRED_FORMATS[0],
            bitrate_bps: 3_000_000,
        })
        .unwrap_err();
    assert!(err.to_string().contains("even"));
    assert!(sink.output_path().is_none());
}

#[test]
fn end_before_begin_is_an_error_and_abort_is_harmless() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("target/ffmpeg_unit", "idle"));
    sink.abort();
    assert!(sink.end().is_err());
}
