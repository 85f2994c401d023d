//! slidereel turns a text script into a slideshow video.
//!
//! The pipeline is explicit and synchronous:
//!
//! - split a script into scenes and supply an image per scene ([`Studio`])
//! - lay the slides out on a frame-indexed [`Timeline`]
//! - render every frame on the CPU with Ken Burns motion and transitions ([`FrameRenderer`])
//! - stream the frames into a [`FrameSink`], usually the system `ffmpeg` ([`Exporter`])
#![forbid(unsafe_code)]

mod foundation;

/// Image fetching, decoding and retry.
pub mod assets;
/// Runtime configuration.
pub mod config;
/// Frame sinks and output format selection.
pub mod encode;
/// The export driver.
pub mod export;
/// CPU compositing.
pub mod render;
/// Slides, decks and project files.
pub mod scene;
/// Scene generation and image supply.
pub mod studio;
pub mod timeline;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange, Rect, Rgba8Premul, Vec2};
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::foundation::retry::{Backoff, Exhausted, RetryPolicy, retry_with_backoff};

pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::loader::{DefaultFetcher, HttpFetcher, ImageFetcher, ImageLoader};
pub use crate::config::ReelConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::format::{
    Container, EncoderProbe, FfmpegProbe, FixedProbe, PREFERRED_FORMATS, VideoCodec, VideoFormat,
    select_format,
};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::export::{
    CancelToken, ExportJob, ExportOpts, ExportProgress, ExportReport, Exporter, YieldPolicy,
};
pub use crate::render::FrameRGBA;
pub use crate::render::renderer::{FrameRenderer, FrameState, RenderOpts};
pub use crate::scene::deck::SlideDeck;
pub use crate::scene::project::Project;
pub use crate::scene::slide::{AspectRatio, ImageRef, Slide, SlideId, SlideImage, TransitionKind};
pub use crate::studio::{
    ImageSupplier, Scene, SceneGenerator, SentenceSceneGenerator, Studio, UrlTemplateSupplier,
};
pub use crate::timeline::{EntryKind, Timeline, TimelineEntry};
