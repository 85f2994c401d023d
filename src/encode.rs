//! Frame sinks: where rendered frames go, and how the output format is chosen.

/// `ffmpeg` child-process sink.
pub mod ffmpeg;
/// Container/codec preference and encoder probing.
pub mod format;
/// The [`sink::FrameSink`] contract and an in-memory implementation.
pub mod sink;
