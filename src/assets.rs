//! Slide image acquisition: fetching, decoding and retrying.

/// Image decoding into premultiplied RGBA8.
pub mod decode;
/// Fetchers and the retrying image loader.
pub mod loader;
