/// Frozen slide collections with copy-on-write updates.
pub mod deck;
/// On-disk project file (JSON).
pub mod project;
/// Slides, their image lifecycle and transition tags.
pub mod slide;
