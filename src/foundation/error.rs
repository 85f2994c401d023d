/// Result alias used across slidereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Every failure slidereel reports to its caller.
///
/// Failures scoped to a single slide's image supply never surface here; they are recorded on
/// the slide as [`crate::SlideImage::Failed`].
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Rejected input (empty script, zero fps, duration too short, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The scene generator failed or produced nothing usable.
    #[error("scene generation error: {0}")]
    SceneGeneration(String),

    /// An image could not be fetched or decoded, after all retries.
    #[error("image error: failed to load '{source_ref}' after {attempts} attempt(s): {message}")]
    Image {
        /// Display form of the image source.
        source_ref: String,
        /// Attempts made before giving up.
        attempts: u32,
        /// Last underlying failure.
        message: String,
    },

    /// Export preconditions are not met (some slide has no resolved image).
    #[error("export blocked: {0}")]
    ExportBlocked(String),

    /// None of the preferred container/codec pairs can be encoded on this host.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Encoder or sink failure while recording.
    #[error("encode error: {0}")]
    Encode(String),

    /// Another export already owns the renderer.
    #[error("an export is already in progress")]
    Busy,

    /// The export was cancelled through its [`crate::CancelToken`].
    #[error("export cancelled")]
    Cancelled,

    /// Project or config (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn scene_generation(msg: impl Into<String>) -> Self {
        Self::SceneGeneration(msg.into())
    }

    pub fn export_blocked(msg: impl Into<String>) -> Self {
        Self::ExportBlocked(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    pub fn image(source_ref: impl Into<String>, attempts: u32, message: impl Into<String>) -> Self {
        Self::Image {
            source_ref: source_ref.into(),
            attempts,
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
