use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;

use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelError, ReelResult};

/// Stable identity of a slide within a deck.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct SlideId(pub u64);

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visual transition used when a slide enters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    Fade,
    SlideLeft,
    ZoomIn,
}

impl TransitionKind {
    pub const ALL: [TransitionKind; 3] = [
        TransitionKind::Fade,
        TransitionKind::SlideLeft,
        TransitionKind::ZoomIn,
    ];

    /// Parse a transition tag. Unknown tags yield `None` rather than an error; the renderer
    /// falls back to showing the outgoing slide.
    pub fn parse_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fade" | "crossfade" => Some(Self::Fade),
            "slide-left" | "slide_left" | "slideleft" => Some(Self::SlideLeft),
            "zoom-in" | "zoom_in" | "zoomin" => Some(Self::ZoomIn),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::SlideLeft => "slide-left",
            Self::ZoomIn => "zoom-in",
        }
    }
}

impl serde::Serialize for TransitionKind {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_tag())
    }
}

/// Lenient transition deserializer: missing, null and unrecognized tags all map to `None`.
pub(crate) fn deserialize_transition<'de, D>(d: D) -> Result<Option<TransitionKind>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = serde::Deserialize::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(TransitionKind::parse_tag))
}

/// Output aspect ratio. Only landscape and portrait HD are offered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    pub fn canvas(self) -> Canvas {
        match self {
            AspectRatio::Landscape => Canvas {
                width: 1280,
                height: 720,
            },
            AspectRatio::Portrait => Canvas {
                width: 720,
                height: 1280,
            },
        }
    }

    pub fn parse(s: &str) -> ReelResult<Self> {
        match s.trim() {
            "16:9" => Ok(Self::Landscape),
            "9:16" => Ok(Self::Portrait),
            other => Err(ReelError::validation(format!(
                "unsupported aspect ratio '{other}' (expected 16:9 or 9:16)"
            ))),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Landscape => f.write_str("16:9"),
            AspectRatio::Portrait => f.write_str("9:16"),
        }
    }
}

/// Where a slide's image comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageRef {
    /// Remote `http(s)` URL.
    Url(String),
    /// Local file.
    Path(PathBuf),
    /// Encoded image bytes supplied inline (e.g. a `data:` URI).
    Inline(Arc<[u8]>),
}

impl ImageRef {
    /// Interpret a project/CLI string. Relative paths resolve against `base_dir`.
    pub fn parse(raw: &str, base_dir: &Path) -> ReelResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ReelError::validation("image reference must be non-empty"));
        }
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::Url(raw.to_owned()));
        }
        if lower.starts_with("data:") {
            return Self::from_data_uri(raw);
        }
        let p = Path::new(raw);
        if p.is_absolute() {
            Ok(Self::Path(p.to_path_buf()))
        } else {
            Ok(Self::Path(base_dir.join(p)))
        }
    }

    fn from_data_uri(raw: &str) -> ReelResult<Self> {
        let (meta, payload) = raw
            .split_once(',')
            .ok_or_else(|| ReelError::validation("data URI is missing its ',' separator"))?;
        if !meta.to_ascii_lowercase().ends_with(";base64") {
            return Err(ReelError::validation(
                "only base64-encoded data URIs are supported",
            ));
        }
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ReelError::validation(format!("invalid base64 in data URI: {e}")))?;
        Ok(Self::Inline(bytes.into()))
    }

    /// String form written back into project files.
    pub fn to_project_string(&self) -> String {
        match self {
            ImageRef::Url(u) => u.clone(),
            ImageRef::Path(p) => p.display().to_string(),
            ImageRef::Inline(bytes) => format!(
                "data:application/octet-stream;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(bytes)
            ),
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageRef::Url(u) => f.write_str(u),
            ImageRef::Path(p) => write!(f, "{}", p.display()),
            ImageRef::Inline(bytes) => write!(f, "inline image ({} bytes)", bytes.len()),
        }
    }
}

/// Image lifecycle of one slide.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlideImage {
    /// Supplier has not answered yet.
    Pending,
    /// Image reference is known; the bytes are fetched at export time.
    Ready(ImageRef),
    /// Supplier failed for this slide only.
    Failed { reason: String },
}

impl SlideImage {
    pub fn is_ready(&self) -> bool {
        matches!(self, SlideImage::Ready(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slide {
    pub id: SlideId,
    /// Caption / narration text of the scene.
    pub text: String,
    /// Transition used when this slide enters. `None` cuts to the slide after the
    /// transition interval.
    pub transition: Option<TransitionKind>,
    pub image: SlideImage,
    /// Transient status shown next to a pending slide.
    pub status_text: Option<String>,
}

impl Slide {
    pub fn pending(id: SlideId, text: impl Into<String>, transition: Option<TransitionKind>) -> Self {
        Self {
            id,
            text: text.into(),
            transition,
            image: SlideImage::Pending,
            status_text: None,
        }
    }

    pub fn ready(
        id: SlideId,
        text: impl Into<String>,
        transition: Option<TransitionKind>,
        image: ImageRef,
    ) -> Self {
        Self {
            image: SlideImage::Ready(image),
            ..Self::pending(id, text, transition)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/slide.rs"]
mod tests;
