use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::deck::SlideDeck;
use crate::scene::slide::{
    AspectRatio, ImageRef, Slide, SlideId, SlideImage, TransitionKind, deserialize_transition,
};

/// One slide as stored in a project file.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectSlide {
    #[serde(default)]
    pub text: String,
    /// URL, `data:` URI or path relative to the project file. Absent while pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Error recorded by the image supplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_transition",
        skip_serializing_if = "Option::is_none"
    )]
    pub transition: Option<TransitionKind>,
}

/// Serialized slideshow: what `generate` writes and `render` reads.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    pub total_duration_secs: f64,
    pub slides: Vec<ProjectSlide>,
}

impl Project {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s).map_err(|e| ReelError::serde(format!("invalid project JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read project '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> ReelResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("serialize project: {e}")))?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create project directory '{}'", parent.display()))?;
        }
        std::fs::write(path, json).with_context(|| format!("write project '{}'", path.display()))?;
        Ok(())
    }

    /// Build the in-memory deck. Slide ids follow file order starting at 1.
    pub fn to_deck(&self, base_dir: &Path) -> ReelResult<SlideDeck> {
        let slides = self
            .slides
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let image = match (&s.image, &s.error) {
                    (Some(raw), _) => SlideImage::Ready(ImageRef::parse(raw, base_dir)?),
                    (None, Some(reason)) => SlideImage::Failed {
                        reason: reason.clone(),
                    },
                    (None, None) => SlideImage::Pending,
                };
                Ok(Slide {
                    id: SlideId(i as u64 + 1),
                    text: s.text.clone(),
                    transition: s.transition,
                    image,
                    status_text: None,
                })
            })
            .collect::<ReelResult<Vec<_>>>()?;
        Ok(SlideDeck::new(slides))
    }

    pub fn from_deck(deck: &SlideDeck, aspect_ratio: AspectRatio, total_duration_secs: f64) -> Self {
        let slides = deck
            .slides()
            .iter()
            .map(|s| {
                let (image, error) = match &s.image {
                    SlideImage::Ready(r) => (Some(r.to_project_string()), None),
                    SlideImage::Failed { reason } => (None, Some(reason.clone())),
                    SlideImage::Pending => (None, None),
                };
                ProjectSlide {
                    text: s.text.clone(),
                    image,
                    error,
                    transition: s.transition,
                }
            })
            .collect();
        Self {
            aspect_ratio,
            total_duration_secs,
            slides,
        }
    }
}

/// Directory relative image paths in a project resolve against.
pub fn project_base_dir(project_path: &Path) -> PathBuf {
    project_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/project.rs"]
mod tests;
