use std::collections::BTreeSet;
use std::fmt;
use std::process::{Command, Stdio};

use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Mp4,
    Webm,
}

impl Container {
    /// File extension, also the ffmpeg muxer name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    Vp9,
    Vp8,
}

impl VideoCodec {
    /// Name of the ffmpeg encoder that produces this codec.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Vp9 => "libvpx-vp9",
            Self::Vp8 => "libvpx",
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::H264 => "h264",
            Self::Vp9 => "vp9",
            Self::Vp8 => "vp8",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct VideoFormat {
    pub container: Container,
    pub codec: VideoCodec,
}

impl VideoFormat {
    pub const fn new(container: Container, codec: VideoCodec) -> Self {
        Self { container, codec }
    }

    pub fn extension(self) -> &'static str {
        self.container.extension()
    }

    /// MIME type with codec parameter, e.g. `video/webm;codecs=vp9`.
    pub fn mime(self) -> String {
        format!(
            "video/{};codecs={}",
            self.container.extension(),
            self.codec.tag()
        )
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container.extension(), self.codec.tag())
    }
}

/// Output formats in order of preference.
pub const PREFERRED_FORMATS: [VideoFormat; 3] = [
    VideoFormat::new(Container::Mp4, VideoCodec::H264),
    VideoFormat::new(Container::Webm, VideoCodec::Vp9),
    VideoFormat::new(Container::Webm, VideoCodec::Vp8),
];

/// Answers whether the host can encode a given format.
pub trait EncoderProbe: Send + Sync {
    fn supports(&self, format: VideoFormat) -> bool;
}

/// First entry of [`PREFERRED_FORMATS`] the probe supports.
pub fn select_format(probe: &dyn EncoderProbe) -> ReelResult<VideoFormat> {
    PREFERRED_FORMATS
        .iter()
        .copied()
        .find(|f| probe.supports(*f))
        .ok_or_else(|| {
            let tried = PREFERRED_FORMATS
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            ReelError::unsupported_format(format!(
                "no supported video encoder available (tried {tried})"
            ))
        })
}

/// Probe backed by the video encoders the system `ffmpeg` reports.
#[derive(Clone, Debug, Default)]
pub struct FfmpegProbe {
    encoders: BTreeSet<String>,
}

impl FfmpegProbe {
    /// Run `ffmpeg -encoders`. A missing `ffmpeg` yields a probe that supports nothing.
    pub fn detect() -> Self {
        let output = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => {
                let probe = Self::from_listing(&String::from_utf8_lossy(&out.stdout));
                tracing::debug!(encoders = probe.encoders.len(), "probed ffmpeg encoders");
                probe
            }
            Ok(out) => {
                tracing::warn!(status = %out.status, "ffmpeg -encoders failed");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ffmpeg not available");
                Self::default()
            }
        }
    }

    /// Parse the table printed by `ffmpeg -encoders`, keeping video encoders only.
    pub fn from_listing(listing: &str) -> Self {
        let mut encoders = BTreeSet::new();
        let mut in_table = false;
        for line in listing.lines() {
            let line = line.trim();
            if !in_table {
                in_table = line.starts_with("------");
                continue;
            }
            let mut cols = line.split_whitespace();
            let (Some(flags), Some(name)) = (cols.next(), cols.next()) else {
                continue;
            };
            if flags.starts_with('V') {
                encoders.insert(name.to_string());
            }
        }
        Self { encoders }
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }
}

impl EncoderProbe for FfmpegProbe {
    fn supports(&self, format: VideoFormat) -> bool {
        self.has_encoder(format.codec.ffmpeg_encoder())
    }
}

/// Probe with a fixed answer set.
#[derive(Clone, Debug, Default)]
pub struct FixedProbe(pub Vec<VideoFormat>);

impl EncoderProbe for FixedProbe {
    fn supports(&self, format: VideoFormat) -> bool {
        self.0.contains(&format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
