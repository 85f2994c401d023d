//! Runtime settings loaded from JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::export::{ExportOpts, YieldPolicy};
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::retry::RetryPolicy;
use crate::render::renderer::RenderOpts;
use crate::studio::DEFAULT_IMAGE_TEMPLATE;

/// Every tunable of a slidereel run. Missing fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReelConfig {
    pub fps: u32,
    pub transition_secs: f64,
    pub yield_policy: YieldPolicy,
    pub retry: RetryPolicy,
    /// Straight RGBA; alpha is ignored, frames are always opaque.
    pub background_rgba: [u8; 4],
    pub product_name: String,
    pub ken_burns_zoom: f64,
    pub bitrate_bps: u32,
    pub http_timeout_secs: u64,
    pub channel_capacity: usize,
    pub image_template: String,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            transition_secs: 1.0,
            yield_policy: YieldPolicy::default(),
            retry: RetryPolicy::default(),
            background_rgba: [0, 0, 0, 255],
            product_name: "slidereel".to_owned(),
            ken_burns_zoom: 0.1,
            bitrate_bps: 3_000_000,
            http_timeout_secs: 30,
            channel_capacity: 4,
            image_template: DEFAULT_IMAGE_TEMPLATE.to_owned(),
        }
    }
}

impl ReelConfig {
    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ReelError::serde(format!("invalid config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> ReelResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&s)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.retry.max_attempts == 0 {
            return Err(ReelError::validation("retry.max_attempts must be >= 1"));
        }
        if self.http_timeout_secs == 0 {
            return Err(ReelError::validation("http_timeout_secs must be > 0"));
        }
        if !self.ken_burns_zoom.is_finite() || self.ken_burns_zoom < 0.0 {
            return Err(ReelError::validation(
                "ken_burns_zoom must be a non-negative number",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(ReelError::validation("channel_capacity must be >= 1"));
        }
        self.export_opts()?.validate()
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::whole(self.fps)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn render_opts(&self) -> RenderOpts {
        RenderOpts {
            background_rgba: self.background_rgba,
            ken_burns_zoom: self.ken_burns_zoom,
        }
    }

    pub fn export_opts(&self) -> ReelResult<ExportOpts> {
        Ok(ExportOpts {
            fps: self.fps()?,
            transition_secs: self.transition_secs,
            render: self.render_opts(),
            yield_policy: self.yield_policy,
            bitrate_bps: self.bitrate_bps,
            channel_capacity: self.channel_capacity,
            product_name: self.product_name.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
