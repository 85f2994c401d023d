use std::io::{Read, Write as _};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use anyhow::Context as _;

use crate::encode::format::{Container, VideoFormat};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::FrameRGBA;

/// Options for [`FfmpegSink`].
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Directory the finished video lands in.
    pub out_dir: PathBuf,
    /// File stem of the finished video (`<product_name>.<ext>`).
    pub product_name: String,
    /// Overwrite an existing output file.
    pub overwrite: bool,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
}

impl FfmpegSinkOpts {
    pub fn new(out_dir: impl Into<PathBuf>, product_name: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            product_name: product_name.into(),
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }

    /// Where the finished video for `format` is written.
    pub fn final_path(&self, format: VideoFormat) -> PathBuf {
        self.out_dir
            .join(format!("{}.{}", self.product_name, format.extension()))
    }

    fn staging_path(&self, format: VideoFormat) -> PathBuf {
        self.out_dir.join(format!(
            ".{}.partial.{}",
            self.product_name,
            format.extension()
        ))
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// ffmpeg writes to a hidden staging file in the output directory. `end` renames it to the
/// final name once the encoder exits cleanly; `abort` (and drop) kill the encoder and delete it.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    staging: Option<PathBuf>,
    finished: Option<PathBuf>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            staging: None,
            finished: None,
        }
    }

    /// Path of the finished video, once `end` succeeded.
    pub fn output_path(&self) -> Option<&Path> {
        self.finished.as_deref()
    }

    fn join_stderr(&mut self) -> ReelResult<Vec<u8>> {
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| ReelError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    fn teardown(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.join_stderr();
        if let Some(staging) = self.staging.take()
            && staging.exists()
            && let Err(e) = std::fs::remove_file(&staging)
        {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging file");
        }
        self.cfg = None;
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if cfg.width == 0 || cfg.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }
        if self.child.is_some() {
            return Err(ReelError::encode("ffmpeg sink already started"));
        }
        if !is_ffmpeg_on_path() {
            return Err(ReelError::encode(
                "ffmpeg is required for video encoding, but was not found on PATH",
            ));
        }

        ensure_dir(&self.opts.out_dir)?;
        let final_path = self.opts.final_path(cfg.format);
        if !self.opts.overwrite && final_path.exists() {
            return Err(ReelError::validation(format!(
                "output file '{}' already exists",
                final_path.display()
            )));
        }
        let staging = self.opts.staging_path(cfg.format);

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.args(["-y", "-loglevel", "error"]);

        // Input: raw RGBA8 frames, flattened to opaque in push_frame.
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
            "-i",
            "pipe:0",
        ]);
        cmd.args([
            "-an",
            "-c:v",
            cfg.format.codec.ffmpeg_encoder(),
            "-b:v",
            &cfg.bitrate_bps.to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);
        if cfg.format.container == Container::Mp4 {
            cmd.args(["-movflags", "+faststart"]);
        }
        cmd.args(["-f", cfg.format.container.extension()]);
        cmd.arg(&staging);

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child.stdin.take();
        let stderr = child.stderr.take();
        let (Some(stdin), Some(mut stderr)) = (stdin, stderr) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ReelError::encode("failed to open ffmpeg stdio (unexpected)"));
        };
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            format = %cfg.format,
            staging = %staging.display(),
            "ffmpeg encoder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.staging = Some(staging);
        self.finished = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::encode(
                "ffmpeg sink received out-of-order frame index",
            ));
        }
        self.last_idx = Some(idx);

        cfg.check_frame(frame)?;

        flatten_premul_over_bg_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::encode("ffmpeg sink is already finalized"));
        };
        stdin.write_all(&self.scratch).map_err(|e| {
            ReelError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        let status = child
            .wait()
            .map_err(|e| ReelError::encode(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = self.join_stderr()?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            let err = ReelError::encode(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            ));
            self.teardown();
            return Err(err);
        }

        let cfg = self
            .cfg
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg sink not started"))?;
        let staging = self
            .staging
            .take()
            .ok_or_else(|| ReelError::encode("ffmpeg staging file missing"))?;
        let final_path = self.opts.final_path(cfg.format);
        if let Err(e) = std::fs::rename(&staging, &final_path) {
            let _ = std::fs::remove_file(&staging);
            return Err(ReelError::encode(format!(
                "failed to move '{}' to '{}': {e}",
                staging.display(),
                final_path.display()
            )));
        }
        tracing::info!(path = %final_path.display(), "video written");
        self.finished = Some(final_path);
        Ok(())
    }

    fn abort(&mut self) {
        if self.child.is_some() || self.staging.is_some() {
            tracing::debug!("aborting ffmpeg encoder");
        }
        self.teardown();
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        self.teardown();
    }
}

pub(crate) fn flatten_premul_over_bg_to_opaque_rgba8(
    dst: &mut [u8],
    src_premul: &[u8],
    bg_rgba: [u8; 4],
) -> ReelResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(ReelError::validation(
            "frame.data size mismatch with width*height*4",
        ));
    }

    let bg = [
        u16::from(bg_rgba[0]),
        u16::from(bg_rgba[1]),
        u16::from(bg_rgba[2]),
    ];

    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }
        let inv = 255u16 - a;
        for c in 0..3 {
            d[c] = (u16::from(s[c]) + mul_div255_u16(bg[c], inv)).min(255) as u8;
        }
        d[3] = 255;
    }

    Ok(())
}

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: &Path) -> ReelResult<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
