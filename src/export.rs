//! Export driver: renders a slide deck over virtual time and feeds the frames to a sink.
//!
//! Frames are produced on the calling thread and handed through a bounded channel to an
//! encoder thread that owns the sink for the duration of the frame loop. The sink is started
//! before the first frame is drawn and only finalized after the last frame was pushed.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::assets::loader::ImageLoader;
use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
use crate::encode::format::{EncoderProbe, VideoFormat, select_format};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Canvas, Fps, FrameIndex};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::FrameRGBA;
use crate::render::renderer::{FrameRenderer, RenderOpts};
use crate::scene::deck::SlideDeck;
use crate::scene::slide::AspectRatio;
use crate::timeline::Timeline;

mod control;

pub use control::{CancelToken, YieldPolicy};
use control::{BusyGuard, YieldClock};

/// Settings shared by every export from one [`Exporter`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    pub fps: Fps,
    pub transition_secs: f64,
    pub render: RenderOpts,
    pub yield_policy: YieldPolicy,
    pub bitrate_bps: u32,
    /// Frames buffered between the renderer and the encoder thread.
    pub channel_capacity: usize,
    /// File stem of exported videos.
    pub product_name: String,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            fps: Fps { num: 30, den: 1 },
            transition_secs: 1.0,
            render: RenderOpts::default(),
            yield_policy: YieldPolicy::default(),
            bitrate_bps: 3_000_000,
            channel_capacity: 4,
            product_name: "slidereel".to_owned(),
        }
    }
}

impl ExportOpts {
    pub fn validate(&self) -> ReelResult<()> {
        Fps::new(self.fps.num, self.fps.den)?;
        self.yield_policy.validate()?;
        if !self.transition_secs.is_finite() || self.transition_secs < 0.0 {
            return Err(ReelError::validation(
                "transition duration must be a non-negative number of seconds",
            ));
        }
        if self.bitrate_bps == 0 {
            return Err(ReelError::validation("bitrate must be > 0"));
        }
        if self.product_name.trim().is_empty()
            || self.product_name.contains(['/', '\\'])
        {
            return Err(ReelError::validation(format!(
                "product name '{}' is not a plain file stem",
                self.product_name
            )));
        }
        Ok(())
    }
}

/// Per-export parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExportJob {
    pub total_secs: f64,
    pub canvas: Canvas,
}

impl ExportJob {
    pub fn new(aspect: AspectRatio, total_secs: f64) -> Self {
        Self {
            total_secs,
            canvas: aspect.canvas(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportProgress {
    pub frames_done: u64,
    pub total_frames: u64,
}

impl ExportProgress {
    pub fn fraction(self) -> f64 {
        if self.total_frames == 0 {
            return 1.0;
        }
        self.frames_done as f64 / self.total_frames as f64
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportReport {
    pub format: VideoFormat,
    pub frames: u64,
    pub canvas: Canvas,
    pub duration_secs: f64,
    /// Finished video, for exports written to disk.
    pub output: Option<PathBuf>,
    pub elapsed: Duration,
}

type ProgressFn = dyn Fn(ExportProgress) + Send + Sync;

/// Turns slide decks into videos.
///
/// An exporter runs one export at a time; concurrent calls fail with [`ReelError::Busy`].
pub struct Exporter {
    loader: ImageLoader,
    probe: Arc<dyn EncoderProbe>,
    opts: ExportOpts,
    on_progress: Option<Arc<ProgressFn>>,
    busy: AtomicBool,
}

impl Exporter {
    pub fn new(
        loader: ImageLoader,
        probe: Arc<dyn EncoderProbe>,
        opts: ExportOpts,
    ) -> ReelResult<Self> {
        opts.validate()?;
        Ok(Self {
            loader,
            probe,
            opts,
            on_progress: None,
            busy: AtomicBool::new(false),
        })
    }

    /// Called at every yield point and once when the last frame was pushed.
    pub fn with_progress(mut self, f: impl Fn(ExportProgress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(f));
        self
    }

    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    /// Timeline an export of `deck` would use.
    pub fn plan(&self, deck: &SlideDeck, job: &ExportJob) -> ReelResult<Timeline> {
        Timeline::build(
            deck.len(),
            job.total_secs,
            self.opts.transition_secs,
            self.opts.fps,
        )
    }

    /// Export into `<out_dir>/<product_name>.<ext>` through the system `ffmpeg`.
    pub fn export_to_dir(
        &self,
        deck: &SlideDeck,
        job: &ExportJob,
        out_dir: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<ExportReport> {
        let mut sink_opts = FfmpegSinkOpts::new(out_dir, self.opts.product_name.clone());
        sink_opts.bg_rgba = self.opts.render.background_rgba;
        let mut sink = FfmpegSink::new(sink_opts);
        let mut report = self.export(deck, job, &mut sink, cancel)?;
        report.output = sink.output_path().map(Path::to_path_buf);
        Ok(report)
    }

    /// Render every frame of `deck` into `sink`.
    ///
    /// The deck must be fully resolved. The sink sees `begin`, then every frame in order,
    /// then `end`; on any failure or cancellation it sees `abort` instead of `end`.
    #[tracing::instrument(skip_all, fields(slides = deck.len(), total_secs = job.total_secs))]
    pub fn export(
        &self,
        deck: &SlideDeck,
        job: &ExportJob,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> ReelResult<ExportReport> {
        let _busy = BusyGuard::acquire(&self.busy)?;
        let started = Instant::now();

        let sources = deck.ready_sources()?;
        let timeline = self.plan(deck, job)?;
        let format = select_format(self.probe.as_ref())?;
        tracing::info!(
            %format,
            mime = %format.mime(),
            frames = timeline.total_frames,
            frame_ms = self.opts.fps.frame_duration_ms(),
            width = job.canvas.width,
            height = job.canvas.height,
            "export starting"
        );

        let images = self.loader.load_all(&sources)?;
        cancel.check()?;

        let total_frames = timeline.total_frames;
        let duration_secs = timeline.total_secs;
        let mut renderer = FrameRenderer::new(
            timeline,
            images,
            deck.transitions(),
            job.canvas,
            self.opts.render,
        )?;

        sink.begin(SinkConfig {
            width: job.canvas.width,
            height: job.canvas.height,
            fps: self.opts.fps,
            format,
            bitrate_bps: self.opts.bitrate_bps,
        })?;

        let recorded = self.record(&mut renderer, sink, cancel);
        let finished = recorded.and_then(|()| sink.end());
        if let Err(e) = finished {
            sink.abort();
            match &e {
                ReelError::Cancelled => tracing::info!("export cancelled"),
                other => tracing::warn!(error = %other, "export failed"),
            }
            return Err(e);
        }

        self.report_progress(ExportProgress {
            frames_done: total_frames,
            total_frames,
        });
        let elapsed = started.elapsed();
        tracing::info!(frames = total_frames, ?elapsed, "export finished");
        Ok(ExportReport {
            format,
            frames: total_frames,
            canvas: job.canvas,
            duration_secs,
            output: None,
            elapsed,
        })
    }

    fn record(
        &self,
        renderer: &mut FrameRenderer,
        sink: &mut dyn FrameSink,
        cancel: &CancelToken,
    ) -> ReelResult<()> {
        let total_frames = renderer.timeline().total_frames;
        let cap = self.opts.channel_capacity.max(1);

        std::thread::scope(|scope| -> ReelResult<()> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);

            let enc = scope.spawn(move || -> ReelResult<()> {
                for msg in rx {
                    sink.push_frame(msg.idx, &msg.frame)?;
                }
                Ok(())
            });

            let produce_res = (|| -> ReelResult<()> {
                let mut clock = YieldClock::new(self.opts.yield_policy);
                for k in 0..total_frames {
                    let frame = renderer.render_frame(FrameIndex(k)).to_frame();
                    tx.send(FrameMsg {
                        idx: FrameIndex(k),
                        frame,
                    })
                    .map_err(|_| ReelError::encode("encoder thread is not accepting frames"))?;

                    if clock.due(k + 1) {
                        self.report_progress(ExportProgress {
                            frames_done: k + 1,
                            total_frames,
                        });
                        cancel.check()?;
                        std::thread::yield_now();
                    }
                }
                Ok(())
            })();

            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| ReelError::encode("encoder thread panicked"))?;

            // A sink failure surfaces to the producer as a closed channel; report the cause.
            match (produce_res, enc_res) {
                (_, Err(e)) => Err(e),
                (Err(e), Ok(())) => Err(e),
                (Ok(()), Ok(())) => Ok(()),
            }
        })
    }

    fn report_progress(&self, p: ExportProgress) {
        if let Some(f) = &self.on_progress {
            f(p);
        }
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: FrameRGBA,
}

#[cfg(test)]
#[path = "../tests/unit/export/export.rs"]
mod tests;
