//! Frame-indexed slideshow timeline.
//!
//! A timeline alternates one slide interval per slide with one transition interval between
//! consecutive slides. Intervals tile `[0, total_frames)` exactly. Every boundary is rounded from
//! its exact time, and every slide keeps at least one frame.

use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EntryKind {
    /// Slide `index` is on screen on its own.
    Slide { index: usize },
    /// Slide `from` hands over to slide `to` (`to == from + 1`).
    Transition { from: usize, to: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct TimelineEntry {
    #[serde(flatten)]
    pub kind: EntryKind,
    pub range: FrameRange,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    pub fps: Fps,
    pub total_frames: u64,
    pub total_secs: f64,
    pub slide_secs: f64,
    pub transition_secs: f64,
    pub entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Build the timeline for `slide_count` slides.
    ///
    /// Fails when the requested duration leaves no positive time for the slides themselves, or
    /// when a slide would round down to zero frames.
    pub fn build(
        slide_count: usize,
        total_secs: f64,
        transition_secs: f64,
        fps: Fps,
    ) -> ReelResult<Self> {
        if slide_count == 0 {
            return Err(ReelError::validation("timeline needs at least one slide"));
        }
        if !total_secs.is_finite() || total_secs <= 0.0 {
            return Err(ReelError::validation(
                "total duration must be a positive number of seconds",
            ));
        }
        if !transition_secs.is_finite() || transition_secs < 0.0 {
            return Err(ReelError::validation(
                "transition duration must be a non-negative number of seconds",
            ));
        }

        let n = slide_count as f64;
        let transitions_secs = (n - 1.0) * transition_secs;
        if total_secs <= transitions_secs {
            return Err(ReelError::validation(format!(
                "duration too short: {total_secs}s leaves no time for {slide_count} slide(s) \
                 with {transition_secs}s transitions (need more than {transitions_secs}s)"
            )));
        }
        let slide_secs = (total_secs - transitions_secs) / n;

        let total_frames = fps.secs_to_frames_round(total_secs);
        if total_frames == 0 {
            return Err(ReelError::validation(format!(
                "duration too short: {total_secs}s is less than one frame at {} fps",
                fps.as_f64()
            )));
        }
        // Boundaries are rounded from exact interval times rather than summed from rounded
        // lengths, so rounding drift never accumulates into a single entry.
        let period = slide_secs + transition_secs;
        let boundary = |secs: f64| FrameIndex(fps.secs_to_frames_round(secs).min(total_frames));

        let mut entries = Vec::with_capacity(slide_count * 2 - 1);
        for i in 0..slide_count {
            let start = i as f64 * period;
            let slide_end = if i + 1 == slide_count {
                FrameIndex(total_frames)
            } else {
                boundary(start + slide_secs)
            };
            let range = FrameRange {
                start: boundary(start),
                end: slide_end,
            };
            if range.is_empty() {
                return Err(ReelError::validation(format!(
                    "duration too short: slide {i} gets no frames \
                     ({slide_secs}s per slide at {} fps)",
                    fps.as_f64()
                )));
            }
            entries.push(TimelineEntry {
                kind: EntryKind::Slide { index: i },
                range,
            });
            if i + 1 < slide_count {
                entries.push(TimelineEntry {
                    kind: EntryKind::Transition { from: i, to: i + 1 },
                    range: FrameRange {
                        start: slide_end,
                        end: boundary((i + 1) as f64 * period),
                    },
                });
            }
        }

        Ok(Self {
            fps,
            total_frames,
            total_secs,
            slide_secs,
            transition_secs,
            entries,
        })
    }

    pub fn slide_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.kind, EntryKind::Slide { .. }))
            .count()
    }

    /// Entry containing `frame`. Frames past the end resolve to the last entry.
    pub fn locate(&self, frame: FrameIndex) -> &TimelineEntry {
        let idx = self
            .entries
            .partition_point(|e| e.range.end.0 <= frame.0)
            .min(self.entries.len() - 1);
        &self.entries[idx]
    }

    /// Entry and progress for a virtual time in milliseconds.
    ///
    /// Progress is `(pos - start) / (end - start)` in frame units, clamped to `[0, 1]`.
    pub fn sample_ms(&self, time_ms: f64) -> (&TimelineEntry, f64) {
        let pos = snap_frame_pos(self.fps.ms_to_frame_pos(time_ms.max(0.0)));
        let frame = (pos.floor() as u64).min(self.total_frames.saturating_sub(1));
        let entry = self.locate(FrameIndex(frame));
        (entry, entry_progress(entry, pos))
    }

    /// Virtual time of the very end of the video.
    pub fn end_ms(&self) -> f64 {
        self.total_secs * 1000.0
    }

    /// Virtual time frame `frame` is rendered at.
    ///
    /// Frames sample their start time, except the last one, which samples [`Self::end_ms`] so
    /// the video ends on the fully settled state.
    pub fn frame_sample_ms(&self, frame: FrameIndex) -> f64 {
        if frame.0 + 1 >= self.total_frames {
            self.end_ms()
        } else {
            self.fps.frame_time_ms(frame.0)
        }
    }
}

// Frame start times round-trip through milliseconds with float error; pull them back onto the
// exact frame boundary so a frame never resolves to its predecessor.
fn snap_frame_pos(pos: f64) -> f64 {
    let nearest = pos.round();
    if (pos - nearest).abs() < 1e-6 { nearest } else { pos }
}

/// Progress of a fractional frame position within an entry.
pub fn entry_progress(entry: &TimelineEntry, pos: f64) -> f64 {
    let start = entry.range.start.0 as f64;
    let len = entry.range.len_frames() as f64;
    if len <= 0.0 {
        return 1.0;
    }
    ((pos - start) / len).clamp(0.0, 1.0)
}

#[cfg(test)]
#[path = "../tests/unit/timeline/timeline.rs"]
mod tests;
