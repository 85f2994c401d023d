//! Application layer: script to scenes to slides, per-slide image supply, export trigger.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::export::{CancelToken, ExportJob, ExportReport, Exporter};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::Fnv1a64;
use crate::scene::deck::SlideDeck;
use crate::scene::slide::{AspectRatio, ImageRef, Slide, SlideId, SlideImage, TransitionKind};

/// One scene of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    pub description: String,
}

/// Turns a script into an ordered list of scenes.
pub trait SceneGenerator: Send + Sync {
    fn generate(&self, script: &str) -> ReelResult<Vec<Scene>>;
}

/// Splits a script into sentences.
///
/// A sentence is a run of text ending in one or more of `.`, `!`, `?` (kept). Text after the
/// last terminator is dropped unless the script has no terminator at all, in which case the
/// whole script is one sentence. Sentences of `min_chars` characters or fewer are discarded.
#[derive(Clone, Debug)]
pub struct SentenceSceneGenerator {
    pub min_chars: usize,
}

impl Default for SentenceSceneGenerator {
    fn default() -> Self {
        Self { min_chars: 5 }
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn split_sentences(script: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut chars = script.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_terminator(c) {
            start.get_or_insert(i);
            continue;
        }
        let mut end = i + c.len_utf8();
        while let Some(&(j, d)) = chars.peek()
            && is_terminator(d)
        {
            end = j + d.len_utf8();
            chars.next();
        }
        if let Some(s) = start.take() {
            out.push(&script[s..end]);
        }
    }
    if out.is_empty() {
        out.push(script);
    }
    out
}

impl SceneGenerator for SentenceSceneGenerator {
    fn generate(&self, script: &str) -> ReelResult<Vec<Scene>> {
        if script.trim().is_empty() {
            return Err(ReelError::validation("script is empty"));
        }
        let scenes: Vec<Scene> = split_sentences(script)
            .into_iter()
            .map(str::trim)
            .filter(|s| s.chars().count() > self.min_chars)
            .map(|s| Scene {
                description: s.to_owned(),
            })
            .collect();
        if scenes.is_empty() {
            return Err(ReelError::scene_generation(
                "no scenes produced; try a longer script",
            ));
        }
        Ok(scenes)
    }
}

/// Produces an image reference for one scene.
pub trait ImageSupplier: Send + Sync {
    fn supply(&self, scene: &Scene, slide: SlideId, aspect: AspectRatio) -> ReelResult<ImageRef>;
}

pub const DEFAULT_IMAGE_TEMPLATE: &str = "https://picsum.photos/{width}/{height}?random={seed}";

/// Fills `{width}`, `{height}` and `{seed}` in a URL template.
///
/// Width and height come from the aspect ratio's canvas; the seed is derived from the
/// supplier seed and the slide id so every slide gets a distinct, reproducible URL.
#[derive(Clone, Debug)]
pub struct UrlTemplateSupplier {
    template: String,
    seed: u64,
}

impl UrlTemplateSupplier {
    pub fn new(template: impl Into<String>, seed: u64) -> ReelResult<Self> {
        let template = template.into();
        let probe = template
            .replace("{width}", "1")
            .replace("{height}", "1")
            .replace("{seed}", "1");
        url::Url::parse(&probe).map_err(|e| {
            ReelError::validation(format!("image template '{template}' is not a URL: {e}"))
        })?;
        Ok(Self { template, seed })
    }

    pub fn url_for(&self, slide: SlideId, aspect: AspectRatio) -> String {
        let canvas = aspect.canvas();
        let mut h = Fnv1a64::new(self.seed);
        h.write_u64(slide.0);
        self.template
            .replace("{width}", &canvas.width.to_string())
            .replace("{height}", &canvas.height.to_string())
            .replace("{seed}", &h.finish().to_string())
    }
}

impl ImageSupplier for UrlTemplateSupplier {
    fn supply(&self, _scene: &Scene, slide: SlideId, aspect: AspectRatio) -> ReelResult<ImageRef> {
        Ok(ImageRef::Url(self.url_for(slide, aspect)))
    }
}

/// Transition for the slide at `index`, picked uniformly from every kind by seeded hash.
pub fn seeded_transition(seed: u64, index: usize) -> TransitionKind {
    let mut h = Fnv1a64::new(seed);
    h.write_u64(index as u64);
    let all = TransitionKind::ALL;
    all[(h.finish() % all.len() as u64) as usize]
}

const PENDING_STATUS: &str = "waiting for image";

#[derive(Clone, Debug, Default)]
struct StudioState {
    deck: SlideDeck,
    aspect: AspectRatio,
}

/// Owns the current slide deck and the collaborators that fill it.
///
/// The deck is an immutable snapshot behind a mutex; every change swaps in a new deck where
/// only the affected slide differs, so readers never observe a half-updated deck.
pub struct Studio {
    generator: Arc<dyn SceneGenerator>,
    supplier: Arc<dyn ImageSupplier>,
    seed: u64,
    next_id: AtomicU64,
    state: Mutex<StudioState>,
}

impl Studio {
    pub fn new(
        generator: Arc<dyn SceneGenerator>,
        supplier: Arc<dyn ImageSupplier>,
        seed: u64,
    ) -> Self {
        Self {
            generator,
            supplier,
            seed,
            next_id: AtomicU64::new(1),
            state: Mutex::new(StudioState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, StudioState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current deck snapshot.
    pub fn deck(&self) -> SlideDeck {
        self.state().deck.clone()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.state().aspect
    }

    /// Replace the deck, e.g. with one loaded from a project file.
    pub fn load(&self, deck: SlideDeck, aspect: AspectRatio) {
        if let Some(max) = deck.slides().iter().map(|s| s.id.0).max() {
            self.next_id.fetch_max(max + 1, Ordering::SeqCst);
        }
        *self.state() = StudioState { deck, aspect };
    }

    /// Build a fresh deck from `script` and supply every slide's image.
    ///
    /// Scene generation errors propagate; a failing image supply only marks its slide
    /// [`SlideImage::Failed`].
    #[tracing::instrument(skip_all, fields(aspect = %aspect))]
    pub fn generate(&self, script: &str, aspect: AspectRatio) -> ReelResult<SlideDeck> {
        let scenes = self.generator.generate(script)?;
        info!(scenes = scenes.len(), "scenes generated");

        let slides: Vec<Slide> = scenes
            .iter()
            .enumerate()
            .map(|(i, scene)| {
                let id = SlideId(self.next_id.fetch_add(1, Ordering::SeqCst));
                let mut slide = Slide::pending(
                    id,
                    scene.description.clone(),
                    Some(seeded_transition(self.seed, i)),
                );
                slide.status_text = Some(PENDING_STATUS.to_owned());
                slide
            })
            .collect();
        let ids: Vec<SlideId> = slides.iter().map(|s| s.id).collect();
        *self.state() = StudioState {
            deck: SlideDeck::new(slides),
            aspect,
        };

        scenes
            .par_iter()
            .zip(ids.par_iter())
            .for_each(|(scene, &id)| self.supply_one(scene, id, aspect));

        let deck = self.deck();
        let failed = deck
            .slides()
            .iter()
            .filter(|s| matches!(s.image, SlideImage::Failed { .. }))
            .count();
        if failed > 0 {
            warn!(failed, "some slides have no image");
        }
        Ok(deck)
    }

    /// Ask the supplier again for one slide, typically after it failed.
    pub fn resupply(&self, id: SlideId) -> ReelResult<SlideDeck> {
        let (scene, aspect) = {
            let mut state = self.state();
            let slide = state
                .deck
                .get(id)
                .ok_or_else(|| ReelError::validation(format!("unknown slide {id}")))?;
            let scene = Scene {
                description: slide.text.clone(),
            };
            state.deck = state.deck.with_slide(id, |s| Slide {
                image: SlideImage::Pending,
                status_text: Some(PENDING_STATUS.to_owned()),
                ..s.clone()
            })?;
            (scene, state.aspect)
        };
        self.supply_one(&scene, id, aspect);
        Ok(self.deck())
    }

    /// Change the transition into slide `id`.
    pub fn set_transition(
        &self,
        id: SlideId,
        transition: Option<TransitionKind>,
    ) -> ReelResult<SlideDeck> {
        let mut state = self.state();
        state.deck = state.deck.with_slide(id, |s| Slide {
            transition,
            ..s.clone()
        })?;
        Ok(state.deck.clone())
    }

    /// Export the current deck into `out_dir`.
    pub fn export_to_dir(
        &self,
        exporter: &Exporter,
        total_secs: f64,
        out_dir: &Path,
        cancel: &CancelToken,
    ) -> ReelResult<ExportReport> {
        let StudioState { deck, aspect } = self.state().clone();
        exporter.export_to_dir(&deck, &ExportJob::new(aspect, total_secs), out_dir, cancel)
    }

    fn supply_one(&self, scene: &Scene, id: SlideId, aspect: AspectRatio) {
        let image = match self.supplier.supply(scene, id, aspect) {
            Ok(r) => {
                debug!(slide = %id, source = %r, "image supplied");
                SlideImage::Ready(r)
            }
            Err(e) => {
                warn!(slide = %id, error = %e, "image supply failed");
                SlideImage::Failed {
                    reason: e.to_string(),
                }
            }
        };
        let mut state = self.state();
        match state.deck.with_image(id, image) {
            Ok(next) => state.deck = next,
            // The deck was replaced while this slide was being supplied.
            Err(_) => debug!(slide = %id, "dropping image for a slide no longer in the deck"),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/studio/studio.rs"]
mod tests;
