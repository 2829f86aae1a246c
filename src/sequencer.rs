//! Hero capture sequence.
//!
//! The home page hero plays a short piece of choreography: every hero image
//! is preloaded, then "photographed" one at a time (the lens ring moves, the
//! shutter flashes, the shot lands on a stack), and finally the stack turns
//! into an endless slideshow.
//!
//! ```text
//! Idle ──start()──▶ Preloading ──all assets settled + preload_settle──▶ Capturing(0)
//!   Capturing(i) ──lens_move, flash, inter_shot──▶ Capturing(i + 1)
//!   Capturing(n-1) ──slideshow_settle──▶ Slideshow(0)
//!   Slideshow(i) ──slideshow_interval──▶ Slideshow((i + 1) % n)   (forever)
//! ```
//!
//! # Settle semantics
//!
//! Preloading waits for every asset to *settle*: a load that fails counts the
//! same as one that succeeds. A broken hero image must never hold the show
//! back, so failures are logged at debug level and otherwise ignored.
//!
//! # Time and cancellation
//!
//! All waiting goes through the [`Clock`] trait. [`TokioClock`] uses
//! `tokio::time::sleep`, which means tests run the whole sequence under
//! paused virtual time without real delays.
//!
//! The sequence runs as a single spawned task. [`AnimationSequencer::stop`]
//! aborts it and closes the publication gate while holding the channel lock,
//! so once `stop()` returns no observer ever sees another change. Dropping
//! the sequencer stops it.

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),
    #[error("asset path leaves the public directory: {0}")]
    OutsideRoot(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Sequence description
// ============================================================================

/// Transform applied to the lens ring while a shot is being framed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LensPosition {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub scale: f32,
}

impl LensPosition {
    pub const fn new(x: f32, y: f32, rotation: f32, scale: f32) -> Self {
        Self {
            x,
            y,
            rotation,
            scale,
        }
    }
}

impl Default for LensPosition {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Fixed delays of the sequence, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequencerTimings {
    /// Pause between "all assets settled" and the first shot.
    pub preload_settle: u64,
    /// Time the lens ring gets to move before the shutter fires.
    pub lens_move: u64,
    /// How long the shutter flash stays on.
    pub flash: u64,
    /// Gap between two shots (not applied after the last one).
    pub inter_shot: u64,
    /// Pause between the last shot and the slideshow.
    pub slideshow_settle: u64,
    /// Slideshow advance period.
    pub slideshow_interval: u64,
}

impl Default for SequencerTimings {
    fn default() -> Self {
        Self {
            preload_settle: 2500,
            lens_move: 150,
            flash: 100,
            inter_shot: 250,
            slideshow_settle: 800,
            slideshow_interval: 3000,
        }
    }
}

impl SequencerTimings {
    pub fn preload_settle(&self) -> Duration {
        Duration::from_millis(self.preload_settle)
    }

    pub fn lens_move(&self) -> Duration {
        Duration::from_millis(self.lens_move)
    }

    pub fn flash(&self) -> Duration {
        Duration::from_millis(self.flash)
    }

    pub fn inter_shot(&self) -> Duration {
        Duration::from_millis(self.inter_shot)
    }

    pub fn slideshow_settle(&self) -> Duration {
        Duration::from_millis(self.slideshow_settle)
    }

    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow_interval)
    }
}

/// Everything the hero needs to play: images in capture order, one lens
/// transform per shot, and the timings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroSequence {
    pub images: Vec<String>,
    pub lens_positions: Vec<LensPosition>,
    pub timings: SequencerTimings,
}

impl Default for HeroSequence {
    fn default() -> Self {
        Self {
            images: [
                "/images/hero.jpg",
                "/images/hero2.jpg",
                "/images/gallery3.jpg",
                "/images/gallery6.jpg",
                "/images/gallery5.jpg",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            lens_positions: vec![
                LensPosition::new(0.0, 0.0, 0.0, 1.0),
                LensPosition::new(-20.0, 10.0, -5.0, 1.1),
                LensPosition::new(15.0, -15.0, 3.0, 0.95),
                LensPosition::new(-10.0, 20.0, -2.0, 1.05),
                LensPosition::new(25.0, -5.0, 4.0, 0.9),
            ],
            timings: SequencerTimings::default(),
        }
    }
}

impl HeroSequence {
    /// Lens transform for shot `index`. Positions repeat when there are more
    /// images than positions.
    pub fn lens_for(&self, index: usize) -> LensPosition {
        if self.lens_positions.is_empty() {
            return LensPosition::default();
        }
        self.lens_positions[index % self.lens_positions.len()]
    }
}

// ============================================================================
// Observable state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "name", content = "index", rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Preloading,
    Capturing(usize),
    Slideshow(usize),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::Preloading => write!(f, "preloading"),
            Phase::Capturing(i) => write!(f, "capturing #{}", i + 1),
            Phase::Slideshow(i) => write!(f, "slideshow #{}", i + 1),
        }
    }
}

static NEXT_CAPTURE_ID: AtomicU64 = AtomicU64::new(1);

/// One shot taken during the capture phase. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedImage {
    /// Unique for the lifetime of the process.
    pub id: u64,
    pub source: String,
    pub sequence_index: usize,
}

impl CapturedImage {
    fn new(source: &str, sequence_index: usize) -> Self {
        Self {
            id: NEXT_CAPTURE_ID.fetch_add(1, Ordering::Relaxed),
            source: source.to_string(),
            sequence_index,
        }
    }
}

/// What the presentation layer renders at any instant.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SequencerSnapshot {
    pub phase: Phase,
    /// Set once every asset has settled.
    pub assets_ready: bool,
    pub lens: LensPosition,
    /// Shutter flash overlay.
    pub flash: bool,
    /// Append-only during a run, in ascending `sequence_index`.
    pub captured: Vec<CapturedImage>,
}

impl SequencerSnapshot {
    /// The image on screen while in the slideshow.
    pub fn current_slide(&self) -> Option<&CapturedImage> {
        match self.phase {
            Phase::Slideshow(i) => self.captured.get(i),
            _ => None,
        }
    }
}

// ============================================================================
// Clock and asset loading seams
// ============================================================================

/// Source of delays.
pub trait Clock: Send + Sync + 'static {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Loads (or at least touches) one hero asset.
pub trait AssetLoader: Send + Sync + 'static {
    fn load(&self, source: &str) -> impl Future<Output = Result<(), AssetError>> + Send;
}

/// Resolves site-absolute asset paths (`/images/hero.jpg`) against the
/// public directory and checks that the file is there.
#[derive(Debug, Clone)]
pub struct FileAssetLoader {
    root: PathBuf,
}

impl FileAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a site path onto the public directory. Only plain path segments
    /// are accepted.
    pub fn resolve(&self, source: &str) -> Result<PathBuf, AssetError> {
        let relative = Path::new(source.trim_start_matches('/'));
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !plain || relative.as_os_str().is_empty() {
            return Err(AssetError::OutsideRoot(source.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetLoader for FileAssetLoader {
    fn load(&self, source: &str) -> impl Future<Output = Result<(), AssetError>> + Send {
        let resolved = self.resolve(source);
        let source = source.to_string();
        async move {
            let path = resolved?;
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => Ok(()),
                Ok(_) => Err(AssetError::NotFound(source)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(AssetError::NotFound(source))
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}

/// Outcome counts of a settled preload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Wait for every load to finish, successful or not.
pub async fn settle_all<L: AssetLoader>(loader: &L, sources: &[String]) -> SettleReport {
    let outcomes = join_all(sources.iter().map(|source| loader.load(source))).await;

    let mut report = SettleReport::default();
    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(()) => report.loaded += 1,
            Err(e) => {
                tracing::debug!(%source, error = %e, "hero asset did not load, treating as settled");
                report.failed += 1;
            }
        }
    }
    report
}

// ============================================================================
// Sequencer
// ============================================================================

/// State channel plus the id of the run currently allowed to publish.
///
/// Run ids start at 1; 0 means "closed".
struct Shared {
    state: watch::Sender<SequencerSnapshot>,
    live_run: AtomicU64,
    next_run: AtomicU64,
}

impl Shared {
    fn publish(&self, run: u64, update: impl FnOnce(&mut SequencerSnapshot)) {
        self.state.send_if_modified(|snapshot| {
            if self.live_run.load(Ordering::Acquire) != run {
                return false;
            }
            let before = snapshot.clone();
            update(snapshot);
            *snapshot != before
        });
    }

    /// Open a new run and reset the snapshot to `Preloading`.
    fn begin(&self) -> u64 {
        let run = self.next_run.fetch_add(1, Ordering::Relaxed);
        self.state.send_modify(|snapshot| {
            self.live_run.store(run, Ordering::Release);
            *snapshot = SequencerSnapshot {
                phase: Phase::Preloading,
                ..SequencerSnapshot::default()
            };
        });
        run
    }

    fn close(&self) {
        self.state.send_if_modified(|_| {
            self.live_run.store(0, Ordering::Release);
            false
        });
    }
}

/// Drives the hero choreography; see the module docs for the state machine.
pub struct AnimationSequencer<C: Clock = TokioClock, L: AssetLoader = FileAssetLoader> {
    sequence: Arc<HeroSequence>,
    clock: Arc<C>,
    loader: Arc<L>,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl<C: Clock, L: AssetLoader> AnimationSequencer<C, L> {
    pub fn new(sequence: HeroSequence, clock: C, loader: L) -> Self {
        let (state, _) = watch::channel(SequencerSnapshot::default());
        Self {
            sequence: Arc::new(sequence),
            clock: Arc::new(clock),
            loader: Arc::new(loader),
            shared: Arc::new(Shared {
                state,
                live_run: AtomicU64::new(0),
                next_run: AtomicU64::new(1),
            }),
            task: None,
        }
    }

    /// Begin the sequence. Returns `false` (and changes nothing) when a run
    /// is already in progress; otherwise clears any previous captures and
    /// starts over from `Preloading`.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            tracing::debug!("hero sequence already running, ignoring start");
            return false;
        }

        let run = Run {
            id: self.shared.begin(),
            shared: Arc::clone(&self.shared),
            clock: Arc::clone(&self.clock),
            loader: Arc::clone(&self.loader),
            sequence: Arc::clone(&self.sequence),
        };
        tracing::debug!(run = run.id, images = self.sequence.images.len(), "hero sequence started");
        self.task = Some(tokio::spawn(run.drive()));
        true
    }

    /// Cancel every pending delay and the slideshow timer. Safe in any phase
    /// and when called repeatedly. The last published snapshot stays as is.
    pub fn stop(&mut self) {
        self.shared.close();
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("hero sequence stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn snapshot(&self) -> SequencerSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SequencerSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn sequence(&self) -> &HeroSequence {
        &self.sequence
    }
}

impl<C: Clock, L: AssetLoader> Drop for AnimationSequencer<C, L> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One pass through the state machine, owned by the spawned task.
struct Run<C: Clock, L: AssetLoader> {
    id: u64,
    shared: Arc<Shared>,
    clock: Arc<C>,
    loader: Arc<L>,
    sequence: Arc<HeroSequence>,
}

impl<C: Clock, L: AssetLoader> Run<C, L> {
    fn publish(&self, update: impl FnOnce(&mut SequencerSnapshot)) {
        self.shared.publish(self.id, update);
    }

    async fn drive(self) {
        let sequence = &*self.sequence;
        let timings = &sequence.timings;

        let report = settle_all(&*self.loader, &sequence.images).await;
        tracing::debug!(
            loaded = report.loaded,
            failed = report.failed,
            "hero assets settled"
        );
        self.publish(|s| s.assets_ready = true);
        self.clock.sleep(timings.preload_settle()).await;

        let total = sequence.images.len();
        for (index, source) in sequence.images.iter().enumerate() {
            let lens = sequence.lens_for(index);
            self.publish(|s| {
                s.phase = Phase::Capturing(index);
                s.lens = lens;
            });
            self.clock.sleep(timings.lens_move()).await;

            let shot = CapturedImage::new(source, index);
            self.publish(|s| {
                s.flash = true;
                s.captured.push(shot);
            });

            let pause = if index + 1 < total {
                timings.inter_shot()
            } else {
                timings.slideshow_settle()
            };
            let flash_off = async {
                self.clock.sleep(timings.flash()).await;
                self.publish(|s| s.flash = false);
            };
            tokio::join!(flash_off, self.clock.sleep(pause));
        }

        if total == 0 {
            self.clock.sleep(timings.slideshow_settle()).await;
        }
        self.publish(|s| s.phase = Phase::Slideshow(0));
        if total == 0 {
            return;
        }

        loop {
            self.clock.sleep(timings.slideshow_interval()).await;
            self.publish(|s| {
                if let Phase::Slideshow(current) = s.phase {
                    s.phase = Phase::Slideshow((current + 1) % s.captured.len().max(1));
                }
            });
        }
    }
}

// ============================================================================
// Following a run
// ============================================================================

/// One step reported by [`follow_slides`].
#[derive(Debug)]
pub enum Progress<'a> {
    /// A new snapshot was published.
    Changed {
        prev: &'a SequencerSnapshot,
        next: &'a SequencerSnapshot,
    },
    /// A slideshow interval passed with the same slide still on screen.
    Held(&'a SequencerSnapshot),
}

/// Follow a started sequencer until `slides` slideshow slides have been
/// shown, reporting every step. A slide counts once per interval it stays on
/// screen, so a one-image slideshow still ends. Returns the slides shown;
/// fewer only when nothing was captured or the sequencer went away.
pub async fn follow_slides<C: Clock, L: AssetLoader>(
    sequencer: &AnimationSequencer<C, L>,
    slides: usize,
    mut step: impl FnMut(Progress<'_>),
) -> usize {
    let mut updates = sequencer.subscribe();
    let hold = sequencer.sequence.timings.slideshow_interval() * 3 / 2;
    let mut prev = SequencerSnapshot::default();
    let mut shown = 0;

    loop {
        let next = updates.borrow_and_update().clone();
        step(Progress::Changed {
            prev: &prev,
            next: &next,
        });
        if let Phase::Slideshow(_) = next.phase {
            if next.captured.is_empty() {
                return shown;
            }
            if prev.phase != next.phase {
                shown += 1;
            }
        }
        prev = next;

        loop {
            if shown >= slides {
                return shown;
            }
            if !matches!(prev.phase, Phase::Slideshow(_)) {
                if updates.changed().await.is_err() {
                    return shown;
                }
                break;
            }
            tokio::select! {
                changed = updates.changed() => {
                    if changed.is_err() {
                        return shown;
                    }
                    break;
                }
                _ = sequencer.clock.sleep(hold) => {
                    shown += 1;
                    step(Progress::Held(&prev));
                }
            }
        }
    }
}
