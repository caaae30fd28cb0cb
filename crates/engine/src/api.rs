use std::sync::LazyLock;

use rand::rngs::StdRng;
use regex::Regex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

use crate::carousel::{Carousel, CarouselKey, KeyOutcome};
use crate::config::StudioConfig;
use crate::editing::{EditingState, EditingStore, EditingUpdate, TrimBounds};
use crate::error::{Result, StudioError, ValidationError, ValidationReason};
use crate::highlight::{HighlightRegistry, HighlightSegment};
use crate::options::{SHARE_TARGETS, ShareTarget, ShortLength, TransitionStyle};
use crate::progress::{IncrementSource, ProgressSimulator, RandomIncrements};
use crate::scheduler::{RunId, Scheduler, TimerKind, TimerSignal, TokioScheduler};
use crate::synth::{GeneratedShort, synthesize};

static VIDEO_URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)youtu(\.be|be\.com)").expect("video url pattern is valid"));

/// Commands accepted by the studio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetInputUrl {
        url: String,
    },
    /// Changes the target length of the next run.
    ///
    /// A run in flight is restarted so it completes with the new length.
    SetShortLength {
        length: ShortLength,
    },
    SetTransition {
        style: TransitionStyle,
    },
    /// Flips the selection of one highlight segment.
    ///
    /// Unknown ids are ignored. A run in flight is restarted so it completes
    /// with the new selection.
    ToggleHighlight {
        segment_id: String,
    },
    /// Validates `url` and starts a new run, superseding any run in flight.
    ///
    /// # Example
    /// ```
    /// use engine::{Command, FixedIncrements, ManualScheduler, Phase, Studio};
    ///
    /// let mut studio = Studio::new(ManualScheduler::new(), FixedIncrements::new(vec![12.0]));
    /// studio
    ///     .handle_command(Command::Submit {
    ///         url: "https://youtu.be/abc".to_owned(),
    ///     })
    ///     .expect("valid url");
    /// assert_eq!(studio.phase(), Phase::Processing);
    /// ```
    Submit {
        url: String,
    },
    /// Delivers a fired timer back into the studio.
    Timer(TimerSignal),
    NextClip,
    PreviousClip,
    /// Key pressed while the carousel has focus.
    CarouselKey {
        key: CarouselKey,
    },
    UpdateEditing {
        clip_id: String,
        update: EditingUpdate,
    },
    /// Cancels any run in flight; used when the front-end goes away.
    Teardown,
}

/// Events emitted by the studio.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    StudioChanged(StudioSnapshot),
    ProgressChanged {
        run: RunId,
        progress: f64,
    },
    RunCompleted {
        run: RunId,
        clip_count: usize,
    },
    ActiveClipChanged {
        index: usize,
    },
    EditingChanged {
        clip_id: String,
        state: EditingState,
        bounds: TrimBounds,
    },
    Error(StudioErrorEvent),
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioErrorKind {
    EmptyUrl,
    InvalidDomain,
    Other,
}

impl From<&StudioError> for StudioErrorKind {
    fn from(value: &StudioError) -> Self {
        match value {
            StudioError::Validation(ValidationError {
                reason: ValidationReason::Empty,
            }) => Self::EmptyUrl,
            StudioError::Validation(ValidationError {
                reason: ValidationReason::InvalidDomain,
            }) => Self::InvalidDomain,
            _ => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioErrorEvent {
    pub kind: StudioErrorKind,
    pub message: String,
}

impl StudioErrorEvent {
    pub fn from_error(error: &StudioError) -> Self {
        Self {
            kind: StudioErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Lifecycle phase derived from the simulator and the current clip set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Processing,
    Ready,
}

impl Phase {
    pub fn status_label(self) -> &'static str {
        match self {
            Self::Idle => "Awaiting input",
            Self::Processing => "Generating shorts...",
            Self::Ready => "Shorts ready",
        }
    }
}

/// One generated short together with its edit parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSummary {
    #[serde(flatten)]
    pub short: GeneratedShort,
    pub editing: EditingState,
    pub bounds: TrimBounds,
}

/// Immutable studio snapshot consumed by the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub input_url: String,
    pub short_length: ShortLength,
    pub transition: TransitionStyle,
    pub transition_label: &'static str,
    pub phase: Phase,
    pub status_label: &'static str,
    pub progress: f64,
    pub active_index: usize,
    pub item_count: usize,
    pub last_error: Option<String>,
    pub highlights: Vec<HighlightSegment>,
    pub selected_count: usize,
    pub clips: Vec<ClipSummary>,
    pub share_targets: Vec<ShareTarget>,
}

impl StudioSnapshot {
    /// Progress rounded for display.
    pub fn progress_percent(&self) -> u8 {
        self.progress.round().clamp(0.0, 100.0) as u8
    }

    pub fn active_clip(&self) -> Option<&ClipSummary> {
        self.clips.get(self.active_index)
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Checks that `url` is non-empty and points at a YouTube domain.
pub fn validate_video_url(url: &str) -> std::result::Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(ValidationReason::Empty));
    }
    if !VIDEO_URL_PATTERN.is_match(trimmed) {
        return Err(ValidationError::new(ValidationReason::InvalidDomain));
    }
    Ok(())
}

/// Generation-and-editing state machine.
///
/// Owns the highlight registry, the clip set of the last completed run, the
/// per-short edit parameters, the carousel selection and the progress
/// simulator. Timers armed through `S` come back as [`Command::Timer`].
#[derive(Debug)]
pub struct Studio<S, I> {
    config: StudioConfig,
    scheduler: S,
    increments: I,
    registry: HighlightRegistry,
    shorts: Vec<GeneratedShort>,
    editing: EditingStore,
    carousel: Carousel,
    simulator: ProgressSimulator,
    input_url: String,
    short_length: ShortLength,
    transition: TransitionStyle,
    last_error: Option<ValidationError>,
    next_run_id: RunId,
}

impl<S, I> Studio<S, I>
where
    S: Scheduler,
    I: IncrementSource,
{
    /// Creates a studio with default tunables and the seeded highlights.
    pub fn new(scheduler: S, increments: I) -> Self {
        Self::build(StudioConfig::default(), scheduler, increments)
    }

    /// Creates a studio from a validated configuration.
    pub fn with_config(config: StudioConfig, scheduler: S, increments: I) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, scheduler, increments))
    }

    fn build(config: StudioConfig, scheduler: S, increments: I) -> Self {
        Self {
            scheduler,
            increments,
            registry: HighlightRegistry::seeded(),
            shorts: Vec::new(),
            editing: EditingStore::new(config.min_trim_span_secs, config.default_sound_level),
            carousel: Carousel::default(),
            simulator: ProgressSimulator::new(config.tick_period(), config.completion_delay()),
            input_url: String::new(),
            short_length: config.default_short_length,
            transition: config.default_transition,
            last_error: None,
            next_run_id: 1,
            config,
        }
    }

    /// Replaces the highlight candidates; used before the first run.
    pub fn with_highlights(mut self, registry: HighlightRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Applies one command and returns emitted events.
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        match command {
            Command::SetInputUrl { url } => {
                self.input_url = url;
                Ok(Vec::new())
            }
            Command::SetShortLength { length } => self.set_short_length(length),
            Command::SetTransition { style } => self.set_transition(style),
            Command::ToggleHighlight { segment_id } => self.toggle_highlight(&segment_id),
            Command::Submit { url } => self.submit(url),
            Command::Timer(signal) => self.on_timer(signal),
            Command::NextClip => Ok(active_clip_event(self.carousel.next())),
            Command::PreviousClip => Ok(active_clip_event(self.carousel.previous())),
            Command::CarouselKey { key } => {
                let outcome = self.carousel.handle_key(key);
                Ok(match outcome {
                    KeyOutcome::Handled => active_clip_event(Some(self.carousel.active_index())),
                    KeyOutcome::Ignored => Vec::new(),
                })
            }
            Command::UpdateEditing { clip_id, update } => self.update_editing(clip_id, update),
            Command::Teardown => self.teardown(),
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        if self.simulator.is_running() {
            Phase::Processing
        } else if !self.shorts.is_empty() {
            Phase::Ready
        } else {
            Phase::Idle
        }
    }

    pub fn progress(&self) -> f64 {
        self.simulator.progress()
    }

    pub fn current_run(&self) -> Option<RunId> {
        self.simulator.current_run()
    }

    pub fn shorts(&self) -> &[GeneratedShort] {
        &self.shorts
    }

    pub fn editing(&self) -> &EditingStore {
        &self.editing
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn highlights(&self) -> &HighlightRegistry {
        &self.registry
    }

    pub fn input_url(&self) -> &str {
        &self.input_url
    }

    pub fn short_length(&self) -> ShortLength {
        self.short_length
    }

    pub fn transition(&self) -> TransitionStyle {
        self.transition
    }

    pub fn transition_label(&self) -> &'static str {
        self.transition.label()
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    /// Creates an immutable snapshot for the rendering layer.
    pub fn snapshot(&self) -> StudioSnapshot {
        let min_span = self.editing.min_trim_span();
        let phase = self.phase();
        StudioSnapshot {
            input_url: self.input_url.clone(),
            short_length: self.short_length,
            transition: self.transition,
            transition_label: self.transition_label(),
            phase,
            status_label: phase.status_label(),
            progress: self.progress(),
            active_index: self.carousel.active_index(),
            item_count: self.carousel.item_count(),
            last_error: self
                .last_error
                .map(|error| error.reason.message().to_owned()),
            highlights: self.registry.segments().to_vec(),
            selected_count: self.registry.selected_count(),
            clips: self
                .shorts
                .iter()
                .map(|short| {
                    let editing = self.editing.get_or_default(&short.id, short.duration);
                    let bounds = TrimBounds::for_state(&editing, short.duration, min_span);
                    ClipSummary {
                        short: short.clone(),
                        editing,
                        bounds,
                    }
                })
                .collect(),
            share_targets: SHARE_TARGETS.to_vec(),
        }
    }

    /// Validates `url` and arms a new run.
    ///
    /// A rejected url records the error and leaves the phase and any run in
    /// flight untouched.
    pub fn submit(&mut self, url: String) -> Result<Vec<Event>> {
        self.input_url = url;
        if let Err(error) = validate_video_url(&self.input_url) {
            warn!(reason = error.reason.code(), "submission rejected");
            self.last_error = Some(error);
            return Err(error.into());
        }

        self.last_error = None;
        self.shorts.clear();
        self.carousel.set_count(0);
        let run = self.arm_new_run();
        info!(
            run,
            length_secs = self.short_length.seconds(),
            transition = self.transition.value(),
            "generation run armed"
        );

        Ok(vec![Event::StudioChanged(self.snapshot())])
    }

    /// Flips the selection of one highlight.
    pub fn toggle_highlight(&mut self, segment_id: &str) -> Result<Vec<Event>> {
        let Some(selected) = self.registry.toggle(segment_id) else {
            return Ok(Vec::new());
        };
        debug!(
            segment_id,
            selected,
            selected_count = self.registry.selected_count(),
            "highlight toggled"
        );
        self.restart_if_processing("highlight selection changed");
        Ok(vec![Event::StudioChanged(self.snapshot())])
    }

    pub fn set_short_length(&mut self, length: ShortLength) -> Result<Vec<Event>> {
        if self.short_length == length {
            return Ok(Vec::new());
        }
        self.short_length = length;
        self.restart_if_processing("short length changed");
        Ok(vec![Event::StudioChanged(self.snapshot())])
    }

    pub fn set_transition(&mut self, style: TransitionStyle) -> Result<Vec<Event>> {
        if self.transition == style {
            return Ok(Vec::new());
        }
        self.transition = style;
        Ok(vec![Event::StudioChanged(self.snapshot())])
    }

    /// Merges `update` into the edit parameters of `clip_id`.
    ///
    /// Unknown ids produce no events.
    pub fn update_editing(&mut self, clip_id: String, update: EditingUpdate) -> Result<Vec<Event>> {
        if self.editing.update(&clip_id, update).is_none() {
            return Ok(Vec::new());
        }
        let (Some(state), Some(bounds)) = (self.editing.get(&clip_id), self.editing.bounds(&clip_id))
        else {
            return Ok(Vec::new());
        };
        Ok(vec![Event::EditingChanged {
            state: state.clone(),
            bounds,
            clip_id,
        }])
    }

    /// Applies one fired timer.
    ///
    /// Signals from any run other than the armed one are discarded.
    pub fn on_timer(&mut self, signal: TimerSignal) -> Result<Vec<Event>> {
        if !self.simulator.accepts(&signal) {
            debug!(
                run = signal.run,
                kind = ?signal.kind,
                current = ?self.simulator.current_run(),
                "stale timer signal discarded"
            );
            return Ok(Vec::new());
        }

        match signal.kind {
            TimerKind::ProgressTick => {
                let increment = self.increments.next_increment();
                let progress = self.simulator.advance(increment);
                debug!(run = signal.run, increment, progress, "progress tick");
                Ok(vec![Event::ProgressChanged {
                    run: signal.run,
                    progress,
                }])
            }
            TimerKind::Completion => Ok(self.complete_run(signal.run)),
        }
    }

    /// Cancels any run in flight.
    pub fn teardown(&mut self) -> Result<Vec<Event>> {
        if let Some(run) = self.simulator.cancel() {
            info!(run, "run cancelled on teardown");
            return Ok(vec![Event::StudioChanged(self.snapshot())]);
        }
        Ok(Vec::new())
    }

    fn complete_run(&mut self, run: RunId) -> Vec<Event> {
        let _ = self.simulator.finish();
        let shorts = synthesize(&self.registry.selected_or_fallback(), self.short_length);
        self.editing.reset_for(&shorts);
        self.shorts = shorts;
        self.carousel.reset(self.shorts.len());

        let clip_count = self.shorts.len();
        info!(run, clip_count, "generation run completed");
        vec![
            Event::ProgressChanged {
                run,
                progress: self.simulator.progress(),
            },
            Event::RunCompleted { run, clip_count },
            Event::StudioChanged(self.snapshot()),
        ]
    }

    fn restart_if_processing(&mut self, reason: &'static str) {
        let Some(previous) = self.simulator.current_run() else {
            return;
        };
        let run = self.arm_new_run();
        info!(previous, run, reason, "generation run restarted");
    }

    fn arm_new_run(&mut self) -> RunId {
        let run = self.allocate_run_id();
        self.simulator.arm(&mut self.scheduler, run);
        run
    }

    fn allocate_run_id(&mut self) -> RunId {
        let id = self.next_run_id;
        self.next_run_id += 1;
        id
    }
}

fn active_clip_event(index: Option<usize>) -> Vec<Event> {
    index
        .map(|index| vec![Event::ActiveClipChanged { index }])
        .unwrap_or_default()
}

impl Studio<TokioScheduler, RandomIncrements<StdRng>> {
    /// Creates a studio whose timers run on `runtime`.
    ///
    /// Every signal read from the returned receiver must be fed back as
    /// [`Command::Timer`].
    pub fn with_tokio(
        config: StudioConfig,
        runtime: Handle,
    ) -> Result<(Self, UnboundedReceiver<TimerSignal>)> {
        config.validate()?;
        let (scheduler, signal_rx) = TokioScheduler::channel(runtime);
        let increments = RandomIncrements::from_entropy(config.min_increment, config.max_increment);
        let studio = Self::with_config(config, scheduler, increments)?;
        Ok((studio, signal_rx))
    }
}
