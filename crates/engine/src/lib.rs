//! UI-agnostic generation-and-editing engine for the shorts studio.

pub mod api;
pub mod carousel;
pub mod config;
pub mod editing;
pub mod error;
pub mod highlight;
pub mod options;
pub mod progress;
pub mod scheduler;
pub mod synth;

pub use api::{
    ClipSummary, Command, Event, Phase, Studio, StudioErrorEvent, StudioErrorKind, StudioSnapshot,
    validate_video_url,
};
pub use carousel::{Carousel, CarouselKey, KeyOutcome};
pub use config::StudioConfig;
pub use editing::{
    EditingState, EditingStore, EditingUpdate, MAX_SOUND_LEVEL, SOUND_LEVEL_STEP, TRIM_STEP_SECS,
    TrimBounds,
};
pub use error::{Result, StudioError, ValidationError, ValidationReason};
pub use highlight::{HighlightRegistry, HighlightSegment};
pub use options::{SHARE_TARGETS, ShareTarget, ShortLength, TransitionStyle};
pub use progress::{FixedIncrements, IncrementSource, ProgressSimulator, RandomIncrements};
pub use scheduler::{
    ManualScheduler, RunId, Scheduler, TimerHandle, TimerKind, TimerSignal, TokioScheduler,
};
pub use synth::{GRADIENT_PALETTE, GeneratedShort, synthesize};
