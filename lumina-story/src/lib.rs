//! Lumina Story Engine
//!
//! Platform-agnostic interaction core for the Lumina scroll-story birthday
//! presentation. This crate provides the state machines behind the intro
//! sequence, chapter tracking, achievements and the two chapter mini-games,
//! without UI or platform-specific dependencies.
//!
//! Every time-dependent operation takes the current story time in
//! milliseconds; machines never read a wall clock. Hosts drive them by
//! feeding input events, sleeping until [`next_deadline`] and draining
//! [`poll`], then acting on the returned effect values. Machines never hold
//! references to each other; cross-machine wiring (a chapter entry unlocking
//! an achievement, the ritual finishing revealing the back-to-top affordance)
//! is the host's routing of effects.
//!
//! [`next_deadline`]: SceneSequencer::next_deadline
//! [`poll`]: SceneSequencer::poll

pub mod achievements;
pub mod content;
pub mod fx;
pub mod intro;
pub mod ritual;
pub mod sections;
pub mod siege;
pub mod timer;

// Re-export commonly used types
pub use achievements::{
    AchievementGate, AchievementKey, GateEffect, TOAST_EXIT_MS, TOAST_VISIBLE_MS,
};
pub use content::{AchievementInfo, MessageCard, Scene, SceneScript, ScriptError, StoryContent};
pub use fx::{BurstSpec, Origin};
pub use intro::{
    ASSET_WAIT_MS, COMPLETION_PAUSE_MS, INTRO_VOLUME, IntroEffect, IntroPhase, SceneSequencer,
};
pub use ritual::{
    CANDLE_COUNT, Rect, RitualEffect, RitualPhase, RitualStateMachine, STREAM_DURATION_MS,
    STREAM_INTERVAL_MS,
};
pub use sections::{
    MIN_VISIBLE_RATIO, NavCommand, OBSERVER_THRESHOLDS, SectionEffect, SectionTracker,
    VisibilitySample,
};
pub use siege::{
    DAMAGE_PER_IMPACT, DeployOutcome, IMPACT_DELAY_MS, Projectile, SEAL_COUNT, Seal, SiegeEffect,
    SiegePhase, SiegeStateMachine,
};
pub use timer::{TimerId, TimerQueue};
