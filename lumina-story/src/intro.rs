//! Intro scene sequencer.
//!
//! Timed, cancellable, linear progression through the fixed scene list:
//! `Loading -> AwaitingGesture -> Playing(i) -> Completed`. Playback is gated
//! behind a user gesture because the hosting browser will only start audio
//! from one; a bounded wait makes sure a broken scene asset never strands the
//! viewer on the loading screen.

use crate::content::SceneScript;
use crate::timer::TimerQueue;
use smallvec::SmallVec;

/// Maximum time to wait for the first scene asset before proceeding anyway.
pub const ASSET_WAIT_MS: u64 = 5_000;
/// Pause after the last scene before completion is announced.
pub const COMPLETION_PAUSE_MS: u64 = 2_000;
/// Volume for the intro track started by the gesture.
pub const INTRO_VOLUME: f32 = 0.3;

/// Where the sequencer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    /// Waiting for the first scene asset (or the bounded-wait fallback).
    Loading,
    /// Asset ready; waiting for the user's first interaction.
    AwaitingGesture,
    /// Showing scene `i`.
    Playing(usize),
    /// The whole sequence has run; completion has been announced.
    Completed,
}

#[derive(Debug, Clone, Copy)]
enum IntroTimer {
    AssetFallback,
    AdvanceScene,
    AnnounceCompletion,
}

/// Outward effects of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntroEffect {
    /// Start the intro audio track. Failures are the host's to swallow.
    PlayAudio { volume: f32 },
    /// Stop the intro audio and rewind it to position zero.
    StopAudio,
    /// Scene `index` is now on screen.
    SceneShown(usize),
    /// The intro finished. Emitted exactly once.
    IntroComplete,
}

/// Drives the intro scene list on a virtual clock.
#[derive(Debug)]
pub struct SceneSequencer {
    script: SceneScript,
    phase: IntroPhase,
    asset_loaded: bool,
    audio_started: bool,
    completion_announced: bool,
    torn_down: bool,
    timers: TimerQueue<IntroTimer>,
}

impl SceneSequencer {
    /// Create a sequencer in `Loading`, arming the bounded asset wait.
    #[must_use]
    pub fn new(script: SceneScript, now: u64) -> Self {
        let mut timers = TimerQueue::new();
        timers.schedule(now, ASSET_WAIT_MS, IntroTimer::AssetFallback);
        Self {
            script,
            phase: IntroPhase::Loading,
            asset_loaded: false,
            audio_started: false,
            completion_announced: false,
            torn_down: false,
            timers,
        }
    }

    #[must_use]
    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    #[must_use]
    pub fn script(&self) -> &SceneScript {
        &self.script
    }

    /// Scene index currently on screen, if playing.
    #[must_use]
    pub fn current_scene(&self) -> Option<usize> {
        match self.phase {
            IntroPhase::Playing(i) => Some(i),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == IntroPhase::Completed
    }

    /// The first scene's asset finished loading (success or failure; both
    /// unblock the gesture screen).
    pub fn asset_loaded(&mut self, _now: u64) {
        if self.torn_down {
            return;
        }
        self.asset_loaded = true;
        if self.phase == IntroPhase::Loading {
            self.phase = IntroPhase::AwaitingGesture;
            log::debug!("intro asset ready, awaiting gesture");
        }
    }

    /// First user interaction (click/tap/Enter/Space). Starts playback and
    /// the intro track. Later gestures are no-ops.
    pub fn gesture(&mut self, now: u64) -> SmallVec<[IntroEffect; 2]> {
        let mut out = SmallVec::new();
        if self.torn_down || self.phase != IntroPhase::AwaitingGesture {
            return out;
        }
        self.phase = IntroPhase::Playing(0);
        self.audio_started = true;
        self.schedule_advance(0, now);
        out.push(IntroEffect::PlayAudio {
            volume: INTRO_VOLUME,
        });
        out.push(IntroEffect::SceneShown(0));
        log::info!("intro started");
        out
    }

    fn schedule_advance(&mut self, scene: usize, now: u64) {
        // Playing(i) only ever holds validated indices.
        if let Some(duration) = self.script.duration_of(scene) {
            self.timers.schedule(now, duration, IntroTimer::AdvanceScene);
        }
    }

    /// Fire all due timers, returning the transitions they caused.
    pub fn poll(&mut self, now: u64) -> SmallVec<[IntroEffect; 2]> {
        let mut out = SmallVec::new();
        if self.torn_down {
            return out;
        }
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                IntroTimer::AssetFallback => self.asset_loaded(now),
                IntroTimer::AdvanceScene => {
                    let IntroPhase::Playing(i) = self.phase else {
                        continue;
                    };
                    if i < self.script.last_index() {
                        self.phase = IntroPhase::Playing(i + 1);
                        self.schedule_advance(i + 1, now);
                        out.push(IntroEffect::SceneShown(i + 1));
                        log::debug!("intro advanced to scene {}", i + 1);
                    } else {
                        self.timers
                            .schedule(now, COMPLETION_PAUSE_MS, IntroTimer::AnnounceCompletion);
                    }
                }
                IntroTimer::AnnounceCompletion => {
                    if !self.completion_announced {
                        self.completion_announced = true;
                        self.phase = IntroPhase::Completed;
                        out.push(IntroEffect::IntroComplete);
                        log::info!("intro complete");
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        if self.torn_down {
            None
        } else {
            self.timers.next_deadline()
        }
    }

    /// Cancel every pending transition; stop and rewind audio if it started.
    ///
    /// After teardown no transition fires and `poll` returns nothing.
    pub fn teardown(&mut self) -> SmallVec<[IntroEffect; 2]> {
        let mut out = SmallVec::new();
        self.torn_down = true;
        self.timers.clear();
        if self.audio_started {
            out.push(IntroEffect::StopAudio);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::StoryContent;

    fn sequencer(now: u64) -> SceneSequencer {
        let script = StoryContent::load_from_static().scene_script().unwrap();
        SceneSequencer::new(script, now)
    }

    fn drain_until(seq: &mut SceneSequencer, until: u64) -> Vec<IntroEffect> {
        let mut all = Vec::new();
        while let Some(deadline) = seq.next_deadline() {
            if deadline > until {
                break;
            }
            all.extend(seq.poll(deadline));
        }
        all
    }

    #[test]
    fn gesture_before_asset_load_is_ignored() {
        let mut seq = sequencer(0);
        assert!(seq.gesture(10).is_empty());
        assert_eq!(seq.phase(), IntroPhase::Loading);
    }

    #[test]
    fn asset_fallback_unblocks_after_bounded_wait() {
        let mut seq = sequencer(0);
        assert!(seq.poll(ASSET_WAIT_MS - 1).is_empty());
        seq.poll(ASSET_WAIT_MS);
        assert_eq!(seq.phase(), IntroPhase::AwaitingGesture);
    }

    #[test]
    fn scenes_advance_monotonically_and_complete_once() {
        let mut seq = sequencer(0);
        seq.asset_loaded(100);
        let start = seq.gesture(200);
        assert!(start.contains(&IntroEffect::PlayAudio {
            volume: INTRO_VOLUME
        }));
        assert_eq!(seq.current_scene(), Some(0));

        let total = seq.script().total_duration_ms();
        let effects = drain_until(&mut seq, 200 + total + COMPLETION_PAUSE_MS);

        let shown: Vec<usize> = effects
            .iter()
            .filter_map(|e| match e {
                IntroEffect::SceneShown(i) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec![1, 2, 3]);

        let completions = effects
            .iter()
            .filter(|e| matches!(e, IntroEffect::IntroComplete))
            .count();
        assert_eq!(completions, 1);
        assert!(seq.is_completed());
        assert_eq!(seq.next_deadline(), None);
    }

    #[test]
    fn completion_lands_exactly_at_total_plus_pause() {
        let mut seq = sequencer(0);
        seq.asset_loaded(0);
        seq.gesture(0);
        let total = seq.script().total_duration_ms();

        // Walk scene boundaries.
        let mut t = 0;
        for i in 0..seq.script().len() {
            t += seq.script().duration_of(i).unwrap();
            seq.poll(t);
        }
        assert_eq!(t, total);
        assert!(!seq.is_completed());
        assert!(seq.poll(total + COMPLETION_PAUSE_MS - 1).is_empty());
        let done = seq.poll(total + COMPLETION_PAUSE_MS);
        assert_eq!(done.as_slice(), [IntroEffect::IntroComplete]);
    }

    #[test]
    fn teardown_cancels_timers_and_stops_audio() {
        let mut seq = sequencer(0);
        seq.asset_loaded(0);
        seq.gesture(0);
        let effects = seq.teardown();
        assert_eq!(effects.as_slice(), [IntroEffect::StopAudio]);
        assert_eq!(seq.next_deadline(), None);
        assert!(seq.poll(u64::MAX).is_empty());
        assert!(seq.gesture(10).is_empty());
    }

    #[test]
    fn teardown_before_start_does_not_touch_audio() {
        let mut seq = sequencer(0);
        assert!(seq.teardown().is_empty());
    }
}
