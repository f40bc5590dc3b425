//! Achievement registry and toast lifecycle.

use crate::timer::TimerQueue;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

/// Milestones the presentation can unlock, in narrative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AchievementKey {
    MusicStart,
    Section2,
    Section3,
    BackToTop,
}

impl AchievementKey {
    pub const ALL: [Self; 4] = [
        Self::MusicStart,
        Self::Section2,
        Self::Section3,
        Self::BackToTop,
    ];
}

/// How long a toast stays fully visible before its exit animation starts.
pub const TOAST_VISIBLE_MS: u64 = 4_000;
/// Exit-animation window after which the slot frees up again.
pub const TOAST_EXIT_MS: u64 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToastPhase {
    Visible,
    Exiting,
}

#[derive(Debug, Clone, Copy)]
enum GateTimer {
    BeginExit,
    FreeSlot,
}

/// Outward events produced by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEffect {
    /// `key` entered the registry. Emitted at most once per key.
    Unlocked(AchievementKey),
    /// A toast for `key` became visible.
    ToastOpened(AchievementKey),
    /// The visible toast started its exit animation.
    ToastExiting(AchievementKey),
    /// The slot is free again.
    ToastClosed(AchievementKey),
}

/// Idempotent unlock registry with a single-slot toast display.
///
/// Unlocks are recorded in a set; a toast is shown only when the slot is
/// empty. Unlocks arriving while a toast is active are recorded but never
/// displayed later - at most one toast is visible at a time and nothing is
/// queued behind it.
#[derive(Debug, Default)]
pub struct AchievementGate {
    unlocked: BTreeSet<AchievementKey>,
    toast: Option<(AchievementKey, ToastPhase)>,
    timers: TimerQueue<GateTimer>,
}

impl AchievementGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` and, if the toast slot is free, start displaying it.
    ///
    /// A duplicate unlock is a no-op with no effects.
    pub fn unlock(&mut self, key: AchievementKey, now: u64) -> SmallVec<[GateEffect; 2]> {
        let mut out = SmallVec::new();
        if !self.unlocked.insert(key) {
            return out;
        }
        log::info!("achievement unlocked: {key:?}");
        out.push(GateEffect::Unlocked(key));

        if self.toast.is_none() {
            self.toast = Some((key, ToastPhase::Visible));
            self.timers.schedule(now, TOAST_VISIBLE_MS, GateTimer::BeginExit);
            out.push(GateEffect::ToastOpened(key));
        }
        out
    }

    /// Fire all due toast-lifecycle timers.
    pub fn poll(&mut self, now: u64) -> SmallVec<[GateEffect; 2]> {
        let mut out = SmallVec::new();
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                GateTimer::BeginExit => {
                    if let Some((key, phase)) = self.toast.as_mut() {
                        *phase = ToastPhase::Exiting;
                        self.timers.schedule(now, TOAST_EXIT_MS, GateTimer::FreeSlot);
                        out.push(GateEffect::ToastExiting(*key));
                    }
                }
                GateTimer::FreeSlot => {
                    if let Some((key, _)) = self.toast.take() {
                        out.push(GateEffect::ToastClosed(key));
                    }
                }
            }
        }
        out
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    #[must_use]
    pub fn is_unlocked(&self, key: AchievementKey) -> bool {
        self.unlocked.contains(&key)
    }

    #[must_use]
    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }

    /// Toast currently occupying the display slot, with its exit flag.
    #[must_use]
    pub fn current_toast(&self) -> Option<(AchievementKey, bool)> {
        self.toast
            .map(|(key, phase)| (key, phase == ToastPhase::Exiting))
    }

    /// Drop all pending timers and the active toast.
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.toast = None;
    }
}
