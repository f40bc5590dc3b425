//! Chapter visibility tracking and directional navigation.
//!
//! Turns the host's intersection-observer samples into one discrete current
//! chapter, and answers keyboard navigation with clamped scroll requests.
//! Achievement emission happens here (entering chapters 2 and 3); the host
//! routes the resulting effects into the [`AchievementGate`], which keeps
//! them idempotent.
//!
//! [`AchievementGate`]: crate::achievements::AchievementGate

use crate::achievements::AchievementKey;
use smallvec::SmallVec;

/// Minimum intersection ratio for a chapter to be considered visible.
pub const MIN_VISIBLE_RATIO: f64 = 0.3;
/// Ratios the host's observer should sample at, for responsive updates
/// without thrashing on scroll jitter.
pub const OBSERVER_THRESHOLDS: [f64; 3] = [0.3, 0.6, 0.9];

/// One observer reading for one chapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilitySample {
    pub index: usize,
    pub ratio: f64,
}

/// Navigation intents the keyboard surface maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    First,
    Last,
}

impl NavCommand {
    /// Map a `KeyboardEvent.key` value. Unmapped keys return `None` so the
    /// host leaves default scrolling untouched; mapped keys must be
    /// `preventDefault`ed by the host.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowDown" | "PageDown" => Some(Self::Next),
            "ArrowUp" | "PageUp" => Some(Self::Previous),
            "Home" => Some(Self::First),
            "End" => Some(Self::Last),
            _ => None,
        }
    }
}

/// Outward effects of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEffect {
    /// Smooth-scroll chapter `index` into view.
    ScrollTo(usize),
    /// The viewer entered a chapter that carries a milestone.
    Unlock(AchievementKey),
}

/// Maps continuous scroll visibility onto a single current chapter index.
#[derive(Debug, Default)]
pub struct SectionTracker {
    chapter_count: usize,
    current: usize,
    back_to_top_visible: bool,
}

impl SectionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the mounted chapters. Zero means "not mounted yet": all
    /// navigation and visibility input is ignored until chapters exist.
    pub fn set_chapter_count(&mut self, count: usize) {
        self.chapter_count = count;
        if count == 0 {
            self.current = 0;
        } else if self.current >= count {
            self.current = count - 1;
        }
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapter_count
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn back_to_top_visible(&self) -> bool {
        self.back_to_top_visible
    }

    /// The ritual finished; show the "back to top" affordance.
    pub fn show_back_to_top(&mut self) {
        self.back_to_top_visible = true;
    }

    /// Digest a batch of visibility samples.
    ///
    /// The winner is the sample with the highest ratio at or above
    /// [`MIN_VISIBLE_RATIO`]. On ties the current chapter wins if it is among
    /// the tied candidates (no switch on jitter); otherwise the lowest index
    /// wins. Entering index 1 or 2 emits the matching unlock.
    pub fn observe(&mut self, samples: &[VisibilitySample]) -> SmallVec<[SectionEffect; 1]> {
        let mut out = SmallVec::new();
        if self.chapter_count == 0 {
            return out;
        }

        let mut best: Option<VisibilitySample> = None;
        for sample in samples {
            if sample.index >= self.chapter_count || sample.ratio < MIN_VISIBLE_RATIO {
                continue;
            }
            best = match best {
                None => Some(*sample),
                Some(prev) if sample.ratio > prev.ratio => Some(*sample),
                Some(prev) if (sample.ratio - prev.ratio).abs() < f64::EPSILON => {
                    // Tie: stay on the current chapter if it is a candidate,
                    // else take the lowest index for determinism.
                    if sample.index == self.current
                        || (prev.index != self.current && sample.index < prev.index)
                    {
                        Some(*sample)
                    } else {
                        Some(prev)
                    }
                }
                Some(prev) => Some(prev),
            };
        }

        if let Some(winner) = best {
            if winner.index != self.current {
                log::debug!("section change {} -> {}", self.current, winner.index);
                self.current = winner.index;
                match winner.index {
                    1 => out.push(SectionEffect::Unlock(AchievementKey::Section2)),
                    2 => out.push(SectionEffect::Unlock(AchievementKey::Section3)),
                    _ => {}
                }
            }
        }
        out
    }

    /// Apply a navigation command; clamped at the boundaries but always a
    /// valid scroll request.
    pub fn navigate(&mut self, command: NavCommand) -> SmallVec<[SectionEffect; 1]> {
        let mut out = SmallVec::new();
        if self.chapter_count == 0 {
            return out;
        }
        let last = self.chapter_count - 1;
        let target = match command {
            NavCommand::Next => (self.current + 1).min(last),
            NavCommand::Previous => self.current.saturating_sub(1),
            NavCommand::First => 0,
            NavCommand::Last => last,
        };
        out.push(SectionEffect::ScrollTo(target));
        out
    }

    /// Scroll straight to `index` (dot rail, scroll indicators), clamped.
    pub fn request_scroll(&mut self, index: usize) -> SmallVec<[SectionEffect; 1]> {
        let mut out = SmallVec::new();
        if self.chapter_count == 0 {
            return out;
        }
        out.push(SectionEffect::ScrollTo(index.min(self.chapter_count - 1)));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SectionTracker {
        let mut t = SectionTracker::new();
        t.set_chapter_count(3);
        t
    }

    #[test]
    fn highest_ratio_wins() {
        let mut t = tracker();
        let effects = t.observe(&[
            VisibilitySample { index: 0, ratio: 0.4 },
            VisibilitySample { index: 1, ratio: 0.6 },
        ]);
        assert_eq!(t.current(), 1);
        assert_eq!(
            effects.as_slice(),
            [SectionEffect::Unlock(AchievementKey::Section2)]
        );
    }

    #[test]
    fn below_threshold_samples_are_ignored() {
        let mut t = tracker();
        t.observe(&[VisibilitySample { index: 2, ratio: 0.29 }]);
        assert_eq!(t.current(), 0);
    }

    #[test]
    fn ties_keep_the_current_chapter() {
        let mut t = tracker();
        t.observe(&[VisibilitySample { index: 1, ratio: 0.9 }]);
        assert_eq!(t.current(), 1);

        let effects = t.observe(&[
            VisibilitySample { index: 0, ratio: 0.6 },
            VisibilitySample { index: 1, ratio: 0.6 },
        ]);
        assert_eq!(t.current(), 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn tie_without_current_prefers_lowest_index() {
        let mut t = tracker();
        let effects = t.observe(&[
            VisibilitySample { index: 2, ratio: 0.6 },
            VisibilitySample { index: 1, ratio: 0.6 },
        ]);
        // Current (0) is not a candidate; the lowest tied index wins.
        assert_eq!(t.current(), 1);
        assert_eq!(
            effects.as_slice(),
            [SectionEffect::Unlock(AchievementKey::Section2)]
        );
    }

    #[test]
    fn reentering_a_chapter_emits_unlock_again_for_gate_to_dedupe() {
        let mut t = tracker();
        t.observe(&[VisibilitySample { index: 1, ratio: 0.9 }]);
        t.observe(&[VisibilitySample { index: 0, ratio: 0.9 }]);
        let effects = t.observe(&[VisibilitySample { index: 1, ratio: 0.9 }]);
        assert_eq!(
            effects.as_slice(),
            [SectionEffect::Unlock(AchievementKey::Section2)]
        );
    }

    #[test]
    fn navigation_clamps_at_boundaries() {
        let mut t = tracker();
        assert_eq!(
            t.navigate(NavCommand::Previous).as_slice(),
            [SectionEffect::ScrollTo(0)]
        );
        assert_eq!(
            t.navigate(NavCommand::Last).as_slice(),
            [SectionEffect::ScrollTo(2)]
        );
        // Navigation targets do not move `current`; only visibility does.
        t.observe(&[VisibilitySample { index: 2, ratio: 0.9 }]);
        assert_eq!(
            t.navigate(NavCommand::Next).as_slice(),
            [SectionEffect::ScrollTo(2)]
        );
        assert_eq!(
            t.navigate(NavCommand::First).as_slice(),
            [SectionEffect::ScrollTo(0)]
        );
    }

    #[test]
    fn input_is_ignored_before_chapters_mount() {
        let mut t = SectionTracker::new();
        assert!(t.navigate(NavCommand::Next).is_empty());
        assert!(t
            .observe(&[VisibilitySample { index: 1, ratio: 0.9 }])
            .is_empty());
    }

    #[test]
    fn key_mapping_covers_the_keyboard_surface() {
        assert_eq!(NavCommand::from_key("ArrowDown"), Some(NavCommand::Next));
        assert_eq!(NavCommand::from_key("PageDown"), Some(NavCommand::Next));
        assert_eq!(NavCommand::from_key("ArrowUp"), Some(NavCommand::Previous));
        assert_eq!(NavCommand::from_key("PageUp"), Some(NavCommand::Previous));
        assert_eq!(NavCommand::from_key("Home"), Some(NavCommand::First));
        assert_eq!(NavCommand::from_key("End"), Some(NavCommand::Last));
        assert_eq!(NavCommand::from_key("a"), None);
    }
}
