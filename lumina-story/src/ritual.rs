//! Chapter 3 cake ritual.
//!
//! Strictly ordered ceremony: land the spell on the cake, blow out all three
//! candles, cut the cake. Each step only becomes available once the previous
//! one finished, and the finale's side streams run on the virtual clock so
//! they cancel cleanly on teardown.

use crate::fx::BurstSpec;
use crate::timer::TimerQueue;
use smallvec::SmallVec;

pub const CANDLE_COUNT: usize = 3;
/// Interval between finale side-stream jets.
pub const STREAM_INTERVAL_MS: u64 = 250;
/// Total lifetime of the finale side stream.
pub const STREAM_DURATION_MS: u64 = 5_000;

/// Ceremony steps, in order. No step can be skipped or revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RitualPhase {
    /// The cake is dormant; waiting for the spell.
    AwaitingSpell,
    /// Spell landed; candles are lit and tappable.
    CandlesLit,
    /// Every candle is out; the cut is available.
    AllBlown,
    /// The cake is cut and the message cards are revealed.
    Cut,
}

/// Axis-aligned drop target in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

#[derive(Debug, Clone, Copy)]
enum RitualTimer {
    StreamTick,
}

/// Outward effects of the ritual.
#[derive(Debug, Clone, PartialEq)]
pub enum RitualEffect {
    /// The spell landed; the cake woke up.
    SpellLanded,
    Burst(BurstSpec),
    /// Candle `index` went out; `remaining` are still lit.
    CandleBlown { index: usize, remaining: usize },
    /// The last candle went out.
    AllCandlesOut,
    /// The cake was cut; message cards are now revealed.
    CakeCut,
    /// The whole presentation's final interaction happened. Emitted once;
    /// hosts route this to the journey-completion affordances.
    RitualComplete,
}

/// Drives the spell / candles / cut ceremony.
#[derive(Debug)]
pub struct RitualStateMachine {
    phase: RitualPhase,
    candles: [bool; CANDLE_COUNT],
    low_power: bool,
    stream_ends_at: u64,
    torn_down: bool,
    timers: TimerQueue<RitualTimer>,
}

impl RitualStateMachine {
    /// `low_power` shrinks bursts and skips the continuous finale stream.
    #[must_use]
    pub fn new(low_power: bool) -> Self {
        Self {
            phase: RitualPhase::AwaitingSpell,
            candles: [true; CANDLE_COUNT],
            low_power,
            stream_ends_at: 0,
            torn_down: false,
            timers: TimerQueue::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> RitualPhase {
        self.phase
    }

    /// Lit state per candle.
    #[must_use]
    pub fn candles(&self) -> &[bool; CANDLE_COUNT] {
        &self.candles
    }

    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.candles.iter().filter(|lit| **lit).count()
    }

    /// Whether the message cards are on screen.
    #[must_use]
    pub fn messages_revealed(&self) -> bool {
        self.phase == RitualPhase::Cut
    }

    /// Land the spell directly (click/keyboard path). A no-op once landed.
    pub fn drop_spell(&mut self, _now: u64) -> SmallVec<[RitualEffect; 2]> {
        let mut out = SmallVec::new();
        if self.torn_down || self.phase != RitualPhase::AwaitingSpell {
            return out;
        }
        self.phase = RitualPhase::CandlesLit;
        out.push(RitualEffect::SpellLanded);
        out.push(RitualEffect::Burst(BurstSpec::spell_drop(self.low_power)));
        log::info!("spell landed, candles lit");
        out
    }

    /// Drag-and-drop path: the spell lands only if the release point falls
    /// inside the cake's rectangle. A miss changes nothing.
    pub fn drop_spell_at(
        &mut self,
        x: f64,
        y: f64,
        cake: Rect,
        now: u64,
    ) -> SmallVec<[RitualEffect; 2]> {
        if cake.contains(x, y) {
            self.drop_spell(now)
        } else {
            SmallVec::new()
        }
    }

    /// Blow out candle `index`. Inert before the spell lands, on an unknown
    /// index, or on a candle that is already out.
    pub fn blow_out_candle(&mut self, index: usize, _now: u64) -> SmallVec<[RitualEffect; 3]> {
        let mut out = SmallVec::new();
        if self.torn_down || self.phase != RitualPhase::CandlesLit {
            return out;
        }
        let Some(candle) = self.candles.get_mut(index) else {
            return out;
        };
        if !*candle {
            return out;
        }
        *candle = false;

        let remaining = self.lit_count();
        out.push(RitualEffect::CandleBlown { index, remaining });
        out.push(RitualEffect::Burst(BurstSpec::candle_puff(self.low_power)));
        if remaining == 0 {
            self.phase = RitualPhase::AllBlown;
            out.push(RitualEffect::AllCandlesOut);
            log::info!("all candles out");
        }
        out
    }

    /// Cut the cake. Only valid once every candle is out; fires the finale
    /// burst, starts the side streams, and reveals the message cards.
    pub fn cut_cake(&mut self, now: u64) -> SmallVec<[RitualEffect; 4]> {
        let mut out = SmallVec::new();
        if self.torn_down || self.phase != RitualPhase::AllBlown {
            return out;
        }
        self.phase = RitualPhase::Cut;
        out.push(RitualEffect::CakeCut);
        out.push(RitualEffect::Burst(BurstSpec::cake_finale(self.low_power)));
        out.push(RitualEffect::RitualComplete);
        if !self.low_power {
            self.stream_ends_at = now.saturating_add(STREAM_DURATION_MS);
            self.timers.schedule(now, STREAM_INTERVAL_MS, RitualTimer::StreamTick);
        }
        log::info!("cake cut");
        out
    }

    /// Fire due finale-stream ticks. Each tick launches one jet from each
    /// screen edge, then re-arms until the stream window closes.
    pub fn poll(&mut self, now: u64) -> SmallVec<[RitualEffect; 4]> {
        let mut out = SmallVec::new();
        if self.torn_down {
            return out;
        }
        while let Some(RitualTimer::StreamTick) = self.timers.pop_due(now) {
            out.push(RitualEffect::Burst(BurstSpec::finale_stream(true)));
            out.push(RitualEffect::Burst(BurstSpec::finale_stream(false)));
            if now < self.stream_ends_at {
                self.timers.schedule(now, STREAM_INTERVAL_MS, RitualTimer::StreamTick);
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

    /// Cancel the stream and ignore all further input.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cake() -> Rect {
        Rect {
            left: 100.0,
            top: 200.0,
            right: 300.0,
            bottom: 400.0,
        }
    }

    fn lit_machine() -> RitualStateMachine {
        let mut ritual = RitualStateMachine::new(false);
        ritual.drop_spell(0);
        ritual
    }

    #[test]
    fn ceremony_runs_in_strict_order() {
        let mut ritual = RitualStateMachine::new(false);
        // Candles and knife do nothing before the spell.
        assert!(ritual.blow_out_candle(0, 0).is_empty());
        assert!(ritual.cut_cake(0).is_empty());

        let landed = ritual.drop_spell(0);
        assert!(landed.contains(&RitualEffect::SpellLanded));
        assert_eq!(ritual.phase(), RitualPhase::CandlesLit);

        // Cut is still locked while any candle burns.
        assert!(ritual.cut_cake(10).is_empty());

        ritual.blow_out_candle(0, 20);
        ritual.blow_out_candle(1, 30);
        let last = ritual.blow_out_candle(2, 40);
        assert!(last.contains(&RitualEffect::AllCandlesOut));
        assert_eq!(ritual.phase(), RitualPhase::AllBlown);

        let cut = ritual.cut_cake(50);
        assert!(cut.contains(&RitualEffect::CakeCut));
        assert!(cut.contains(&RitualEffect::RitualComplete));
        assert!(ritual.messages_revealed());
    }

    #[test]
    fn drag_drop_requires_a_hit() {
        let mut ritual = RitualStateMachine::new(false);
        assert!(ritual.drop_spell_at(50.0, 50.0, cake(), 0).is_empty());
        assert_eq!(ritual.phase(), RitualPhase::AwaitingSpell);

        let hit = ritual.drop_spell_at(200.0, 300.0, cake(), 10);
        assert!(hit.contains(&RitualEffect::SpellLanded));
        assert_eq!(ritual.phase(), RitualPhase::CandlesLit);
    }

    #[test]
    fn rect_edges_count_as_hits() {
        let r = cake();
        assert!(r.contains(100.0, 200.0));
        assert!(r.contains(300.0, 400.0));
        assert!(!r.contains(300.1, 300.0));
    }

    #[test]
    fn second_spell_drop_is_a_no_op() {
        let mut ritual = lit_machine();
        assert!(ritual.drop_spell(10).is_empty());
        assert!(ritual.drop_spell_at(200.0, 300.0, cake(), 10).is_empty());
    }

    #[test]
    fn blowing_an_unlit_candle_does_nothing() {
        let mut ritual = lit_machine();
        let first = ritual.blow_out_candle(1, 0);
        assert!(first.contains(&RitualEffect::CandleBlown {
            index: 1,
            remaining: 2
        }));
        assert!(ritual.blow_out_candle(1, 10).is_empty());
        assert!(ritual.blow_out_candle(99, 10).is_empty());
        assert_eq!(ritual.lit_count(), 2);
    }

    #[test]
    fn cut_is_idempotent() {
        let mut ritual = lit_machine();
        for i in 0..CANDLE_COUNT {
            ritual.blow_out_candle(i, 0);
        }
        let first = ritual.cut_cake(100);
        assert!(first.contains(&RitualEffect::RitualComplete));
        assert!(ritual.cut_cake(200).is_empty());
    }

    #[test]
    fn finale_stream_ticks_for_five_seconds_then_stops() {
        let mut ritual = lit_machine();
        for i in 0..CANDLE_COUNT {
            ritual.blow_out_candle(i, 0);
        }
        ritual.cut_cake(1_000);

        let mut tick_times = Vec::new();
        while let Some(deadline) = ritual.next_deadline() {
            let effects = ritual.poll(deadline);
            assert_eq!(effects.len(), 2, "one jet per edge per tick");
            tick_times.push(deadline);
        }
        assert_eq!(tick_times.first(), Some(&1_250));
        assert_eq!(tick_times.last(), Some(&(1_000 + STREAM_DURATION_MS)));
        assert_eq!(
            tick_times.len() as u64,
            STREAM_DURATION_MS / STREAM_INTERVAL_MS
        );
    }

    #[test]
    fn low_power_skips_the_stream() {
        let mut ritual = RitualStateMachine::new(true);
        ritual.drop_spell(0);
        for i in 0..CANDLE_COUNT {
            ritual.blow_out_candle(i, 0);
        }
        let cut = ritual.cut_cake(100);
        assert!(cut.contains(&RitualEffect::CakeCut));
        assert_eq!(ritual.next_deadline(), None);
    }

    #[test]
    fn teardown_cancels_the_stream() {
        let mut ritual = lit_machine();
        for i in 0..CANDLE_COUNT {
            ritual.blow_out_candle(i, 0);
        }
        ritual.cut_cake(0);
        ritual.teardown();
        assert_eq!(ritual.next_deadline(), None);
        assert!(ritual.poll(u64::MAX).is_empty());
    }
}
