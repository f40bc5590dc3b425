//! Bridges the core's virtual-time machines onto real browser timers.
//!
//! The machines never sleep on their own; a host arms one timeout for the
//! machine's next deadline, polls it when the timeout lands, dispatches the
//! effects, and re-arms. Arming is guarded by a liveness flag so that a
//! component teardown silences every timer chain it started.

use gloo::timers::future::TimeoutFuture;
use lumina_story::{
    AchievementGate, GateEffect, IntroEffect, RitualEffect, RitualStateMachine, SceneSequencer,
    SiegeEffect, SiegeStateMachine,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::Callback;

/// Current story time in milliseconds.
#[must_use]
pub fn now_ms() -> u64 {
    let millis = js_sys::Date::now();
    if millis.is_sign_negative() {
        0
    } else {
        // Date.now() stays far below 2^53; the cast is lossless in practice.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            millis as u64
        }
    }
}

/// Shared teardown flag for one component's timer chains.
#[derive(Debug, Clone, Default)]
pub struct Liveness(Rc<Cell<bool>>);

impl Liveness {
    #[must_use]
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(true)))
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.0.get()
    }

    /// Mark the owner as unmounted; armed timers become no-ops on wake.
    pub fn kill(&self) {
        self.0.set(false);
    }
}

/// A machine the driver can wake on a deadline.
pub trait Driven {
    type Effect;
    fn next_deadline(&self) -> Option<u64>;
    fn poll_effects(&mut self, now: u64) -> Vec<Self::Effect>;
}

impl Driven for SceneSequencer {
    type Effect = IntroEffect;
    fn next_deadline(&self) -> Option<u64> {
        self.next_deadline()
    }
    fn poll_effects(&mut self, now: u64) -> Vec<IntroEffect> {
        self.poll(now).into_vec()
    }
}

impl Driven for AchievementGate {
    type Effect = GateEffect;
    fn next_deadline(&self) -> Option<u64> {
        self.next_deadline()
    }
    fn poll_effects(&mut self, now: u64) -> Vec<GateEffect> {
        self.poll(now).into_vec()
    }
}

impl Driven for SiegeStateMachine {
    type Effect = SiegeEffect;
    fn next_deadline(&self) -> Option<u64> {
        self.next_deadline()
    }
    fn poll_effects(&mut self, now: u64) -> Vec<SiegeEffect> {
        self.poll(now).into_vec()
    }
}

impl Driven for RitualStateMachine {
    type Effect = RitualEffect;
    fn next_deadline(&self) -> Option<u64> {
        self.next_deadline()
    }
    fn poll_effects(&mut self, now: u64) -> Vec<RitualEffect> {
        self.poll(now).into_vec()
    }
}

/// Arm one timeout for the machine's next deadline, if it has one.
///
/// Call after every mutation. A wake that finds nothing due is a harmless
/// empty poll; a wake after [`Liveness::kill`] does nothing at all.
pub fn arm<M>(machine: &Rc<RefCell<M>>, live: &Liveness, on_effects: &Callback<Vec<M::Effect>>)
where
    M: Driven + 'static,
{
    let Some(deadline) = machine.borrow().next_deadline() else {
        return;
    };
    let delay = u32::try_from(deadline.saturating_sub(now_ms())).unwrap_or(u32::MAX);

    let machine = machine.clone();
    let live = live.clone();
    let on_effects = on_effects.clone();
    spawn_local(async move {
        TimeoutFuture::new(delay).await;
        if !live.is_live() {
            return;
        }
        let effects = machine.borrow_mut().poll_effects(now_ms());
        if !effects.is_empty() {
            on_effects.emit(effects);
        }
        arm(&machine, &live, &on_effects);
    });
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn killed_liveness_reports_dead() {
        let live = Liveness::new();
        assert!(live.is_live());
        let clone = live.clone();
        clone.kill();
        assert!(!live.is_live());
    }

    #[test]
    fn driven_machines_surface_their_deadlines() {
        let seq = SceneSequencer::new(
            lumina_story::StoryContent::load_from_static()
                .scene_script()
                .unwrap(),
            0,
        );
        assert_eq!(Driven::next_deadline(&seq), Some(lumina_story::ASSET_WAIT_MS));
    }
}
