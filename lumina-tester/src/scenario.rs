//! Scripted QA scenarios driving the core machines on a virtual clock.

use lumina_story::{
    AchievementGate, AchievementKey, COMPLETION_PAUSE_MS, CANDLE_COUNT, DeployOutcome, GateEffect,
    IMPACT_DELAY_MS, IntroEffect, NavCommand, RitualEffect, RitualStateMachine, SceneSequencer,
    SectionEffect, SectionTracker, SiegeEffect, SiegeStateMachine, StoryContent, TOAST_EXIT_MS,
    TOAST_VISIBLE_MS, VisibilitySample,
};
use serde::Serialize;

/// Outcome of one scripted scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub failures: Vec<String>,
    /// Virtual story time the scenario covered, in milliseconds.
    pub elapsed_virtual_ms: u64,
}

/// Assertion accumulator: scenarios record every check instead of aborting
/// on the first failure, so a report shows the full damage.
struct Checks {
    steps: usize,
    failures: Vec<String>,
    verbose: bool,
}

impl Checks {
    fn new(verbose: bool) -> Self {
        Self {
            steps: 0,
            failures: Vec::new(),
            verbose,
        }
    }

    fn check(&mut self, condition: bool, label: &str) {
        self.steps += 1;
        if condition {
            if self.verbose {
                log::debug!("ok: {label}");
            }
        } else {
            log::warn!("failed: {label}");
            self.failures.push(label.to_string());
        }
    }

    fn finish(self, name: &str, elapsed_virtual_ms: u64) -> ScenarioResult {
        ScenarioResult {
            scenario_name: name.to_string(),
            passed: self.failures.is_empty(),
            steps_run: self.steps,
            failures: self.failures,
            elapsed_virtual_ms,
        }
    }
}

pub const SCENARIOS: [(&str, &str); 5] = [
    ("intro", "Scene progression, gesture gating, single completion"),
    ("siege", "Serialized health decrements and victory sequencing"),
    ("ritual", "Candle gating, cut idempotence, finale stream"),
    ("achievements", "Idempotent unlocks and the single-toast policy"),
    ("full-story", "End-to-end walkthrough across every machine"),
];

#[must_use]
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    SCENARIOS.to_vec()
}

/// Run `name`, or `None` if the catalog does not know it.
#[must_use]
pub fn run_scenario(name: &str, verbose: bool) -> Option<ScenarioResult> {
    match name {
        "intro" => Some(run_intro(verbose)),
        "siege" => Some(run_siege(verbose)),
        "ritual" => Some(run_ritual(verbose)),
        "achievements" => Some(run_achievements(verbose)),
        "full-story" => Some(run_full_story(verbose)),
        _ => None,
    }
}

fn drain_intro(seq: &mut SceneSequencer, until: u64) -> Vec<IntroEffect> {
    let mut all = Vec::new();
    while let Some(deadline) = seq.next_deadline() {
        if deadline > until {
            break;
        }
        all.extend(seq.poll(deadline));
    }
    all
}

fn run_intro(verbose: bool) -> ScenarioResult {
    let mut c = Checks::new(verbose);
    let content = StoryContent::load_from_static();
    let script = match content.scene_script() {
        Ok(script) => script,
        Err(err) => {
            c.check(false, &format!("scene script validates ({err})"));
            return c.finish("intro", 0);
        }
    };
    let total = script.total_duration_ms();
    let mut seq = SceneSequencer::new(script, 0);

    c.check(seq.gesture(10).is_empty(), "gesture before load is ignored");
    seq.asset_loaded(100);
    let start = seq.gesture(1_000);
    c.check(
        start.contains(&IntroEffect::SceneShown(0)),
        "gesture shows the first scene",
    );
    c.check(
        start
            .iter()
            .any(|e| matches!(e, IntroEffect::PlayAudio { .. })),
        "gesture starts the intro track",
    );

    let effects = drain_intro(&mut seq, u64::MAX);
    let shown: Vec<usize> = effects
        .iter()
        .filter_map(|e| match e {
            IntroEffect::SceneShown(i) => Some(*i),
            _ => None,
        })
        .collect();
    c.check(shown == vec![1, 2, 3], "scene indices advance monotonically");

    let completions = effects
        .iter()
        .filter(|e| matches!(e, IntroEffect::IntroComplete))
        .count();
    c.check(completions == 1, "exactly one completion callback");
    c.check(seq.is_completed(), "sequencer ends completed");
    c.check(
        seq.next_deadline().is_none(),
        "no timers outlive completion",
    );

    let end = 1_000 + total + COMPLETION_PAUSE_MS;
    c.finish("intro", end)
}

fn run_siege(verbose: bool) -> ScenarioResult {
    let mut c = Checks::new(verbose);
    let mut siege = SiegeStateMachine::new();

    // Rapid deploys: all three in flight inside one impact window.
    for id in 1..=3 {
        let (outcome, _) = siege.deploy(id, u64::from(id) * 10);
        c.check(outcome == DeployOutcome::Launched, "deploy accepted");
    }
    c.check(
        siege.deploy(2, 40).0 == DeployOutcome::Rejected,
        "re-deploying a seal is rejected",
    );

    let mut healths = Vec::new();
    let mut victories = 0;
    let mut loot = false;
    let mut end = 0;
    while let Some(deadline) = siege.next_deadline() {
        end = deadline;
        for effect in siege.poll(deadline) {
            match effect {
                SiegeEffect::ProjectileImpact { health, .. } => healths.push(health),
                SiegeEffect::Victory => victories += 1,
                SiegeEffect::LootRevealed => loot = true,
                _ => {}
            }
        }
    }

    c.check(healths.len() == 3, "three impacts landed");
    c.check(
        healths.len() == 3
            && (healths[0] - 66.66).abs() < 0.01
            && (healths[1] - 33.32).abs() < 0.01
            && healths[2].abs() < f32::EPSILON,
        "health steps 100 -> 66.66 -> 33.32 -> 0",
    );
    c.check(siege.health() >= 0.0, "health never goes negative");
    c.check(victories == 1, "victory fires exactly once");
    c.check(loot, "loot reveal follows destruction");
    c.check(
        siege.seals().iter().all(|seal| seal.deployed),
        "deployed seals stay deployed",
    );
    c.check(
        siege.deploy(1, end).0 == DeployOutcome::Rejected,
        "deploys after defeat are rejected",
    );

    c.finish("siege", IMPACT_DELAY_MS.max(end))
}

fn run_ritual(verbose: bool) -> ScenarioResult {
    let mut c = Checks::new(verbose);
    let mut ritual = RitualStateMachine::new(false);

    c.check(
        ritual.blow_out_candle(0, 0).is_empty(),
        "candles are inert before the spell",
    );
    c.check(ritual.cut_cake(0).is_empty(), "cut is locked before the spell");

    let landed = ritual.drop_spell(0);
    c.check(
        landed.contains(&RitualEffect::SpellLanded),
        "spell lands on first drop",
    );
    c.check(ritual.drop_spell(5).is_empty(), "second drop is a no-op");

    ritual.blow_out_candle(0, 10);
    c.check(
        ritual.blow_out_candle(0, 20).is_empty(),
        "an unlit candle ignores further blows",
    );
    c.check(ritual.cut_cake(30).is_empty(), "cut stays locked while lit");
    ritual.blow_out_candle(1, 40);
    let last = ritual.blow_out_candle(2, 50);
    c.check(
        last.contains(&RitualEffect::AllCandlesOut),
        "third blow-out reports all candles out",
    );

    let cut = ritual.cut_cake(60);
    c.check(cut.contains(&RitualEffect::CakeCut), "cut succeeds once unlocked");
    c.check(
        cut.iter()
            .filter(|e| matches!(e, RitualEffect::RitualComplete))
            .count()
            == 1,
        "completion fires exactly once",
    );
    c.check(ritual.cut_cake(70).is_empty(), "second cut is a no-op");

    let mut jets = 0;
    let mut end = 60;
    while let Some(deadline) = ritual.next_deadline() {
        end = deadline;
        jets += ritual
            .poll(deadline)
            .iter()
            .filter(|e| matches!(e, RitualEffect::Burst(_)))
            .count();
    }
    c.check(jets == 40, "finale stream emits twenty jet pairs");
    c.check(
        ritual.next_deadline().is_none(),
        "stream stops after its window",
    );

    c.finish("ritual", end)
}

fn run_achievements(verbose: bool) -> ScenarioResult {
    let mut c = Checks::new(verbose);
    let mut gate = AchievementGate::new();

    let first = gate.unlock(AchievementKey::MusicStart, 0);
    c.check(
        first.contains(&GateEffect::Unlocked(AchievementKey::MusicStart)),
        "first unlock is recorded",
    );
    c.check(
        first.contains(&GateEffect::ToastOpened(AchievementKey::MusicStart)),
        "first unlock opens a toast",
    );
    c.check(
        gate.unlock(AchievementKey::MusicStart, 100).is_empty(),
        "duplicate unlock is silent",
    );

    let second = gate.unlock(AchievementKey::Section2, 1_000);
    c.check(
        second.as_slice() == [GateEffect::Unlocked(AchievementKey::Section2)],
        "unlock during a toast records without a second display",
    );

    let exiting = gate.poll(TOAST_VISIBLE_MS);
    c.check(
        exiting.contains(&GateEffect::ToastExiting(AchievementKey::MusicStart)),
        "toast begins its exit on schedule",
    );
    let closed = gate.poll(TOAST_VISIBLE_MS + TOAST_EXIT_MS);
    c.check(
        closed.contains(&GateEffect::ToastClosed(AchievementKey::MusicStart)),
        "toast slot frees after the exit window",
    );

    let third = gate.unlock(AchievementKey::Section3, 10_000);
    c.check(
        third.contains(&GateEffect::ToastOpened(AchievementKey::Section3)),
        "freed slot re-arms for later unlocks",
    );
    c.check(gate.unlocked_count() == 3, "registry counts each key once");

    c.finish("achievements", 10_000 + TOAST_VISIBLE_MS + TOAST_EXIT_MS)
}

fn run_full_story(verbose: bool) -> ScenarioResult {
    let mut c = Checks::new(verbose);
    let content = StoryContent::load_from_static();
    let mut gate = AchievementGate::new();
    let mut tracker = SectionTracker::new();
    let mut t: u64 = 0;

    // Intro.
    let script = match content.scene_script() {
        Ok(script) => script,
        Err(err) => {
            c.check(false, &format!("scene script validates ({err})"));
            return c.finish("full-story", 0);
        }
    };
    let mut seq = SceneSequencer::new(script, t);
    c.check(
        tracker
            .observe(&[VisibilitySample { index: 1, ratio: 0.9 }])
            .is_empty(),
        "visibility input is ignored before chapters mount",
    );
    seq.asset_loaded(t);
    seq.gesture(t);
    let intro_effects = drain_intro(&mut seq, u64::MAX);
    c.check(
        intro_effects.contains(&IntroEffect::IntroComplete),
        "intro completes",
    );
    t += seq.script().total_duration_ms() + COMPLETION_PAUSE_MS;
    tracker.set_chapter_count(3);

    // Chapter 1: the music unlock.
    let music = gate.unlock(AchievementKey::MusicStart, t);
    c.check(
        music.contains(&GateEffect::ToastOpened(AchievementKey::MusicStart)),
        "music achievement toasts",
    );

    // Scroll through the chapters, routing unlocks into the gate.
    for index in [1usize, 2] {
        t += 2_000;
        for effect in tracker.observe(&[VisibilitySample { index, ratio: 0.9 }]) {
            if let SectionEffect::Unlock(key) = effect {
                gate.unlock(key, t);
            }
        }
    }
    c.check(tracker.current() == 2, "tracker follows the scroll");

    // Chapter 2.
    let mut siege = SiegeStateMachine::new();
    for id in 1..=3 {
        siege.deploy(id, t);
    }
    let mut victories = 0;
    while let Some(deadline) = siege.next_deadline() {
        t = deadline;
        victories += siege
            .poll(deadline)
            .iter()
            .filter(|e| matches!(e, SiegeEffect::Victory))
            .count();
    }
    c.check(victories == 1, "siege victory fires once");

    // Chapter 3.
    let mut ritual = RitualStateMachine::new(true);
    ritual.drop_spell(t);
    for i in 0..CANDLE_COUNT {
        ritual.blow_out_candle(i, t);
    }
    let cut = ritual.cut_cake(t);
    c.check(
        cut.contains(&RitualEffect::RitualComplete),
        "ritual completes",
    );
    c.check(
        ritual.next_deadline().is_none(),
        "low-power ritual schedules no stream",
    );
    tracker.show_back_to_top();
    c.check(tracker.back_to_top_visible(), "back-to-top affordance appears");
    let finished = gate.unlock(AchievementKey::BackToTop, t);
    c.check(
        finished.contains(&GateEffect::Unlocked(AchievementKey::BackToTop)),
        "finishing the ritual awards the final achievement",
    );

    // Back to the top.
    c.check(
        tracker.navigate(NavCommand::First).as_slice() == [SectionEffect::ScrollTo(0)],
        "home navigation scrolls to the first chapter",
    );
    c.check(
        gate.unlock(AchievementKey::BackToTop, t).is_empty(),
        "the back-to-top click unlocks nothing further",
    );
    c.check(
        gate.unlocked_count() == AchievementKey::ALL.len(),
        "every achievement unlocks exactly once",
    );
    c.check(
        AchievementKey::ALL
            .into_iter()
            .all(|key| content.achievement(key).is_some()),
        "catalog covers every achievement key",
    );

    c.finish("full-story", t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_and_runner_agree() {
        for (name, _) in list_scenarios() {
            assert!(run_scenario(name, false).is_some(), "missing {name}");
        }
        assert!(run_scenario("nope", false).is_none());
    }

    #[test]
    fn every_scenario_passes() {
        for (name, _) in SCENARIOS {
            let result = run_scenario(name, false).unwrap();
            assert!(
                result.passed,
                "{name} failed: {:?}",
                result.failures
            );
            assert!(result.steps_run > 0);
        }
    }
}
