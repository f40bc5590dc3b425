//! Chapter 2 siege simulation.
//!
//! Deploy three seals to bring the town hall down. Each deployment fires a
//! projectile; the impact lands a fixed delay later and applies its damage
//! against the health at firing time, so rapid consecutive deploys decrement
//! sequentially instead of clobbering each other with stale snapshots.

use crate::fx::BurstSpec;
use crate::timer::TimerQueue;
use smallvec::SmallVec;

pub const SEAL_COUNT: usize = 3;
/// Flight time of a projectile between deploy and impact.
pub const IMPACT_DELAY_MS: u64 = 800;
/// Damage per impact; three impacts floor health at exactly zero.
pub const DAMAGE_PER_IMPACT: f32 = 33.34;
/// Length of the damage-flash side effect.
pub const FLASH_MS: u64 = 200;
/// Pause between health reaching zero and the destruction sequence.
pub const DESTROYED_DELAY_MS: u64 = 500;
/// Offset of the second victory burst.
pub const VICTORY_ECHO_DELAY_MS: u64 = 300;
/// Pause between destruction and the loot reveal.
pub const LOOT_DELAY_MS: u64 = 500;

/// Battle phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiegePhase {
    /// Nothing deployed yet, or projectiles still in flight.
    Idle,
    Engaging,
    Destroyed,
    LootRevealed,
}

/// A deployable unit. Once deployed it never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seal {
    pub id: u8,
    pub deployed: bool,
}

/// A seal in flight. Exists only between deploy and impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projectile {
    pub id: u64,
    pub seal_id: u8,
}

/// Result of a deploy request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    Launched,
    /// That seal is already deployed, or the battle is over. No-op.
    Rejected,
}

#[derive(Debug, Clone, Copy)]
enum SiegeTimer {
    Impact { projectile_id: u64 },
    FlashEnd,
    Destroy,
    VictoryEcho,
    RevealLoot,
}

/// Outward effects of the siege.
#[derive(Debug, Clone, PartialEq)]
pub enum SiegeEffect {
    ProjectileLaunched(Projectile),
    ProjectileImpact { projectile_id: u64, health: f32 },
    FlashStarted,
    FlashEnded,
    /// Fired once, after the first seal deploys.
    Encouragement,
    Burst(BurstSpec),
    /// The town hall fell. Fired exactly once.
    Victory,
    LootRevealed,
}

/// Turn-based siege with projectile timing and victory sequencing.
#[derive(Debug)]
pub struct SiegeStateMachine {
    phase: SiegePhase,
    seals: [Seal; SEAL_COUNT],
    projectiles: SmallVec<[Projectile; SEAL_COUNT]>,
    health: f32,
    flashing: bool,
    encouragement_sent: bool,
    victory_sent: bool,
    next_projectile_id: u64,
    torn_down: bool,
    timers: TimerQueue<SiegeTimer>,
}

impl Default for SiegeStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SiegeStateMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: SiegePhase::Idle,
            seals: [
                Seal { id: 1, deployed: false },
                Seal { id: 2, deployed: false },
                Seal { id: 3, deployed: false },
            ],
            projectiles: SmallVec::new(),
            health: 100.0,
            flashing: false,
            encouragement_sent: false,
            victory_sent: false,
            next_projectile_id: 1,
            torn_down: false,
            timers: TimerQueue::new(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> SiegePhase {
        self.phase
    }

    #[must_use]
    pub fn health(&self) -> f32 {
        self.health
    }

    #[must_use]
    pub fn seals(&self) -> &[Seal; SEAL_COUNT] {
        &self.seals
    }

    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    #[must_use]
    pub fn deployed_count(&self) -> usize {
        self.seals.iter().filter(|s| s.deployed).count()
    }

    #[must_use]
    pub fn is_flashing(&self) -> bool {
        self.flashing
    }

    /// Deploy the seal with `seal_id` (1-based).
    ///
    /// Rejected if that seal is already deployed or health already reached
    /// zero; rejection spawns no projectile and schedules nothing.
    pub fn deploy(
        &mut self,
        seal_id: u8,
        now: u64,
    ) -> (DeployOutcome, SmallVec<[SiegeEffect; 2]>) {
        let mut out = SmallVec::new();
        if self.torn_down || self.health <= 0.0 {
            return (DeployOutcome::Rejected, out);
        }
        let Some(seal) = self.seals.iter_mut().find(|s| s.id == seal_id) else {
            return (DeployOutcome::Rejected, out);
        };
        if seal.deployed {
            return (DeployOutcome::Rejected, out);
        }
        seal.deployed = true;
        self.phase = SiegePhase::Engaging;

        let projectile = Projectile {
            id: self.next_projectile_id,
            seal_id,
        };
        self.next_projectile_id += 1;
        self.projectiles.push(projectile);
        self.timers.schedule(
            now,
            IMPACT_DELAY_MS,
            SiegeTimer::Impact {
                projectile_id: projectile.id,
            },
        );
        log::debug!("seal {seal_id} deployed, projectile {} in flight", projectile.id);
        out.push(SiegeEffect::ProjectileLaunched(projectile));

        if !self.encouragement_sent && self.deployed_count() == 1 {
            self.encouragement_sent = true;
            out.push(SiegeEffect::Encouragement);
        }
        (DeployOutcome::Launched, out)
    }

    /// Fire all due timers in FIFO order.
    pub fn poll(&mut self, now: u64) -> SmallVec<[SiegeEffect; 4]> {
        let mut out = SmallVec::new();
        if self.torn_down {
            return out;
        }
        while let Some(timer) = self.timers.pop_due(now) {
            match timer {
                SiegeTimer::Impact { projectile_id } => {
                    self.projectiles.retain(|p| p.id != projectile_id);
                    // Read-modify-write against current health, in firing
                    // order; never against a deploy-time snapshot.
                    self.health = (self.health - DAMAGE_PER_IMPACT).max(0.0);
                    if self.health < 0.005 {
                        self.health = 0.0;
                    }
                    self.flashing = true;
                    self.timers.schedule(now, FLASH_MS, SiegeTimer::FlashEnd);
                    out.push(SiegeEffect::ProjectileImpact {
                        projectile_id,
                        health: self.health,
                    });
                    out.push(SiegeEffect::FlashStarted);
                    log::debug!("impact {projectile_id}, health {:.2}", self.health);
                    if self.health <= 0.0 {
                        self.timers.schedule(now, DESTROYED_DELAY_MS, SiegeTimer::Destroy);
                    }
                }
                SiegeTimer::FlashEnd => {
                    if self.flashing {
                        self.flashing = false;
                        out.push(SiegeEffect::FlashEnded);
                    }
                }
                SiegeTimer::Destroy => {
                    if self.victory_sent {
                        continue;
                    }
                    self.victory_sent = true;
                    self.phase = SiegePhase::Destroyed;
                    out.push(SiegeEffect::Burst(BurstSpec::siege_victory()));
                    out.push(SiegeEffect::Victory);
                    self.timers
                        .schedule(now, VICTORY_ECHO_DELAY_MS, SiegeTimer::VictoryEcho);
                    self.timers.schedule(now, LOOT_DELAY_MS, SiegeTimer::RevealLoot);
                    log::info!("town hall destroyed");
                }
                SiegeTimer::VictoryEcho => {
                    out.push(SiegeEffect::Burst(BurstSpec::siege_victory_echo()));
                }
                SiegeTimer::RevealLoot => {
                    if self.phase == SiegePhase::Destroyed {
                        self.phase = SiegePhase::LootRevealed;
                        out.push(SiegeEffect::LootRevealed);
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

    /// Cancel all pending timers; nothing fires after this.
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.timers.clear();
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn impacts(effects: &[SiegeEffect]) -> Vec<f32> {
        effects
            .iter()
            .filter_map(|e| match e {
                SiegeEffect::ProjectileImpact { health, .. } => Some(*health),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sequential_deploys_step_health_down_to_zero() {
        let mut siege = SiegeStateMachine::new();
        let mut t = 0;
        let mut healths = Vec::new();
        for id in 1..=3 {
            let (outcome, _) = siege.deploy(id, t);
            assert_eq!(outcome, DeployOutcome::Launched);
            t += IMPACT_DELAY_MS;
            healths.extend(impacts(&siege.poll(t)));
        }
        assert_eq!(healths.len(), 3);
        assert!((healths[0] - 66.66).abs() < 0.01);
        assert!((healths[1] - 33.32).abs() < 0.01);
        assert!(healths[2].abs() < f32::EPSILON);
        assert!(siege.health() >= 0.0);
    }

    #[test]
    fn rapid_deploys_serialize_their_decrements() {
        let mut siege = SiegeStateMachine::new();
        siege.deploy(1, 0);
        siege.deploy(2, 10);
        siege.deploy(3, 20);
        // All three impacts land inside one poll window; decrements must
        // still be sequential, not three copies of 100 - 33.34.
        let healths = impacts(&siege.poll(IMPACT_DELAY_MS + 20));
        assert_eq!(healths.len(), 3);
        assert!((healths[0] - 66.66).abs() < 0.01);
        assert!((healths[1] - 33.32).abs() < 0.01);
        assert!(healths[2].abs() < f32::EPSILON);
    }

    #[test]
    fn redeploying_a_seal_is_rejected_without_side_effects() {
        let mut siege = SiegeStateMachine::new();
        siege.deploy(2, 0);
        let (outcome, effects) = siege.deploy(2, 5);
        assert_eq!(outcome, DeployOutcome::Rejected);
        assert!(effects.is_empty());
        assert_eq!(siege.projectiles().len(), 1);

        let healths = impacts(&siege.poll(IMPACT_DELAY_MS + 5));
        assert_eq!(healths.len(), 1);
    }

    #[test]
    fn unknown_seal_id_is_rejected() {
        let mut siege = SiegeStateMachine::new();
        let (outcome, _) = siege.deploy(7, 0);
        assert_eq!(outcome, DeployOutcome::Rejected);
    }

    #[test]
    fn encouragement_fires_once_after_first_deploy_only() {
        let mut siege = SiegeStateMachine::new();
        let (_, first) = siege.deploy(1, 0);
        assert!(first.contains(&SiegeEffect::Encouragement));
        let (_, second) = siege.deploy(2, 10);
        assert!(!second.contains(&SiegeEffect::Encouragement));
    }

    #[test]
    fn victory_sequence_runs_destroyed_then_loot() {
        let mut siege = SiegeStateMachine::new();
        for id in 1..=3 {
            siege.deploy(id, 0);
        }
        let at_impact = siege.poll(IMPACT_DELAY_MS);
        assert!(!at_impact.contains(&SiegeEffect::Victory));
        assert_eq!(siege.phase(), SiegePhase::Engaging);

        let destroyed = siege.poll(IMPACT_DELAY_MS + DESTROYED_DELAY_MS);
        assert!(destroyed.contains(&SiegeEffect::Victory));
        assert!(destroyed.contains(&SiegeEffect::Burst(BurstSpec::siege_victory())));
        assert_eq!(siege.phase(), SiegePhase::Destroyed);

        let echo = siege.poll(IMPACT_DELAY_MS + DESTROYED_DELAY_MS + VICTORY_ECHO_DELAY_MS);
        assert!(echo.contains(&SiegeEffect::Burst(BurstSpec::siege_victory_echo())));

        let loot = siege.poll(IMPACT_DELAY_MS + DESTROYED_DELAY_MS + LOOT_DELAY_MS);
        assert!(loot.contains(&SiegeEffect::LootRevealed));
        assert_eq!(siege.phase(), SiegePhase::LootRevealed);
    }

    #[test]
    fn victory_fires_exactly_once() {
        let mut siege = SiegeStateMachine::new();
        for id in 1..=3 {
            siege.deploy(id, 0);
        }
        let all = siege.poll(u64::MAX);
        let victories = all
            .iter()
            .filter(|e| matches!(e, SiegeEffect::Victory))
            .count();
        assert_eq!(victories, 1);
    }

    #[test]
    fn deploy_after_defeat_is_rejected() {
        let mut siege = SiegeStateMachine::new();
        for id in 1..=3 {
            siege.deploy(id, 0);
        }
        siege.poll(u64::MAX);
        // All seals deployed; also verify the health guard path directly.
        assert_eq!(siege.deploy(1, 0).0, DeployOutcome::Rejected);
        assert!((siege.health()).abs() < f32::EPSILON);
    }

    #[test]
    fn teardown_silences_in_flight_projectiles() {
        let mut siege = SiegeStateMachine::new();
        siege.deploy(1, 0);
        siege.teardown();
        assert!(siege.poll(u64::MAX).is_empty());
        assert_eq!(siege.next_deadline(), None);
        assert!((siege.health() - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn projectile_ids_are_unique_under_same_instant_deploys() {
        let mut siege = SiegeStateMachine::new();
        siege.deploy(1, 0);
        siege.deploy(2, 0);
        siege.deploy(3, 0);
        let mut ids: Vec<u64> = siege.projectiles().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
