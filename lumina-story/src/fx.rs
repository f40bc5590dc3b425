//! Particle-burst invocation contract.
//!
//! State machines describe the bursts they want as data; the hosting layer
//! forwards each [`BurstSpec`] to its particle collaborator (the web front end
//! hands them to `canvas-confetti`) and never reports anything back.

use serde::Serialize;

/// Normalized launch origin, both axes in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Origin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
}

impl Origin {
    #[must_use]
    pub const fn at_y(y: f32) -> Self {
        Self { x: None, y: Some(y) }
    }

    #[must_use]
    pub const fn at_x(x: f32) -> Self {
        Self { x: Some(x), y: None }
    }
}

/// One fire-and-forget particle burst.
///
/// Field names serialize in the collaborator's camelCase vocabulary so the
/// spec can be passed through `serde-wasm-bindgen` unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurstSpec {
    pub particle_count: u32,
    pub spread: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    pub origin: Origin,
    pub colors: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scalar: Option<f32>,
}

impl BurstSpec {
    /// Siege victory: the big star burst fired when the town hall falls.
    #[must_use]
    pub fn siege_victory() -> Self {
        Self {
            particle_count: 200,
            spread: 100.0,
            angle: None,
            origin: Origin::at_y(0.5),
            colors: vec!["#ffd700", "#a855f7", "#22c55e"],
            shapes: Some(vec!["star", "circle"]),
            scalar: Some(1.5),
        }
    }

    /// Siege victory follow-up, fired 300 ms after the first burst.
    #[must_use]
    pub fn siege_victory_echo() -> Self {
        Self {
            particle_count: 150,
            spread: 80.0,
            angle: None,
            origin: Origin::at_y(0.6),
            colors: vec!["#ffd700", "#a855f7", "#22c55e"],
            shapes: None,
            scalar: None,
        }
    }

    /// Record spin-up burst in chapter 1.
    #[must_use]
    pub fn music_start(low_power: bool) -> Self {
        Self {
            particle_count: if low_power { 40 } else { 100 },
            spread: 70.0,
            angle: None,
            origin: Origin::at_y(0.6),
            colors: vec!["#3b82f6", "#8b5cf6", "#22d3ee"],
            shapes: Some(vec!["circle"]),
            scalar: Some(1.2),
        }
    }

    /// Spell landing on the cake.
    #[must_use]
    pub fn spell_drop(low_power: bool) -> Self {
        Self {
            particle_count: if low_power { 40 } else { 100 },
            spread: 70.0,
            angle: None,
            origin: Origin::at_y(0.6),
            colors: vec!["#a855f7", "#ec4899", "#f97316"],
            shapes: None,
            scalar: None,
        }
    }

    /// Small puff when a candle goes out.
    #[must_use]
    pub fn candle_puff(low_power: bool) -> Self {
        Self {
            particle_count: if low_power { 12 } else { 30 },
            spread: 50.0,
            angle: None,
            origin: Origin::at_y(0.5),
            colors: vec!["#60a5fa", "#93c5fd", "#dbeafe"],
            shapes: Some(vec!["circle"]),
            scalar: Some(0.8),
        }
    }

    /// Cake-cut finale burst.
    #[must_use]
    pub fn cake_finale(low_power: bool) -> Self {
        Self {
            particle_count: if low_power { 60 } else { 200 },
            spread: 100.0,
            angle: None,
            origin: Origin::at_y(0.5),
            colors: vec!["#ffd700", "#a855f7", "#22c55e", "#ec4899"],
            shapes: Some(vec!["star", "circle"]),
            scalar: Some(if low_power { 1.0 } else { 1.5 }),
        }
    }

    /// One side jet of the finale stream. `from_left` picks the screen edge.
    #[must_use]
    pub fn finale_stream(from_left: bool) -> Self {
        Self {
            particle_count: 3,
            spread: 55.0,
            angle: Some(if from_left { 60.0 } else { 120.0 }),
            origin: if from_left {
                Origin::at_x(0.0)
            } else {
                Origin::at_x(1.0)
            },
            colors: vec!["#a855f7", "#ec4899", "#fde047"],
            shapes: None,
            scalar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_serializes_into_collaborator_vocabulary() {
        let json = serde_json::to_value(BurstSpec::siege_victory()).unwrap();
        assert_eq!(json["particleCount"], 200);
        assert_eq!(json["origin"]["y"], 0.5);
        assert!(json.get("angle").is_none());
        assert_eq!(json["shapes"][0], "star");
    }

    #[test]
    fn low_power_presets_shrink() {
        assert!(
            BurstSpec::cake_finale(true).particle_count
                < BurstSpec::cake_finale(false).particle_count
        );
        assert_eq!(BurstSpec::candle_puff(true).particle_count, 12);
    }

    #[test]
    fn stream_jets_aim_inward_from_both_edges() {
        let left = BurstSpec::finale_stream(true);
        let right = BurstSpec::finale_stream(false);
        assert_eq!(left.origin.x, Some(0.0));
        assert_eq!(right.origin.x, Some(1.0));
        assert_eq!(left.angle, Some(60.0));
        assert_eq!(right.angle, Some(120.0));
    }
}
