use serde::{Deserialize, Serialize};

/// Engine configuration. Every section falls back to its defaults, so a
/// JSON document only needs the keys it wants to override.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub recognition: RecognitionConfig,
    pub features: FeatureConfig,
    pub effects: EffectRules,
    pub battle: BattleConfig,
}

impl EngineConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Tunables for the geometric template recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Points every gesture and template is resampled to.
    pub resample_points: usize,
    /// Side of the reference square (world units).
    pub square_size: f32,
    /// Half-width of the rotation search window (radians).
    pub angle_range: f32,
    /// Bracket width at which the rotation search stops (radians).
    pub angle_precision: f32,
    /// Matches at or above this mean distance are rejected.
    pub match_threshold: f32,
    /// Above this many strokes only the drawn order and its reversal are tried.
    pub max_permuted_strokes: usize,
    /// Minimum number of captured points for a gesture to be considered.
    pub min_points: usize,
    /// Minimum total path length, as a fraction of `square_size`.
    pub min_length_ratio: f32,
    /// Accepted bounding-box aspect ratio (width / height).
    pub min_aspect: f32,
    pub max_aspect: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            resample_points: 96,
            square_size: 250.0,
            angle_range: std::f32::consts::FRAC_PI_2,
            angle_precision: 2f32.to_radians(),
            match_threshold: 60.0,
            max_permuted_strokes: 4,
            min_points: 8,
            min_length_ratio: 0.25,
            min_aspect: 0.2,
            max_aspect: 5.0,
        }
    }
}

/// Tunables for the learned-model feature pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Rows of the `[1, max_points, 4]` input tensor.
    pub max_points: usize,
    /// Deltas with a smaller `(dx, dy)` magnitude are dropped as pen noise.
    pub motion_epsilon: f32,
    /// Added to each channel's standard deviation before dividing.
    pub std_floor: f32,
    /// Softmax probability below which the oracle's answer is rejected.
    pub min_confidence: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_points: 100,
            motion_epsilon: 1e-5,
            std_floor: 1e-6,
            min_confidence: 0.5,
        }
    }
}

/// Stacking and reversion constants for the effect engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectRules {
    /// Added to `potency_bonus` every time an active effect is re-applied.
    pub stack_potency_increment: i32,
    /// Defense handed back when ENRAGED expires. Not tied to what the
    /// buff actually took away.
    pub enraged_defense_restore: i32,
}

impl Default for EffectRules {
    fn default() -> Self {
        Self {
            stack_potency_increment: 1,
            enraged_defense_restore: 1,
        }
    }
}

/// Battle clock, input timing and rewards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seconds between effect ticks.
    pub tick_interval: f32,
    /// Seconds without a new stroke before the pending gesture fizzles.
    pub stroke_timeout: f32,
    /// Max gap between two taps for a double tap (milliseconds, point time).
    pub double_tap_window_ms: f32,
    /// Max travel (world units) for a stroke to count as a tap.
    pub tap_radius: f32,
    /// Experience granted for a victory.
    pub victory_xp: u32,
    /// Seed for the randomized effect behaviors.
    pub seed: u64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            tick_interval: 2.0,
            stroke_timeout: 3.0,
            double_tap_window_ms: 300.0,
            tap_radius: 12.0,
            victory_xp: 50,
            seed: 42,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.recognition.resample_points, 96);
        assert_eq!(config.features.max_points, 100);
        assert_eq!(config.battle.tick_interval, 2.0);
    }

    #[test]
    fn partial_override() {
        let json = r#"{
            "recognition": { "match_threshold": 45.0 },
            "effects": { "enraged_defense_restore": 0 },
            "battle": { "victory_xp": 120 }
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.recognition.match_threshold, 45.0);
        assert_eq!(config.recognition.square_size, 250.0);
        assert_eq!(config.effects.enraged_defense_restore, 0);
        assert_eq!(config.effects.stack_potency_increment, 1);
        assert_eq!(config.battle.victory_xp, 120);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(EngineConfig::from_json("{ \"battle\": 3 }").is_err());
    }
}
