// src/alignment.rs
// Coupling quality between two vehicles' charging pads.
// Each physical dimension degrades the score independently (multiplicative model).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentModel {
    /// Score of a perfectly aligned pair.
    pub base_score: f64,
    /// Gaps below this are treated as too close to couple.
    pub min_gap_m: f64,
    /// Factor applied when the gap is outside `[min_gap_m, max_range]`.
    pub out_of_range_penalty: f64,
    /// Spread of the Gaussian falloff around the middle of the range.
    pub gap_sd_m: f64,
    /// Spread of the Gaussian falloff on lane misalignment.
    pub lateral_sd_m: f64,
    /// Relative speed (km/h) at which the score decays by a factor of e.
    pub speed_decay_kmh: f64,
}

impl Default for AlignmentModel {
    fn default() -> Self {
        Self {
            base_score: 0.95,
            min_gap_m: 0.1,
            out_of_range_penalty: 0.2,
            gap_sd_m: 0.8,
            lateral_sd_m: 0.15,
            speed_decay_kmh: 50.0,
        }
    }
}

impl AlignmentModel {
    /// Score in `[0, 1]`. Coupling is best at mid-range, centred in the lane,
    /// at matched speeds.
    pub fn score(&self, distance_gap: f64, lateral_offset: f64, relative_speed_diff: f64, max_range: f64) -> f64 {
        let mut score = self.base_score;

        if distance_gap < self.min_gap_m || distance_gap > max_range {
            score *= self.out_of_range_penalty;
        } else {
            score *= gaussian(distance_gap - max_range / 2.0, self.gap_sd_m);
        }

        score *= gaussian(lateral_offset, self.lateral_sd_m);
        score *= (-relative_speed_diff.abs() / self.speed_decay_kmh).exp();

        if score.is_nan() {
            return 0.0;
        }
        score.clamp(0.0, 1.0)
    }
}

/// Unnormalised Gaussian kernel `exp(-x^2 / 2sd^2)`.
fn gaussian(x: f64, sd: f64) -> f64 {
    (-(x * x) / (2.0 * sd * sd)).exp()
}
