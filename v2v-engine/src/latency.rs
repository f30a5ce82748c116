// latency.rs
// Latency models for the signaling round trip that negotiates a single transfer.

use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Latency model for simulated V2V signaling.
pub trait LatencyModel {
    /// Round-trip delay in milliseconds for negotiating one pair.
    fn sample_ms(&self, rng: &mut StdRng) -> f64;
}

/// Parameters of the cellular link, for both the fast and the slow network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkLatency {
    pub fast_base_ms: f64,
    pub slow_base_ms: f64,
    pub jitter_sd_ms: f64,
    pub floor_ms: f64,
}

impl Default for NetworkLatency {
    fn default() -> Self {
        Self {
            fast_base_ms: 30.0,
            slow_base_ms: 80.0,
            jitter_sd_ms: 15.0,
            floor_ms: 5.0,
        }
    }
}

impl NetworkLatency {
    /// Resolve the parameters into a sampler for the chosen network.
    pub fn for_mode(&self, fast_mode: bool) -> SimResult<GaussianLatency> {
        let base_ms = if fast_mode { self.fast_base_ms } else { self.slow_base_ms };
        GaussianLatency::new(base_ms, self.jitter_sd_ms, self.floor_ms)
    }
}

/// Constant base delay plus zero-mean Gaussian jitter, floored at a positive minimum.
#[derive(Debug, Clone)]
pub struct GaussianLatency {
    base_ms: f64,
    floor_ms: f64,
    jitter: Normal<f64>,
}

impl GaussianLatency {
    /// `Normal::new` accepts a negative std dev, so the sign is checked here.
    pub fn new(base_ms: f64, jitter_sd_ms: f64, floor_ms: f64) -> SimResult<Self> {
        if !base_ms.is_finite() {
            return Err(SimError::InvalidConfig(format!("latency base {} is not finite", base_ms)));
        }
        if !(jitter_sd_ms.is_finite() && jitter_sd_ms >= 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "latency jitter sd {} must be finite and >= 0",
                jitter_sd_ms
            )));
        }
        if !(floor_ms.is_finite() && floor_ms > 0.0) {
            return Err(SimError::InvalidConfig(format!("latency floor {} must be > 0", floor_ms)));
        }
        Ok(Self {
            base_ms,
            floor_ms,
            jitter: Normal::new(0.0, jitter_sd_ms)?,
        })
    }
}

impl LatencyModel for GaussianLatency {
    fn sample_ms(&self, rng: &mut StdRng) -> f64 {
        let jitter = self.jitter.sample(rng);
        (self.base_ms + jitter).max(self.floor_ms)
    }
}

/// Fixed delay for every pair. Draws nothing from the rng.
pub struct FixedLatency {
    delay_ms: f64,
}

impl FixedLatency {
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms }
    }
}

impl LatencyModel for FixedLatency {
    fn sample_ms(&self, _rng: &mut StdRng) -> f64 {
        self.delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_fast_network_is_faster_on_average() {
        let params = NetworkLatency::default();
        let fast = params.for_mode(true).unwrap();
        let slow = params.for_mode(false).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let n = 2000;
        let fast_mean: f64 = (0..n).map(|_| fast.sample_ms(&mut rng)).sum::<f64>() / n as f64;
        let slow_mean: f64 = (0..n).map(|_| slow.sample_ms(&mut rng)).sum::<f64>() / n as f64;

        assert!(fast_mean < slow_mean);
        assert!((slow_mean - 80.0).abs() < 3.0, "slow mean {}", slow_mean);
    }

    #[test]
    fn test_latency_floor() {
        let model = GaussianLatency::new(0.0, 15.0, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            assert!(model.sample_ms(&mut rng) >= 5.0);
        }
    }

    #[test]
    fn test_zero_jitter_is_base() {
        let model = GaussianLatency::new(30.0, 0.0, 5.0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(model.sample_ms(&mut rng), 30.0);
    }

    #[test]
    fn test_negative_jitter_sd_rejected() {
        assert!(matches!(
            GaussianLatency::new(30.0, -1.0, 5.0),
            Err(SimError::InvalidConfig(_))
        ));
        assert!(GaussianLatency::new(30.0, f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_non_positive_floor_rejected() {
        assert!(GaussianLatency::new(30.0, 15.0, 0.0).is_err());
        assert!(GaussianLatency::new(30.0, 15.0, -100.0).is_err());
        assert!(GaussianLatency::new(f64::INFINITY, 15.0, 5.0).is_err());

        let mut params = NetworkLatency::default();
        params.floor_ms = -100.0;
        assert!(params.for_mode(true).is_err());
    }

    #[test]
    fn test_fixed_latency() {
        let model = FixedLatency::new(12.5);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(model.sample_ms(&mut rng), 12.5);
    }
}
