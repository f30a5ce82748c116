//! Epsilon-greedy price selection over a fixed price ladder.
//!
//! Each agent keeps one learned value per ladder price. With probability
//! `exploration_rate` the agent picks a ladder price uniformly at random,
//! otherwise it picks uniformly among the prices holding the maximum value.
//!
//! Values start at zero and are only updated through [`PriceMemory::reinforce`],
//! which the matching engine calls when price feedback is enabled. Without
//! feedback every value stays zero, so exploitation is a uniform choice over
//! the whole ladder.

use rand::rngs::StdRng;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceMemory {
    values: Vec<f64>,
}

impl PriceMemory {
    /// Zeroed memory for a ladder of `len` prices.
    pub fn new(len: usize) -> Self {
        Self { values: vec![0.0; len] }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Ladder indices holding the maximum value, in ladder order.
    pub fn best_indices(&self) -> Vec<usize> {
        let best = self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == best)
            .map(|(i, _)| i)
            .collect()
    }

    /// Move the value of `index` towards `reward` by `learning_rate`.
    pub fn reinforce(&mut self, index: usize, reward: f64, learning_rate: f64) {
        if let Some(v) = self.values.get_mut(index) {
            *v += learning_rate * (reward - *v);
        }
    }
}

/// Pick a ladder index. Consumes exactly two draws from `rng`: the exploration
/// coin, then the index among either the full ladder or the tie set.
pub fn choose_price_index(memory: &PriceMemory, exploration_rate: f64, rng: &mut StdRng) -> usize {
    let explore = rng.gen::<f64>() < exploration_rate;
    if explore || memory.is_empty() {
        return rng.gen_range(0..memory.len().max(1));
    }

    let candidates = memory.best_indices();
    candidates[rng.gen_range(0..candidates.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_zero_memory_ties_everything() {
        let memory = PriceMemory::new(6);
        assert_eq!(memory.best_indices(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_choice_always_in_ladder() {
        let memory = PriceMemory::new(6);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(choose_price_index(&memory, 0.15, &mut rng) < 6);
        }
    }

    #[test]
    fn test_untrained_policy_covers_whole_ladder() {
        let memory = PriceMemory::new(6);
        let mut rng = StdRng::seed_from_u64(9);
        let mut seen = [false; 6];
        for _ in 0..500 {
            seen[choose_price_index(&memory, 0.0, &mut rng)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_pure_exploitation_follows_memory() {
        let mut memory = PriceMemory::new(6);
        memory.reinforce(3, 10.0, 0.5);
        assert_eq!(memory.values()[3], 5.0);
        assert_eq!(memory.best_indices(), vec![3]);

        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(choose_price_index(&memory, 0.0, &mut rng), 3);
        }
    }

    #[test]
    fn test_reinforce_out_of_ladder_is_ignored() {
        let mut memory = PriceMemory::new(2);
        memory.reinforce(7, 1.0, 1.0);
        assert_eq!(memory.values(), &[0.0, 0.0]);
    }
}
