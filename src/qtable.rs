//! Sparse action-value table and the epsilon-greedy policy over it.

use ahash::AHashMap;
use rand::Rng;
use rand::rngs::SmallRng;

pub const NUM_ACTIONS: usize = 4;

/// Packed state key -> one value per action, created lazily at zero. Grows
/// unbounded for the lifetime of a run.
#[derive(Default)]
pub struct QTable {
    entries: AHashMap<u64, [f32; NUM_ACTIONS]>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values_mut(&mut self, key: u64) -> &mut [f32; NUM_ACTIONS] {
        self.entries.entry(key).or_insert([0.0; NUM_ACTIONS])
    }

    /// Read without inserting; unseen states are all zeros.
    pub fn values(&self, key: u64) -> [f32; NUM_ACTIONS] {
        self.entries.get(&key).copied().unwrap_or([0.0; NUM_ACTIONS])
    }

    pub fn max_value(&self, key: u64) -> f32 {
        let q = self.values(key);
        q[0].max(q[1]).max(q[2]).max(q[3])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Epsilon-greedy: below epsilon a uniform action, otherwise the argmax
    /// with ties broken at random.
    pub fn choose_action(&mut self, key: u64, epsilon: f32, rng: &mut SmallRng) -> usize {
        if rng.gen_range(0.0..1.0f32) < epsilon {
            return rng.gen_range(0..NUM_ACTIONS);
        }
        let q = *self.values_mut(key);
        argmax_random_tie(&q, rng)
    }
}

/// Index of the maximum value; when several actions tie, one of them is
/// picked uniformly so exploration is not biased toward low indices.
pub fn argmax_random_tie(q: &[f32; NUM_ACTIONS], rng: &mut SmallRng) -> usize {
    let mut best = vec![0];
    for i in 1..NUM_ACTIONS {
        if q[i] > q[best[0]] {
            best.clear();
            best.push(i);
        } else if q[i] == q[best[0]] {
            best.push(i);
        }
    }
    if best.len() == 1 {
        best[0]
    } else {
        best[rng.gen_range(0..best.len())]
    }
}
