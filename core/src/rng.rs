//! Deterministic random number generation for soak runs.
//!
//! RULE: Nothing here may call a platform RNG. Every stream is derived from
//! one master seed, so a failing soak run replays exactly from its seed.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

pub struct SimRng {
    inner: Pcg64Mcg,
}

impl SimRng {
    /// Derive a stream from the master seed and a stable stream index.
    pub fn new(master_seed: u64, stream: u64) -> Self {
        let derived_seed = master_seed ^ (stream.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an i64 in [lo, hi].
    pub fn range_i64(&mut self, lo: i64, hi: i64) -> i64 {
        assert!(lo <= hi, "empty range");
        lo + self.next_u64_below((hi - lo) as u64 + 1) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_u64_below(items.len() as u64) as usize)
    }
}
