//! Seeded, platform-independent permutation of the target pool.
//!
//! The permutation depends only on the seed string and the input order, so
//! every process that loads the same word list derives the same daily
//! answers.

use sha2::{Digest, Sha256};

/// Small deterministic PRNG (xoroshiro128+ seeded through SplitMix64).
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: [u64; 2],
}

impl SeededRng {
    /// Creates a generator from a 64-bit seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let a = splitmix64(&mut s);
        let b = splitmix64(&mut s);
        let state = if a == 0 && b == 0 { [1, 1] } else { [a, b] };
        Self { state }
    }

    /// Creates a generator from an arbitrary string key.
    ///
    /// The key is hashed with SHA-256 and the first eight bytes, read
    /// little-endian, become the seed.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        let digest = Sha256::digest(key.as_bytes());
        let mut seed = [0_u8; 8];
        for (dst, src) in seed.iter_mut().zip(digest.iter()) {
            *dst = *src;
        }
        Self::new(u64::from_le_bytes(seed))
    }

    /// Returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        let [s0, mut s1] = self.state;
        let result = s0.wrapping_add(s1);
        s1 ^= s0;
        self.state = [s0.rotate_left(24) ^ s1 ^ (s1 << 16), s1.rotate_left(37)];
        result
    }

    /// Returns a uniformly distributed value in `0..bound`; zero when
    /// `bound` is zero.
    ///
    /// Draws below `2^64 mod bound` are rejected so that every residue is
    /// equally likely.
    #[allow(clippy::cast_possible_truncation)]
    pub fn below(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        let bound = bound as u64;
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return (x % bound) as usize;
            }
        }
    }

    /// Fisher-Yates shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.below(i + 1);
            items.swap(i, j);
        }
    }
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Returns `items` permuted by a generator seeded from `key`.
#[must_use]
pub fn shuffled_with_key(items: &[String], key: &str) -> Vec<String> {
    let mut out = items.to_vec();
    SeededRng::from_key(key).shuffle(&mut out);
    out
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn words(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("w{i:03}")).collect()
    }

    #[test]
    fn same_key_same_sequence() {
        let mut a = SeededRng::from_key("ferdle-en-5");
        let mut b = SeededRng::from_key("ferdle-en-5");
        for _ in 0..500 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_keys_diverge() {
        let mut a = SeededRng::from_key("ferdle-en-5");
        let mut b = SeededRng::from_key("ferdle-ru-4");
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let input = words(200);
        let shuffled = shuffled_with_key(&input, "ferdle-en-5");
        assert_eq!(shuffled.len(), input.len());
        assert_ne!(shuffled, input);

        let mut sorted = shuffled.clone();
        sorted.sort();
        assert_eq!(sorted, input);
    }

    #[test]
    fn shuffle_is_reproducible() {
        let input = words(50);
        assert_eq!(
            shuffled_with_key(&input, "seed"),
            shuffled_with_key(&input, "seed")
        );
    }

    #[test]
    fn below_zero_and_one() {
        let mut rng = SeededRng::new(7);
        assert_eq!(rng.below(0), 0);
        assert_eq!(rng.below(1), 0);
    }

    #[test]
    fn below_covers_the_whole_range() {
        let mut rng = SeededRng::from_key("ferdle-en-5");
        let mut seen = [0_u32; 7];
        for _ in 0..7_000 {
            let Some(slot) = seen.get_mut(rng.below(7)) else {
                panic!("value out of range");
            };
            *slot += 1;
        }
        assert!(seen.iter().all(|&n| n > 800), "skewed draws: {seen:?}");
    }

    #[test]
    fn below_handles_bounds_near_the_top() {
        let bound = usize::MAX / 2 + 2;
        let mut rng = SeededRng::new(11);
        for _ in 0..100 {
            assert!(rng.below(bound) < bound);
        }
    }

    #[test]
    fn tiny_inputs_survive() {
        assert!(shuffled_with_key(&[], "k").is_empty());
        let one = vec!["solo".to_string()];
        assert_eq!(shuffled_with_key(&one, "k"), one);
    }
}
