//! Reorder lists to control how far an input is from sorted.
//!
//! Every operation returns a new `Vec`; the input slice is never touched.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Swap fraction used by `almost_sorted` when none is given.
pub const DEFAULT_SWAP_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShuffleError {
    #[error("unknown shuffling strategy: {name} (available: {})", available.join(", "))]
    UnknownStrategy {
        name: String,
        available: Vec<&'static str>,
    },
    #[error("swap fraction must be in (0, 1], got {0}")]
    InvalidSwapFraction(f64),
    #[error("need at least {min} items, got {got}")]
    TooFewItems { min: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShuffleStrategy {
    Random,
    Reverse,
    AlmostSorted,
    Identity,
}

impl ShuffleStrategy {
    pub const ALL: [ShuffleStrategy; 4] = [
        ShuffleStrategy::Random,
        ShuffleStrategy::Reverse,
        ShuffleStrategy::AlmostSorted,
        ShuffleStrategy::Identity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShuffleStrategy::Random => "random",
            ShuffleStrategy::Reverse => "reverse",
            ShuffleStrategy::AlmostSorted => "almost_sorted",
            ShuffleStrategy::Identity => "identity",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.name()).collect()
    }
}

impl fmt::Display for ShuffleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShuffleStrategy {
    type Err = ShuffleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ShuffleError::UnknownStrategy {
                name: s.to_string(),
                available: Self::names(),
            })
    }
}

/// Seeded source of reorderings.
#[derive(Debug, Clone)]
pub struct Shuffler {
    rng: StdRng,
}

impl Shuffler {
    /// Reproducible with `Some(seed)`, entropy-seeded otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    pub fn random_shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        out.shuffle(&mut self.rng);
        out
    }

    pub fn reverse<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().rev().cloned().collect()
    }

    /// `max(1, floor(n * fraction))` swaps of a random adjacent pair.
    pub fn almost_sorted<T: Clone>(&mut self, items: &[T], fraction: f64) -> Result<Vec<T>, ShuffleError> {
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(ShuffleError::InvalidSwapFraction(fraction));
        }
        let n = items.len();
        if n < 2 {
            return Err(ShuffleError::TooFewItems { min: 2, got: n });
        }

        let mut out = items.to_vec();
        let swaps = ((n as f64 * fraction).floor() as usize).max(1);
        for _ in 0..swaps {
            let i = self.rng.gen_range(0..=n - 2);
            out.swap(i, i + 1);
        }
        Ok(out)
    }

    /// Randomly permute every element except those at `fixed` positions.
    /// Out-of-range positions are ignored.
    pub fn shuffle_with_fixed_positions<T: Clone>(&mut self, items: &[T], fixed: &[usize]) -> Vec<T> {
        let is_fixed = |i: usize| fixed.contains(&i);

        let mut movable: Vec<T> = items
            .iter()
            .enumerate()
            .filter(|(i, _)| !is_fixed(*i))
            .map(|(_, item)| item.clone())
            .collect();
        movable.shuffle(&mut self.rng);

        let mut movable = movable.into_iter();
        items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                if is_fixed(i) {
                    Some(item.clone())
                } else {
                    movable.next()
                }
            })
            .collect()
    }

    /// Apply `strategy`. `swap_fraction` only affects `AlmostSorted`.
    pub fn apply_strategy<T: Clone>(
        &mut self,
        items: &[T],
        strategy: ShuffleStrategy,
        swap_fraction: Option<f64>,
    ) -> Result<Vec<T>, ShuffleError> {
        match strategy {
            ShuffleStrategy::Random => Ok(self.random_shuffle(items)),
            ShuffleStrategy::Reverse => Ok(self.reverse(items)),
            ShuffleStrategy::AlmostSorted => {
                self.almost_sorted(items, swap_fraction.unwrap_or(DEFAULT_SWAP_FRACTION))
            }
            ShuffleStrategy::Identity => Ok(items.to_vec()),
        }
    }

    /// Look the strategy up by name, then apply it.
    pub fn apply_named<T: Clone>(
        &mut self,
        items: &[T],
        strategy: &str,
        swap_fraction: Option<f64>,
    ) -> Result<Vec<T>, ShuffleError> {
        let strategy: ShuffleStrategy = strategy.parse()?;
        self.apply_strategy(items, strategy, swap_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(out: &[i32]) -> Vec<i32> {
        let mut v = out.to_vec();
        v.sort();
        v
    }

    #[test]
    fn random_shuffle_is_a_seeded_permutation() {
        let items: Vec<i32> = (0..20).collect();
        let a = Shuffler::new(Some(42)).random_shuffle(&items);
        let b = Shuffler::new(Some(42)).random_shuffle(&items);
        assert_eq!(a, b);
        assert_eq!(sorted(&a), items);
        assert_ne!(a, items);
        assert_eq!(items, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn reverse_and_identity() {
        let mut s = Shuffler::new(Some(1));
        assert_eq!(s.reverse(&[1, 2, 3]), [3, 2, 1]);
        assert_eq!(
            s.apply_strategy(&[1, 2, 3], ShuffleStrategy::Identity, None).unwrap(),
            [1, 2, 3]
        );
        assert!(s.reverse::<i32>(&[]).is_empty());
    }

    #[test]
    fn almost_sorted_moves_few_items() {
        let items: Vec<i32> = (0..10).collect();
        let out = Shuffler::new(Some(3)).almost_sorted(&items, 0.2).unwrap();
        assert_eq!(sorted(&out), items);
        // Two adjacent swaps displace at most four positions.
        let displaced = out.iter().zip(&items).filter(|(a, b)| a != b).count();
        assert!(displaced <= 4);
    }

    #[test]
    fn almost_sorted_always_swaps_at_least_once() {
        let out = Shuffler::new(Some(0)).almost_sorted(&[1, 2], 0.1).unwrap();
        assert_eq!(out, [2, 1]);
    }

    #[test]
    fn almost_sorted_rejects_bad_input() {
        let mut s = Shuffler::new(Some(0));
        assert_eq!(
            s.almost_sorted(&[1], 0.2),
            Err(ShuffleError::TooFewItems { min: 2, got: 1 })
        );
        assert!(matches!(
            s.almost_sorted(&[1, 2, 3], 0.0),
            Err(ShuffleError::InvalidSwapFraction(_))
        ));
        assert!(matches!(
            s.almost_sorted(&[1, 2, 3], 1.5),
            Err(ShuffleError::InvalidSwapFraction(_))
        ));
        assert!(s.almost_sorted(&[1, 2, 3], f64::NAN).is_err());
    }

    #[test]
    fn fixed_positions_keep_their_elements() {
        let items: Vec<i32> = (0..12).collect();
        let fixed = [0, 5, 11, 40];
        let out = Shuffler::new(Some(9)).shuffle_with_fixed_positions(&items, &fixed);
        assert_eq!(out.len(), items.len());
        assert_eq!(sorted(&out), items);
        for pos in [0, 5, 11] {
            assert_eq!(out[pos], items[pos]);
        }
    }

    #[test]
    fn unknown_strategy_lists_available_names() {
        let err = Shuffler::new(Some(0))
            .apply_named(&[1, 2, 3], "bogo", None)
            .unwrap_err();
        match &err {
            ShuffleError::UnknownStrategy { name, available } => {
                assert_eq!(name, "bogo");
                assert_eq!(available, &["random", "reverse", "almost_sorted", "identity"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("almost_sorted"));
    }

    #[test]
    fn named_almost_sorted_uses_supplied_fraction() {
        let items: Vec<i32> = (0..10).collect();
        let a = Shuffler::new(Some(5))
            .apply_named(&items, "almost_sorted", Some(1.0))
            .unwrap();
        let b = Shuffler::new(Some(5)).almost_sorted(&items, 1.0).unwrap();
        assert_eq!(a, b);
    }
}
