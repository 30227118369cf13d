//! Weighted index sampling shared by the walk-based strategies.

use tangle_env::RandomSource;

/// Picks an index with probability proportional to its score.
///
/// Returns `None` for an empty slice. When the scores sum to zero or less
/// the choice is uniform over the index range instead. Otherwise draws
/// `r` in `[0, sum]` and returns the first index whose running sum reaches
/// `r`; if rounding leaves `r` above every running sum, the last index wins.
///
/// The accumulation order is fixed: changing it changes which index a
/// seeded run picks.
pub fn weighted_choice<R: RandomSource + ?Sized>(scores: &[f64], rng: &mut R) -> Option<usize> {
    if scores.is_empty() {
        return None;
    }

    let sum: f64 = scores.iter().sum();
    if sum <= 0.0 {
        return Some(rng.uniform_int(0, scores.len() - 1));
    }

    let r = rng.uniform_real(0.0, sum);
    let mut acc = 0.0;
    for (i, score) in scores.iter().enumerate() {
        acc += score;
        if r <= acc {
            return Some(i);
        }
    }
    Some(scores.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tangle_env::SeededRng;

    /// Replays a fixed list of draws.
    struct Scripted {
        reals: Vec<f64>,
        ints: Vec<usize>,
    }

    impl RandomSource for Scripted {
        fn uniform_real(&mut self, _low: f64, _high: f64) -> f64 {
            self.reals.remove(0)
        }

        fn uniform_int(&mut self, _low: usize, _high: usize) -> usize {
            self.ints.remove(0)
        }

        fn seed(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_empty_scores() {
        let mut rng = SeededRng::new(1);
        assert_eq!(weighted_choice(&[], &mut rng), None);
    }

    #[test]
    fn test_uniform_weights_distribution() {
        let mut rng = SeededRng::new(42);
        let mut counts = [0usize; 4];

        for _ in 0..10_000 {
            let i = weighted_choice(&[1.0, 1.0, 1.0, 1.0], &mut rng).unwrap();
            counts[i] += 1;
        }

        for count in counts {
            // Expected 2500 each
            assert!((2300..=2700).contains(&count), "count {} outside tolerance", count);
        }
    }

    #[test]
    fn test_zero_weights_fall_back_to_uniform_int() {
        let mut rng = Scripted { reals: vec![], ints: vec![2, 0, 1] };

        assert_eq!(weighted_choice(&[0.0, 0.0, 0.0], &mut rng), Some(2));
        assert_eq!(weighted_choice(&[0.0, 0.0, 0.0], &mut rng), Some(0));
        assert_eq!(weighted_choice(&[0.0, 0.0, 0.0], &mut rng), Some(1));
    }

    #[test]
    fn test_zero_weights_seeded_matches_uniform_int() {
        let mut a = SeededRng::new(9);
        let mut b = SeededRng::new(9);

        for _ in 0..50 {
            let picked = weighted_choice(&[0.0, 0.0, 0.0], &mut a).unwrap();
            assert_eq!(picked, b.uniform_int(0, 2));
        }
    }

    #[test]
    fn test_first_index_reaching_draw() {
        // Running sums: 1, 3, 6
        let mut rng = Scripted { reals: vec![0.5, 1.0, 1.5, 3.0, 5.9], ints: vec![] };
        let scores = [1.0, 2.0, 3.0];

        assert_eq!(weighted_choice(&scores, &mut rng), Some(0));
        assert_eq!(weighted_choice(&scores, &mut rng), Some(0));
        assert_eq!(weighted_choice(&scores, &mut rng), Some(1));
        assert_eq!(weighted_choice(&scores, &mut rng), Some(1));
        assert_eq!(weighted_choice(&scores, &mut rng), Some(2));
    }

    #[test]
    fn test_overshoot_returns_last_index() {
        let mut rng = Scripted { reals: vec![10.0], ints: vec![] };
        assert_eq!(weighted_choice(&[1.0, 2.0], &mut rng), Some(1));
    }

    #[test]
    fn test_trailing_zero_score_never_selected() {
        let mut rng = SeededRng::new(3);
        for _ in 0..500 {
            let i = weighted_choice(&[1.0, 5.0, 0.0], &mut rng).unwrap();
            assert_ne!(i, 2);
        }
    }
}
