//! Weighted random selection, shared by every resolver.
//!
//! Target choice, guilty-player choice, tackle and sack credit all draw
//! from the same cumulative-weight primitive instead of reimplementing the
//! scan per call site. Selection is always weighted-random, never
//! highest-weight-wins; with all-equal weights it degrades to a uniform
//! draw over the candidates.

use rand::Rng;

/// Pick an index from `candidates` where each candidate's weight comes
/// from `weight_fn`. Negative weights are treated as zero. When every
/// weight is zero (or the pool is empty of weight) the fallback is a
/// uniform draw, so a valid candidate pool never fails to produce a
/// choice.
///
/// Returns `None` only for an empty slice.
pub fn weighted_index<T, R, F>(rng: &mut R, candidates: &[T], weight_fn: F) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    if candidates.is_empty() {
        return None;
    }

    let weights: Vec<f32> = candidates.iter().map(|c| weight_fn(c).max(0.0)).collect();
    let total: f32 = weights.iter().sum();

    if total <= 0.0 {
        return Some(rng.gen_range(0..candidates.len()));
    }

    let mut roll = rng.gen::<f32>() * total;
    for (i, weight) in weights.iter().enumerate() {
        roll -= weight;
        if roll <= 0.0 {
            return Some(i);
        }
    }

    Some(candidates.len() - 1)
}

/// Like [`weighted_index`] but returns a reference to the chosen item.
pub fn weighted_pick<'a, T, R, F>(rng: &mut R, candidates: &'a [T], weight_fn: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    weighted_index(rng, candidates, weight_fn).map(|i| &candidates[i])
}

/// Draw `count` distinct indices without replacement, re-weighting after
/// each pick. Used for co-credited stats such as shared sacks.
pub fn weighted_indices_without_replacement<T, R, F>(
    rng: &mut R,
    candidates: &[T],
    weight_fn: F,
    count: usize,
) -> Vec<usize>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f32,
{
    let mut remaining: Vec<usize> = (0..candidates.len()).collect();
    let mut picked = Vec::with_capacity(count.min(candidates.len()));

    while picked.len() < count && !remaining.is_empty() {
        let choice = weighted_index(rng, &remaining, |&idx| weight_fn(&candidates[idx]));
        match choice {
            Some(pos) => picked.push(remaining.swap_remove(pos)),
            None => break,
        }
    }

    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_empty_pool_returns_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty: Vec<u32> = Vec::new();
        assert!(weighted_index(&mut rng, &empty, |_| 1.0).is_none());
    }

    #[test]
    fn test_never_selects_outside_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let pool = [10, 20, 30];
        for _ in 0..1000 {
            let idx = weighted_index(&mut rng, &pool, |v| *v as f32).unwrap();
            assert!(idx < pool.len());
        }
    }

    #[test]
    fn test_zero_weight_candidate_never_picked() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let pool = [0.0f32, 1.0, 1.0];
        for _ in 0..1000 {
            let idx = weighted_index(&mut rng, &pool, |w| *w).unwrap();
            assert_ne!(idx, 0, "zero-weight candidate was selected");
        }
    }

    #[test]
    fn test_all_zero_weights_falls_back_to_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let pool = [0.0f32, 0.0, 0.0, 0.0];
        let mut counts = [0u32; 4];
        for _ in 0..4000 {
            let idx = weighted_index(&mut rng, &pool, |w| *w).unwrap();
            counts[idx] += 1;
        }
        for (i, &count) in counts.iter().enumerate() {
            assert!(
                count > 700 && count < 1300,
                "bucket {} has {} picks (expected ~1000)",
                i,
                count
            );
        }
    }

    #[test]
    fn test_equal_weights_degrade_to_uniform() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let pool = [1.0f32; 5];
        let mut counts = [0u32; 5];
        for _ in 0..5000 {
            let idx = weighted_index(&mut rng, &pool, |w| *w).unwrap();
            counts[idx] += 1;
        }
        for (i, &count) in counts.iter().enumerate() {
            assert!(
                count > 700 && count < 1300,
                "bucket {} has {} picks (expected ~1000)",
                i,
                count
            );
        }
    }

    #[test]
    fn test_heavier_weight_picked_more_often() {
        let mut rng = ChaCha8Rng::seed_from_u64(19);
        let pool = [1.0f32, 4.0];
        let mut heavy = 0u32;
        for _ in 0..5000 {
            if weighted_index(&mut rng, &pool, |w| *w).unwrap() == 1 {
                heavy += 1;
            }
        }
        // Expected ~4000 of 5000.
        assert!(heavy > 3500 && heavy < 4500, "heavy picked {} times", heavy);
    }

    #[test]
    fn test_without_replacement_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let pool = [1.0f32, 2.0, 3.0, 4.0];
        for _ in 0..200 {
            let picks = weighted_indices_without_replacement(&mut rng, &pool, |w| *w, 2);
            assert_eq!(picks.len(), 2);
            assert_ne!(picks[0], picks[1]);
        }
    }

    #[test]
    fn test_without_replacement_caps_at_pool_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        let pool = [1.0f32, 2.0];
        let picks = weighted_indices_without_replacement(&mut rng, &pool, |w| *w, 5);
        assert_eq!(picks.len(), 2);
    }
}
