use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

use crate::story::Story;

pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Downsample a work list to at most `target` stories using a seeded
/// RNG, so repeated runs against the same corpus pick the same subset.
/// Selected stories keep their original corpus order.
pub fn sample_stories(stories: Vec<Story>, target: usize, seed: u64) -> Vec<Story> {
    if stories.len() <= target {
        return stories;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = index::sample(&mut rng, stories.len(), target).into_vec();
    picked.sort_unstable();

    let mut keep = vec![false; stories.len()];
    for idx in picked {
        keep[idx] = true;
    }
    stories
        .into_iter()
        .zip(keep)
        .filter_map(|(story, keep)| keep.then_some(story))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Story> {
        (0..n)
            .map(|i| Story::new(format!("story-{i}"), "text"))
            .collect()
    }

    #[test]
    fn test_same_seed_same_subset() {
        let a = sample_stories(numbered(200), 50, DEFAULT_SAMPLE_SEED);
        let b = sample_stories(numbered(200), 50, DEFAULT_SAMPLE_SEED);
        let titles_a: Vec<_> = a.iter().map(|s| s.title.clone()).collect();
        let titles_b: Vec<_> = b.iter().map(|s| s.title.clone()).collect();
        assert_eq!(titles_a, titles_b);
        assert_eq!(a.len(), 50);
    }

    #[test]
    fn test_different_seed_different_subset() {
        let a = sample_stories(numbered(200), 50, 42);
        let b = sample_stories(numbered(200), 50, 43);
        let titles_a: Vec<_> = a.iter().map(|s| s.title.clone()).collect();
        let titles_b: Vec<_> = b.iter().map(|s| s.title.clone()).collect();
        assert_ne!(titles_a, titles_b);
    }

    #[test]
    fn test_small_corpus_passes_through() {
        let sampled = sample_stories(numbered(10), 300, DEFAULT_SAMPLE_SEED);
        assert_eq!(sampled.len(), 10);
    }

    #[test]
    fn test_corpus_order_preserved() {
        let sampled = sample_stories(numbered(500), 100, DEFAULT_SAMPLE_SEED);
        let indices: Vec<usize> = sampled
            .iter()
            .map(|s| s.title["story-".len()..].parse().unwrap())
            .collect();
        let mut sorted = indices.clone();
        sorted.sort_unstable();
        assert_eq!(indices, sorted);
    }

    #[test]
    fn test_exact_target_size() {
        let sampled = sample_stories(numbered(301), 300, DEFAULT_SAMPLE_SEED);
        assert_eq!(sampled.len(), 300);
    }
}
