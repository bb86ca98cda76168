//! Prominence ranking over a consolidated aggregate: entities at or
//! above a frequency threshold are highlighted individually, the long
//! tail is bucketed by qualifier for display.

use std::collections::{BTreeMap, HashMap};

use consolidate::{ConsolidatedEvent, ConsolidatedIndividual, ConsolidatedPlace};

pub const DEFAULT_THRESHOLD_PERCENT: usize = 5;

/// Minimum distinct-story frequency for an entity to be highlighted
/// separately from the long tail. Never below 2, so tiny corpora do
/// not promote every single mention.
pub fn prominence_threshold(total_stories: usize, threshold_percent: usize) -> usize {
    (total_stories * threshold_percent / 100).max(2)
}

/// Common view over the three consolidated entity classes.
pub trait RankedEntity {
    fn identity(&self) -> &str;
    /// Sorted list of qualifiers observed for this entity.
    fn qualifiers(&self) -> &[String];
    fn frequency(&self) -> usize;
}

impl RankedEntity for ConsolidatedIndividual {
    fn identity(&self) -> &str {
        &self.name
    }
    fn qualifiers(&self) -> &[String] {
        &self.titles
    }
    fn frequency(&self) -> usize {
        self.story_count
    }
}

impl RankedEntity for ConsolidatedEvent {
    fn identity(&self) -> &str {
        &self.event
    }
    fn qualifiers(&self) -> &[String] {
        &self.types
    }
    fn frequency(&self) -> usize {
        self.story_count
    }
}

impl RankedEntity for ConsolidatedPlace {
    fn identity(&self) -> &str {
        &self.location
    }
    fn qualifiers(&self) -> &[String] {
        &self.types
    }
    fn frequency(&self) -> usize {
        self.story_count
    }
}

#[derive(Debug)]
pub struct Ranked<'a, T> {
    pub prominent: Vec<&'a T>,
    pub other: Vec<&'a T>,
}

/// Partition entities around the threshold, preserving their ranked
/// order within each side.
pub fn rank<T: RankedEntity>(entities: &[T], threshold: usize) -> Ranked<'_, T> {
    let (prominent, other) = entities
        .iter()
        .partition(|entity| entity.frequency() >= threshold);
    Ranked { prominent, other }
}

/// Group entities by primary qualifier, buckets in alphabetical order.
/// The primary qualifier is the entity's qualifier carried by the most
/// entities across the whole aggregate; qualifier lists are sorted, so
/// count ties resolve alphabetically. Entities with no qualifier land
/// in an "other" bucket.
pub fn bucket_by_qualifier<'a, T: RankedEntity>(
    entities: &[&'a T],
    aggregate: &[T],
) -> Vec<(String, Vec<&'a T>)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for entity in aggregate {
        for qualifier in entity.qualifiers() {
            *counts.entry(qualifier.as_str()).or_default() += 1;
        }
    }

    let mut buckets: BTreeMap<String, Vec<&T>> = BTreeMap::new();
    for entity in entities {
        let mut primary: Option<(&str, usize)> = None;
        for qualifier in entity.qualifiers() {
            let count = counts.get(qualifier.as_str()).copied().unwrap_or(0);
            if primary.is_none_or(|(_, best)| count > best) {
                primary = Some((qualifier.as_str(), count));
            }
        }
        let key = primary
            .map(|(qualifier, _)| qualifier.to_string())
            .unwrap_or_else(|| "other".to_string());
        buckets.entry(key).or_default().push(entity);
    }
    buckets.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(location: &str, types: &[&str], story_count: usize) -> ConsolidatedPlace {
        ConsolidatedPlace {
            location: location.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            story_count,
            stories: (0..story_count).map(|i| format!("s{i}")).collect(),
        }
    }

    #[test]
    fn test_threshold_floor_is_two() {
        assert_eq!(prominence_threshold(100, 5), 5);
        assert_eq!(prominence_threshold(10, 5), 2);
        assert_eq!(prominence_threshold(0, 5), 2);
        assert_eq!(prominence_threshold(59, 5), 2);
        assert_eq!(prominence_threshold(60, 5), 3);
    }

    #[test]
    fn test_raising_the_percent_never_grows_the_prominent_set() {
        let places: Vec<ConsolidatedPlace> = (1..=20)
            .map(|i| place(&format!("p{i}"), &["town"], i))
            .collect();
        let mut previous = usize::MAX;
        for percent in [1, 5, 10, 25, 50, 100] {
            let threshold = prominence_threshold(100, percent);
            let ranked = rank(&places, threshold);
            assert!(ranked.prominent.len() <= previous);
            previous = ranked.prominent.len();
        }
    }

    #[test]
    fn test_rank_partitions_and_preserves_order() {
        let places = vec![
            place("Easton", &["town"], 9),
            place("Oxford", &["town"], 4),
            place("Trappe", &["town"], 1),
        ];
        let ranked = rank(&places, 4);
        assert_eq!(
            ranked.prominent.iter().map(|p| p.identity()).collect::<Vec<_>>(),
            vec!["Easton", "Oxford"]
        );
        assert_eq!(ranked.other[0].identity(), "Trappe");
    }

    #[test]
    fn test_bucket_primary_qualifier_is_aggregate_wide() {
        // "town" appears on two entities, "harbor" on one, so the
        // Oxford entry carrying both buckets under "town".
        let aggregate = vec![
            place("Easton", &["town"], 1),
            place("Oxford", &["harbor", "town"], 1),
            place("Wye Mills", &[], 1),
        ];
        let refs: Vec<&ConsolidatedPlace> = aggregate.iter().collect();
        let buckets = bucket_by_qualifier(&refs, &aggregate);

        let keys: Vec<&str> = buckets.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["other", "town"]);
        assert_eq!(buckets[1].1.len(), 2);
        assert_eq!(buckets[0].1[0].identity(), "Wye Mills");
    }

    #[test]
    fn test_bucket_count_ties_resolve_alphabetically() {
        let aggregate = vec![place("Oxford", &["harbor", "town"], 1)];
        let refs: Vec<&ConsolidatedPlace> = aggregate.iter().collect();
        let buckets = bucket_by_qualifier(&refs, &aggregate);
        assert_eq!(buckets[0].0, "harbor");
    }
}
