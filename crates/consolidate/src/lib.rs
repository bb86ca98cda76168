pub mod record;

pub use record::{
    ConsolidatedEntities, ConsolidatedEvent, ConsolidatedIndividual, ConsolidatedPlace,
};

use std::collections::{BTreeSet, HashMap};

use extract::BatchEntities;

/// Identity-keyed accumulation for one entity class. Insertion order
/// is remembered so ranking ties resolve to whichever entity appeared
/// first.
#[derive(Default)]
struct Ledger {
    entries: Vec<LedgerEntry>,
    index: HashMap<String, usize>,
}

struct LedgerEntry {
    identity: String,
    qualifiers: BTreeSet<String>,
    stories: BTreeSet<String>,
}

impl Ledger {
    fn absorb(&mut self, identity: &str, qualifier: &str, story_titles: &[String]) {
        let identity = identity.trim();
        if identity.is_empty() {
            return;
        }
        let idx = match self.index.get(identity) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(LedgerEntry {
                    identity: identity.to_string(),
                    qualifiers: BTreeSet::new(),
                    stories: BTreeSet::new(),
                });
                self.index.insert(identity.to_string(), idx);
                idx
            }
        };
        let entry = &mut self.entries[idx];
        let qualifier = qualifier.trim();
        if !qualifier.is_empty() {
            entry.qualifiers.insert(qualifier.to_string());
        }
        entry.stories.extend(story_titles.iter().cloned());
    }

    /// Rank by story count descending. The sort is stable, so equal
    /// counts keep first-seen order.
    fn finish(self) -> Vec<LedgerEntry> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.stories.len().cmp(&a.stories.len()));
        entries
    }
}

/// Merges batch extraction records into deduplicated, frequency-ranked
/// aggregates. Identity is the trimmed name, event description, or
/// place name; repeated sightings union their qualifiers and source
/// stories, so frequency counts distinct supporting stories rather
/// than raw mentions. A pure fold: frequencies depend only on what the
/// batches contain, never on how they were grouped or ordered.
#[derive(Default)]
pub struct Consolidator {
    individuals: Ledger,
    events: Ledger,
    places: Ledger,
}

impl Consolidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, batch: &BatchEntities) {
        for person in &batch.individuals {
            self.individuals
                .absorb(&person.name, &person.title, &person.story_titles);
        }
        for event in &batch.events {
            self.events
                .absorb(&event.event, &event.kind, &event.story_titles);
        }
        for place in &batch.places {
            self.places
                .absorb(&place.location, &place.kind, &place.story_titles);
        }
    }

    pub fn finish(self) -> ConsolidatedEntities {
        ConsolidatedEntities {
            individuals: self
                .individuals
                .finish()
                .into_iter()
                .map(|e| ConsolidatedIndividual {
                    name: e.identity,
                    titles: e.qualifiers.into_iter().collect(),
                    story_count: e.stories.len(),
                    stories: e.stories.into_iter().collect(),
                })
                .collect(),
            events: self
                .events
                .finish()
                .into_iter()
                .map(|e| ConsolidatedEvent {
                    event: e.identity,
                    types: e.qualifiers.into_iter().collect(),
                    story_count: e.stories.len(),
                    stories: e.stories.into_iter().collect(),
                })
                .collect(),
            places: self
                .places
                .finish()
                .into_iter()
                .map(|e| ConsolidatedPlace {
                    location: e.identity,
                    types: e.qualifiers.into_iter().collect(),
                    story_count: e.stories.len(),
                    stories: e.stories.into_iter().collect(),
                })
                .collect(),
        }
    }
}

/// Consolidate a whole run's batch records in one pass.
pub fn consolidate_batches<'a>(
    batches: impl IntoIterator<Item = &'a BatchEntities>,
) -> ConsolidatedEntities {
    let mut consolidator = Consolidator::new();
    for batch in batches {
        consolidator.absorb(batch);
    }
    consolidator.finish()
}
