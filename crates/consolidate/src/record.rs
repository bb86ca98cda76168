use serde::{Deserialize, Serialize};

/// The finalized aggregate across all batches. Lists are ranked by
/// story count descending; qualifier and story lists are sorted so the
/// same input always serializes to the same bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedEntities {
    pub individuals: Vec<ConsolidatedIndividual>,
    pub events: Vec<ConsolidatedEvent>,
    pub places: Vec<ConsolidatedPlace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedIndividual {
    pub name: String,
    pub titles: Vec<String>,
    pub story_count: usize,
    pub stories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedEvent {
    pub event: String,
    pub types: Vec<String>,
    pub story_count: usize,
    pub stories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedPlace {
    pub location: String,
    pub types: Vec<String>,
    pub story_count: usize,
    pub stories: Vec<String>,
}
