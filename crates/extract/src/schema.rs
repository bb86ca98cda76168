use serde::{Deserialize, Serialize};

/// One batch worth of mentions, exactly as the model reports them.
/// Categories the model omits default to empty rather than failing the
/// batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntities {
    #[serde(default)]
    pub individuals: Vec<IndividualMention>,
    #[serde(default)]
    pub events: Vec<EventMention>,
    #[serde(default)]
    pub places: Vec<PlaceMention>,
}

impl BatchEntities {
    pub fn mention_count(&self) -> usize {
        self.individuals.len() + self.events.len() + self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mention_count() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualMention {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub story_titles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMention {
    #[serde(default)]
    pub event: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub story_titles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceMention {
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub story_titles: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_categories_default_to_empty() {
        let entities: BatchEntities =
            serde_json::from_str(r#"{"individuals": [{"name": "Jane Doe"}]}"#).unwrap();
        assert_eq!(entities.individuals.len(), 1);
        assert!(entities.events.is_empty());
        assert!(entities.places.is_empty());
        assert_eq!(entities.mention_count(), 1);
    }

    #[test]
    fn test_type_key_maps_to_kind() {
        let raw = r#"{"events": [{"event": "Council vote", "type": "government", "story_titles": ["Budget passes"]}]}"#;
        let entities: BatchEntities = serde_json::from_str(raw).unwrap();
        assert_eq!(entities.events[0].kind, "government");

        let back = serde_json::to_value(&entities).unwrap();
        assert_eq!(back["events"][0]["type"], "government");
    }

    #[test]
    fn test_mention_fields_all_optional() {
        let entities: BatchEntities =
            serde_json::from_str(r#"{"places": [{}], "events": [{"event": "Fire"}]}"#).unwrap();
        assert_eq!(entities.places[0].location, "");
        assert_eq!(entities.events[0].kind, "");
    }
}
