//! Accessors for annotation fields riding in a story's `extra` map.
//! Downstream report stages read corpora that may or may not have been
//! through annotation or classification, so every accessor tolerates
//! missing or oddly-shaped values.

use std::collections::HashMap;

use serde_json::Value;

use crate::story::Story;

/// Values under `key` as a list of strings. An absent key, or one not
/// holding a list, reads as empty.
pub fn string_list<'a>(story: &'a Story, key: &str) -> Vec<&'a str> {
    match story.extra.get(key) {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

/// Topic assigned by classification, falling back to the annotated
/// primary theme.
pub fn topic(story: &Story) -> Option<&str> {
    story
        .extra
        .get("topic")
        .and_then(Value::as_str)
        .or_else(|| story.extra.get("primary_theme").and_then(Value::as_str))
}

/// Occurrence counts, most common first, ties in first-seen order.
pub fn frequency<I, S>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in items {
        let item = item.into();
        match index.get(&item) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(item.clone(), order.len());
                order.push((item, 1));
            }
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn annotated_story() -> Story {
        serde_json::from_value(json!({
            "title": "Fire on Main St",
            "content": "...",
            "people": ["Chief Chris Thomas", "John Doe"],
            "places": ["Easton"],
            "topic": "Public Safety",
            "primary_theme": "fire/rescue"
        }))
        .unwrap()
    }

    #[test]
    fn test_string_list_reads_arrays() {
        let story = annotated_story();
        assert_eq!(
            string_list(&story, "people"),
            vec!["Chief Chris Thomas", "John Doe"]
        );
        assert!(string_list(&story, "organizations").is_empty());
    }

    #[test]
    fn test_string_list_ignores_non_lists() {
        let story: Story =
            serde_json::from_value(json!({"title": "A", "content": "x", "people": "not a list"}))
                .unwrap();
        assert!(string_list(&story, "people").is_empty());
    }

    #[test]
    fn test_topic_prefers_classification_over_theme() {
        let story = annotated_story();
        assert_eq!(topic(&story), Some("Public Safety"));

        let theme_only: Story = serde_json::from_value(
            json!({"title": "A", "content": "x", "primary_theme": "fire/rescue"}),
        )
        .unwrap();
        assert_eq!(topic(&theme_only), Some("fire/rescue"));
        assert_eq!(topic(&Story::new("A", "x")), None);
    }

    #[test]
    fn test_frequency_orders_by_count_then_first_seen() {
        let counts = frequency(["b", "a", "c", "a", "c"]);
        assert_eq!(
            counts,
            vec![
                ("a".to_string(), 2),
                ("c".to_string(), 2),
                ("b".to_string(), 1)
            ]
        );
    }
}
