use corpus::{Story, meta};
use serde::Serialize;

pub const TOP_PEOPLE: usize = 20;
pub const TOP_PLACES: usize = 15;
pub const TOP_ORGANIZATIONS: usize = 15;

/// Corpus-level counts fed into the guide prompt.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataDigest {
    pub total_stories: usize,
    /// Lexicographic min and max of the raw date strings.
    pub date_range: Option<(String, String)>,
    pub theme_counts: Vec<(String, usize)>,
    pub top_people: Vec<(String, usize)>,
    pub top_places: Vec<(String, usize)>,
    pub top_organizations: Vec<(String, usize)>,
}

pub fn analyze(stories: &[Story]) -> MetadataDigest {
    let mut people = Vec::new();
    let mut places = Vec::new();
    let mut organizations = Vec::new();
    let mut themes = Vec::new();
    let mut dates: Vec<&str> = Vec::new();

    for story in stories {
        people.extend(meta::string_list(story, "people"));
        places.extend(meta::string_list(story, "places"));
        organizations.extend(meta::string_list(story, "organizations"));
        if let Some(topic) = meta::topic(story) {
            themes.push(topic);
        }
        if let Some(date) = story.date.as_deref() {
            if !date.is_empty() {
                dates.push(date);
            }
        }
    }

    let date_range = match (dates.iter().min(), dates.iter().max()) {
        (Some(min), Some(max)) => Some((min.to_string(), max.to_string())),
        _ => None,
    };

    let mut top_people = meta::frequency(people);
    top_people.truncate(TOP_PEOPLE);
    let mut top_places = meta::frequency(places);
    top_places.truncate(TOP_PLACES);
    let mut top_organizations = meta::frequency(organizations);
    top_organizations.truncate(TOP_ORGANIZATIONS);

    MetadataDigest {
        total_stories: stories.len(),
        date_range,
        theme_counts: meta::frequency(themes),
        top_people,
        top_places,
        top_organizations,
    }
}
