use corpus::{Season, Story, calendar_facts};
use oracle::ExtractionFailure;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Everything the model is asked to pull out of one story. Fields the
/// model leaves out or nulls decode to their empty forms, since a
/// partial answer is still worth keeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryAnnotations {
    #[serde(default, deserialize_with = "null_as_default")]
    pub people: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub places: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organizations: Vec<String>,
    #[serde(default)]
    pub primary_theme: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub secondary_themes: Vec<String>,
    #[serde(default)]
    pub incident_type: Option<String>,
    #[serde(default)]
    pub severity_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
    #[serde(default)]
    pub time_of_incident: Option<String>,
    #[serde(default)]
    pub weather_conditions: Option<String>,
    /// Models answer this one as either a single agency or a list.
    #[serde(default, deserialize_with = "string_or_list")]
    pub response_agencies: Vec<String>,
    #[serde(default)]
    pub outcome: Option<String>,
}

/// A story plus everything the pipeline learned about it. Unknown
/// input keys ride along in `extra`; top-level fields shadow nothing
/// because promoted keys are scrubbed from `extra` on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedStory {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub season: Option<Season>,
    #[serde(default)]
    pub is_weekend: Option<bool>,
    #[serde(flatten)]
    pub annotations: StoryAnnotations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_error: Option<ExtractionFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_error: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Keys owned by `AnnotatedStory` itself. Dropped from `extra` so a
/// previously annotated input cannot serialize the same key twice.
const PROMOTED_KEYS: &[&str] = &[
    "year",
    "season",
    "is_weekend",
    "people",
    "places",
    "organizations",
    "primary_theme",
    "secondary_themes",
    "incident_type",
    "severity_level",
    "location",
    "location_type",
    "time_of_incident",
    "weather_conditions",
    "response_agencies",
    "outcome",
    "extraction_error",
    "summary_error",
];

impl AnnotatedStory {
    /// Wrap a raw story with derived calendar facts and no annotations
    /// yet. A `year` already present on the input wins over the
    /// derived one.
    pub fn from_story(story: Story) -> Self {
        let facts = calendar_facts(story.date.as_deref());
        let Story {
            title,
            content,
            date,
            author,
            mut extra,
        } = story;

        let year = extra
            .get("year")
            .and_then(|v| {
                v.as_i64()
                    .map(|y| y as i32)
                    .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
            })
            .or(facts.year);

        for key in PROMOTED_KEYS {
            extra.remove(*key);
        }

        Self {
            title,
            content,
            date,
            author,
            year,
            season: facts.season,
            is_weekend: facts.is_weekend,
            annotations: StoryAnnotations::default(),
            extraction_error: None,
            summary_error: None,
            extra,
        }
    }

    pub fn annotation_succeeded(&self) -> bool {
        self.extraction_error.is_none()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Listish {
        One(String),
        Many(Vec<String>),
    }
    Ok(match Option::<Listish>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Listish::One(one)) => vec![one],
        Some(Listish::Many(many)) => many,
    })
}
