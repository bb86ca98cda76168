use anyhow::{Context, Result};
use corpus::Story;
use serde::Serialize;

#[derive(Serialize)]
struct PromptStory<'a> {
    title: &'a str,
    date: &'a str,
    content: &'a str,
}

/// Build the extraction prompt for one batch of stories. The stories
/// travel inside the prompt as a JSON listing so titles with quotes or
/// newlines survive intact.
pub fn build_batch_prompt(stories: &[Story]) -> Result<String> {
    let listing: Vec<PromptStory> = stories
        .iter()
        .map(|story| PromptStory {
            title: &story.title,
            date: story.date.as_deref().unwrap_or(""),
            content: &story.content,
        })
        .collect();
    let listing =
        serde_json::to_string_pretty(&listing).context("Failed to serialize batch stories")?;

    Ok(format!(
        r#"Extract the following from these {count} news stories:

1. **INDIVIDUALS AND TITLES**: Every person mentioned with their full title/role
   - Format: "Name (Title/Role)"
   - Include all mentions: officials, victims, witnesses, experts, etc.

2. **EVENTS AND ORGANIZATIONAL ACTS**: Specific incidents, activities, decisions
   - Criminal incidents (arrests, charges, investigations)
   - Government actions (ordinances, meetings, decisions)
   - Emergency responses (fires, accidents, rescues)
   - Public meetings and hearings
   - Organizational decisions and announcements

3. **PLACES**: All geographic locations mentioned
   - Specific addresses and intersections
   - Neighborhoods and communities
   - Buildings and facilities
   - County/regional locations

For each category, note which story (by title) it appears in.

Stories:
{listing}

Return a structured JSON response:
{{
  "individuals": [
    {{"name": "Person Name", "title": "Their Title/Role", "story_titles": ["Story 1", "Story 2"]}}
  ],
  "events": [
    {{"event": "Description of event", "type": "criminal/government/emergency/meeting/other", "story_titles": ["Story 1"]}}
  ],
  "places": [
    {{"location": "Place Name", "type": "address/neighborhood/building/region", "story_titles": ["Story 1", "Story 2"]}}
  ]
}}"#,
        count = stories.len(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_stories_as_json() {
        let stories = vec![
            Story::new("Fire on \"Main\" St", "A blaze broke out.").with_date("2024-03-02"),
            Story::new("Council meets", "The council met."),
        ];
        let prompt = build_batch_prompt(&stories).unwrap();
        assert!(prompt.starts_with("Extract the following from these 2 news stories"));
        assert!(prompt.contains(r#"Fire on \"Main\" St"#));
        assert!(prompt.contains("\"date\": \"2024-03-02\""));
        assert!(prompt.contains("INDIVIDUALS AND TITLES"));
        assert!(prompt.contains("\"story_titles\""));
    }

    #[test]
    fn test_missing_date_becomes_empty_string() {
        let prompt = build_batch_prompt(&[Story::new("A", "x")]).unwrap();
        assert!(prompt.contains("\"date\": \"\""));
    }
}
