//! Prompt assembly for the coverage-guide pass. Story listings are
//! embedded as serialized JSON so titles and bodies survive quoting.

use anyhow::{Context, Result};
use corpus::Story;
use corpus::text::truncate_chars;
use serde::Serialize;

use crate::metadata::MetadataDigest;
use crate::reducer::PartialSummary;

const SELECTION_CONTENT_CHARS: usize = 400;
const FOLLOWUP_CONTENT_CHARS: usize = 300;

/// Join summaries as "LABEL 1:", "LABEL 2:", ... separated by rules.
pub fn join_labeled(sections: &[PartialSummary], label: &str) -> String {
    sections
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{} {}:\n{}", label, i + 1, s.text))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

pub fn build_batch_summary_prompt(batch: &[Story], topic: &str) -> Result<String> {
    let listing = serde_json::to_string_pretty(batch)
        .context("Failed to serialize the story batch for the summary prompt")?;
    Ok(format!(
        "You are analyzing news coverage to help onboard a new reporter covering {topic}.\n\
         \n\
         From these {count} news stories, extract:\n\
         1. Dominant themes and patterns (incident types, enforcement activity, emergency response)\n\
         2. Geographic patterns (which communities and areas recur)\n\
         3. Key people mentioned (officials, agency personnel, with their roles)\n\
         4. Important organizations (agencies, departments, institutions)\n\
         5. Significant incidents and multi-jurisdiction responses\n\
         6. Recurring issues that connect multiple stories\n\
         \n\
         Be concise but capture location-specific details and patterns unique to this coverage area.\n\
         \n\
         Stories:\n\
         {listing}\n\
         \n\
         Provide a structured summary:",
        count = batch.len(),
    ))
}

pub fn build_consolidation_prompt(sections: &[PartialSummary]) -> String {
    format!(
        "Consolidate these {count} coverage summaries into a single comprehensive summary.\n\
         \n\
         Preserve all important:\n\
         - People and their roles\n\
         - Organizations and institutions\n\
         - Major themes and issues\n\
         - Significant events and developments\n\
         - Ongoing debates and conflicts\n\
         \n\
         Be thorough but concise. This will be combined with other summaries later.\n\
         \n\
         SUMMARIES TO CONSOLIDATE:\n\
         {combined}\n\
         \n\
         CONSOLIDATED SUMMARY:",
        count = sections.len(),
        combined = join_labeled(sections, "SECTION"),
    )
}

#[derive(Serialize)]
struct SelectionEntry<'a> {
    idx: usize,
    title: &'a str,
    date: &'a str,
    content: &'a str,
}

pub fn build_selection_prompt(sample: &[Story], total: usize) -> Result<String> {
    let entries: Vec<SelectionEntry> = sample
        .iter()
        .enumerate()
        .map(|(idx, story)| SelectionEntry {
            idx,
            title: &story.title,
            date: story.date.as_deref().unwrap_or(""),
            content: truncate_chars(&story.content, SELECTION_CONTENT_CHARS),
        })
        .collect();
    let listing = serde_json::to_string_pretty(&entries)
        .context("Failed to serialize the story sample for the selection prompt")?;
    Ok(format!(
        "From this collection of {total} stories (showing first {shown}), identify 4-6 \
         representative examples that showcase different story types.\n\
         \n\
         Choose stories that demonstrate:\n\
         - Breaking news: timely incident coverage\n\
         - Feature: longer-form, human interest angle\n\
         - Profile: focused on specific people or organizations\n\
         - In-depth: investigative or analytical piece\n\
         \n\
         Select stories that show geographic diversity and substantive reporting (not just briefs).\n\
         \n\
         Return a JSON array with story indices (0-based from the sample provided) and brief \
         explanations.\n\
         \n\
         Stories:\n\
         {listing}\n\
         \n\
         Return format: {{\"selections\": [{{\"idx\": 0, \"type\": \"breaking news\", \"reason\": \"...\"}}]}}",
        shown = sample.len(),
    ))
}

#[derive(Serialize)]
struct FollowupEntry<'a> {
    title: &'a str,
    date: &'a str,
    content: &'a str,
}

pub fn build_followup_prompt(recent: &[&Story]) -> Result<String> {
    let entries: Vec<FollowupEntry> = recent
        .iter()
        .map(|story| FollowupEntry {
            title: &story.title,
            date: story.date.as_deref().unwrap_or(""),
            content: truncate_chars(&story.content, FOLLOWUP_CONTENT_CHARS),
        })
        .collect();
    let listing = serde_json::to_string_pretty(&entries)
        .context("Failed to serialize recent stories for the follow-up prompt")?;
    Ok(format!(
        "From these recent stories, identify up to 5 that suggest potential follow-up angles. \
         Look for:\n\
         - Ongoing investigations or pending outcomes\n\
         - Unresolved issues or unanswered questions\n\
         - Policy changes in progress\n\
         - Community concerns that need updates\n\
         \n\
         Remember: This dataset may be outdated, so frame these as \"potential\" follow-ups \
         that might have been resolved.\n\
         \n\
         Stories:\n\
         {listing}\n\
         \n\
         Return JSON: {{\"followups\": [{{\"title\": \"...\", \"angle\": \"...\", \"why\": \"...\"}}]}}",
    ))
}

fn counted_line(items: &[(String, usize)], noun: &str) -> Vec<String> {
    items
        .iter()
        .map(|(name, count)| format!("- {} ({} {})", name, count, noun))
        .collect()
}

pub fn build_guide_prompt(
    digest: &MetadataDigest,
    combined: &str,
    topic: &str,
    context: Option<&str>,
) -> String {
    let date_range = match &digest.date_range {
        Some((start, end)) => format!("{} to {}", start, end),
        None => "unknown".to_string(),
    };
    let top_topics = digest
        .theme_counts
        .iter()
        .take(5)
        .map(|(name, count)| format!("{} ({})", name, count))
        .collect::<Vec<_>>()
        .join(", ");

    let context_block = match context {
        Some(text) => format!(
            "BACKGROUND CONTEXT:\n\
             Use this background information to provide context where relevant:\n\
             \n\
             {text}\n\
             \n"
        ),
        None => String::new(),
    };
    let demographic_caveat = if context.is_some() {
        "Don't make demographic claims unless clearly supported by the dataset or the \
         background context above."
    } else {
        "Don't make demographic claims unless clearly supported by the dataset."
    };

    format!(
        "You're helping onboard a new reporter covering {topic}. Write a practical, \
         business-casual guide to the beat.\n\
         \n\
         DATASET INFO:\n\
         - {total} stories\n\
         - Date range: {date_range}\n\
         - Top topics: {top_topics}\n\
         \n\
         KEY PEOPLE (most frequently mentioned):\n\
         {people}\n\
         \n\
         KEY PLACES:\n\
         {places}\n\
         \n\
         KEY ORGANIZATIONS:\n\
         {organizations}\n\
         \n\
         {context_block}\
         INSTRUCTIONS:\n\
         1. Write a SHORT, friendly introduction (2-3 paragraphs max, no \"executive summary\" \
         language, just welcome them to the beat)\n\
         2. Brief \"What You're Covering\" section (main themes only)\n\
         3. CONCISE \"Geographic Notes\" section with only truly important patterns. \
         {demographic_caveat}\n\
         4. \"Who's Who\" section with key contacts (based on frequency)\n\
         5. \"Organizations to Know\" section\n\
         6. Keep it conversational and practical, like briefing a colleague over coffee\n\
         \n\
         Tone: Business-casual, direct, helpful. Not formal or academic.\n\
         \n\
         COVERAGE SUMMARIES:\n\
         {combined}\n\
         \n\
         REPORTER'S BEAT BOOK:",
        total = digest.total_stories,
        people = counted_line(&digest.top_people[..digest.top_people.len().min(15)], "mentions").join("\n"),
        places = counted_line(&digest.top_places[..digest.top_places.len().min(12)], "mentions").join("\n"),
        organizations =
            counted_line(&digest.top_organizations[..digest.top_organizations.len().min(12)], "mentions").join("\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::analyze;

    #[test]
    fn test_join_labeled_numbers_sections() {
        let sections = vec![
            PartialSummary::leaf(0, "alpha"),
            PartialSummary::leaf(1, "beta"),
        ];
        assert_eq!(
            join_labeled(&sections, "BATCH"),
            "BATCH 1:\nalpha\n\n---\n\nBATCH 2:\nbeta"
        );
    }

    #[test]
    fn test_batch_prompt_embeds_stories_and_topic() {
        let batch = vec![Story::new("Fire on \"Main\" St", "A blaze.")];
        let prompt = build_batch_summary_prompt(&batch, "public safety").unwrap();
        assert!(prompt.contains("covering public safety"));
        assert!(prompt.contains("From these 1 news stories"));
        assert!(prompt.contains("Fire on \\\"Main\\\" St"));
    }

    #[test]
    fn test_selection_prompt_truncates_content() {
        let stories = vec![Story::new("Long", "y".repeat(500))];
        let prompt = build_selection_prompt(&stories, 120).unwrap();
        assert!(prompt.contains("collection of 120 stories (showing first 1)"));
        assert!(prompt.contains(&"y".repeat(400)));
        assert!(!prompt.contains(&"y".repeat(401)));
    }

    #[test]
    fn test_followup_prompt_lists_recent_titles() {
        let a = Story::new("Pending verdict", "The jury...").with_date("2024-06-01");
        let refs = vec![&a];
        let prompt = build_followup_prompt(&refs).unwrap();
        assert!(prompt.contains("Pending verdict"));
        assert!(prompt.contains("2024-06-01"));
    }

    #[test]
    fn test_guide_prompt_with_and_without_context() {
        let digest = analyze(&[Story::new("A", "x").with_date("2024-01-01")]);
        let with = build_guide_prompt(&digest, "BATCH 1:\ntext", "this beat", Some("Rural county"));
        assert!(with.contains("BACKGROUND CONTEXT:"));
        assert!(with.contains("Rural county"));
        assert!(with.contains("or the background context above"));
        assert!(with.contains("Date range: 2024-01-01 to 2024-01-01"));
        assert!(with.contains("BATCH 1:\ntext"));

        let without = build_guide_prompt(&digest, "", "this beat", None);
        assert!(!without.contains("BACKGROUND CONTEXT:"));
        assert!(!without.contains("or the background context above"));
    }

    #[test]
    fn test_guide_prompt_unknown_date_range() {
        let digest = analyze(&[Story::new("A", "x")]);
        let prompt = build_guide_prompt(&digest, "", "courts", None);
        assert!(prompt.contains("Date range: unknown"));
        assert!(prompt.contains("covering courts"));
    }
}
