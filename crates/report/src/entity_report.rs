//! Markdown rendering for a consolidated entity aggregate. The report
//! caps how many long-tail entries it prints per section; the
//! aggregate itself is never truncated, so the JSON side channel keeps
//! every entity.

use consolidate::ConsolidatedEntities;
use corpus::text::title_case;

use crate::prominence::{RankedEntity, bucket_by_qualifier, prominence_threshold, rank};

const OTHER_INDIVIDUALS_CAP: usize = 50;
const OTHER_EVENTS_PER_TYPE_CAP: usize = 20;
const OTHER_PLACES_PER_TYPE_CAP: usize = 30;

fn joined_or(qualifiers: &[String], separator: &str, fallback: &str) -> String {
    if qualifiers.is_empty() {
        fallback.to_string()
    } else {
        qualifiers.join(separator)
    }
}

pub fn render_entity_report(
    aggregate: &ConsolidatedEntities,
    total_stories: usize,
    threshold_percent: usize,
) -> String {
    let threshold = prominence_threshold(total_stories, threshold_percent);

    let mut report = format!(
        "# Entity Extraction Report\n\n\
         **Total Stories Analyzed:** {total_stories}\n\
         **Prominence Threshold:** Appears in at least {threshold} stories \
         ({threshold_percent}% of total)\n\n\
         ---\n\n\
         ## INDIVIDUALS AND TITLES\n\n\
         ### Prominently Featured Individuals\n\
         *These individuals appear in {threshold} or more stories*\n\n"
    );

    let individuals = rank(&aggregate.individuals, threshold);
    if individuals.prominent.is_empty() {
        report.push_str("*No individuals meet the prominence threshold*\n\n");
    } else {
        for person in &individuals.prominent {
            report.push_str(&format!(
                "### **{}** ({} stories)\n**Title(s):** {}\n\n",
                person.name,
                person.story_count,
                joined_or(&person.titles, " / ", "No title specified"),
            ));
        }
    }

    if !individuals.other.is_empty() {
        report.push_str(&format!(
            "\n### Other Individuals ({} total)\n\n",
            individuals.other.len()
        ));
        for person in individuals.other.iter().take(OTHER_INDIVIDUALS_CAP) {
            report.push_str(&format!(
                "- **{}** ({} stories) - {}\n",
                person.name,
                person.story_count,
                joined_or(&person.titles, " / ", "No title specified"),
            ));
        }
        if individuals.other.len() > OTHER_INDIVIDUALS_CAP {
            report.push_str(&format!(
                "\n*...and {} more individuals*\n",
                individuals.other.len() - OTHER_INDIVIDUALS_CAP
            ));
        }
    }

    report.push_str("\n\n---\n\n## EVENTS AND ORGANIZATIONAL ACTS\n\n");
    report.push_str("### Prominent Events\n");
    report.push_str(&format!(
        "*Events appearing in {threshold} or more stories*\n\n"
    ));

    let events = rank(&aggregate.events, threshold);
    if events.prominent.is_empty() {
        report.push_str("*No events meet the prominence threshold*\n\n");
    } else {
        for event in &events.prominent {
            report.push_str(&format!(
                "### {} ({} stories)\n**Type:** {}\n\n",
                event.event,
                event.story_count,
                joined_or(&event.types, ", ", "general"),
            ));
        }
    }

    if !events.other.is_empty() {
        report.push_str(&format!(
            "\n### Other Events ({} total)\n\n",
            events.other.len()
        ));
        for (kind, group) in bucket_by_qualifier(&events.other, &aggregate.events) {
            report.push_str(&format!("\n#### {} Events\n", title_case(&kind)));
            for event in group.iter().take(OTHER_EVENTS_PER_TYPE_CAP) {
                report.push_str(&format!(
                    "- {} ({} stories)\n",
                    event.event, event.story_count
                ));
            }
            if group.len() > OTHER_EVENTS_PER_TYPE_CAP {
                report.push_str(&format!(
                    "*...and {} more {} events*\n",
                    group.len() - OTHER_EVENTS_PER_TYPE_CAP,
                    kind
                ));
            }
        }
    }

    report.push_str("\n\n---\n\n## PLACES\n\n");
    report.push_str("### Prominently Featured Locations\n");
    report.push_str(&format!(
        "*Locations appearing in {threshold} or more stories*\n\n"
    ));

    let places = rank(&aggregate.places, threshold);
    if places.prominent.is_empty() {
        report.push_str("*No locations meet the prominence threshold*\n\n");
    } else {
        for place in &places.prominent {
            report.push_str(&format!(
                "### **{}** ({} stories)\n**Type:** {}\n\n",
                place.location,
                place.story_count,
                joined_or(&place.types, ", ", "general"),
            ));
        }
    }

    if !places.other.is_empty() {
        report.push_str(&format!(
            "\n### Other Locations ({} total)\n\n",
            places.other.len()
        ));
        for (kind, group) in bucket_by_qualifier(&places.other, &aggregate.places) {
            report.push_str(&format!("\n#### {} Locations\n", title_case(&kind)));
            for place in group.iter().take(OTHER_PLACES_PER_TYPE_CAP) {
                report.push_str(&format!(
                    "- {} ({} stories)\n",
                    place.location, place.story_count
                ));
            }
            if group.len() > OTHER_PLACES_PER_TYPE_CAP {
                report.push_str(&format!(
                    "*...and {} more {} locations*\n",
                    group.len() - OTHER_PLACES_PER_TYPE_CAP,
                    kind
                ));
            }
        }
    }

    report
}
