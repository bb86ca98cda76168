//! Chronological beat book built purely from story metadata: per-year
//! trend lines followed by a month-by-month timeline. Stories whose
//! dates are missing or unparseable are kept in an explicit Unknown
//! period rather than dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use corpus::{Story, meta, parse_story_date};
use regex::Regex;

pub const DEFAULT_TOP_N: usize = 5;
const SAMPLE_TITLES: usize = 3;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\S+@\S+\b").unwrap());
static AUTHOR_SEP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";| and |,").unwrap());

/// Split a byline into individual names, dropping embedded email
/// addresses. Bylines arrive as "Jane Doe and John Smith", "Doe; Smith"
/// or "Jane Doe jdoe@paper.com".
pub fn normalize_author(author: &str) -> Vec<String> {
    let cleaned = EMAIL.replace_all(author, "");
    AUTHOR_SEP
        .split(cleaned.trim())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Month,
    Year,
}

/// A bucket on the timeline. Variant order puts Unknown after every
/// dated period, so it always renders last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Period {
    Month { year: i32, month: u32 },
    Year(i32),
    Unknown,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Month { year, month } => match NaiveDate::from_ymd_opt(*year, *month, 1) {
                Some(date) => write!(f, "{}", date.format("%B %Y")),
                None => write!(f, "{year}-{month:02}"),
            },
            Period::Year(year) => write!(f, "{year}"),
            Period::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Group stories by calendar period, in period order.
pub fn bucket_by_period<'a, I>(
    stories: I,
    granularity: Granularity,
) -> BTreeMap<Period, Vec<&'a Story>>
where
    I: IntoIterator<Item = &'a Story>,
{
    let mut buckets: BTreeMap<Period, Vec<&Story>> = BTreeMap::new();
    for story in stories {
        let period = match story.date.as_deref().and_then(parse_story_date) {
            Some(date) => match granularity {
                Granularity::Month => Period::Month {
                    year: date.year(),
                    month: date.month(),
                },
                Granularity::Year => Period::Year(date.year()),
            },
            None => Period::Unknown,
        };
        buckets.entry(period).or_default().push(story);
    }
    buckets
}

fn top_counts<I, S>(items: I, top_n: usize) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = meta::frequency(items);
    counts.truncate(top_n);
    counts
}

fn counted_list(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{name} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_list(counts: &[(String, usize)], label: &str) -> String {
    if counts.is_empty() {
        format!("- {label}: None\n")
    } else {
        format!("- {label}: {}\n", counted_list(counts))
    }
}

fn trend_line(period: &Period, counts: &[(String, usize)]) -> String {
    if counts.is_empty() {
        format!("- {period}: None")
    } else {
        format!("- {period}: {}", counted_list(counts))
    }
}

fn render_month_section(period: &Period, stories: &[&Story], top_n: usize) -> String {
    let mut section = format!("## {period}\n");

    let topics = top_counts(stories.iter().filter_map(|s| meta::topic(s)), top_n);
    section.push_str(&render_list(&topics, "Top topics"));
    let places = top_counts(
        stories.iter().flat_map(|s| meta::string_list(s, "places")),
        top_n,
    );
    section.push_str(&render_list(&places, "Top places"));
    let organizations = top_counts(
        stories
            .iter()
            .flat_map(|s| meta::string_list(s, "organizations")),
        top_n,
    );
    section.push_str(&render_list(&organizations, "Top organizations"));
    let people = top_counts(
        stories.iter().flat_map(|s| meta::string_list(s, "people")),
        top_n,
    );
    section.push_str(&render_list(&people, "Top people"));
    let bylines = top_counts(
        stories
            .iter()
            .filter_map(|s| s.author.as_deref())
            .flat_map(normalize_author),
        top_n,
    );
    section.push_str(&render_list(&bylines, "Top bylines"));

    section.push_str("- Sample stories:\n");
    for story in stories.iter().take(SAMPLE_TITLES) {
        let title = if story.title.is_empty() {
            "Untitled"
        } else {
            &story.title
        };
        section.push_str(&format!("  - {title}\n"));
    }
    section
}

fn render_topic_trends(by_year: &BTreeMap<Period, Vec<&Story>>, top_n: usize) -> String {
    let mut out = String::from("## Topic Trends Over Time\n");
    for (period, stories) in by_year {
        let counts = top_counts(stories.iter().filter_map(|s| meta::topic(s)), top_n);
        out.push_str(&trend_line(period, &counts));
        out.push('\n');
    }
    out
}

fn render_location_trends(by_year: &BTreeMap<Period, Vec<&Story>>, top_n: usize) -> String {
    let mut out = String::from("## Location Focus Over Time\n");
    for (period, stories) in by_year {
        let counts = top_counts(
            stories.iter().flat_map(|s| meta::string_list(s, "places")),
            top_n,
        );
        out.push_str(&trend_line(period, &counts));
        out.push('\n');
    }
    out
}

fn render_newsroom_trends(by_year: &BTreeMap<Period, Vec<&Story>>, top_n: usize) -> String {
    let mut out = String::from("## Newsroom and Bylines Over Time\n");
    let mut previous: BTreeSet<String> = BTreeSet::new();
    for (period, stories) in by_year {
        let mut counts = meta::frequency(
            stories
                .iter()
                .filter_map(|s| s.author.as_deref())
                .flat_map(normalize_author),
        );
        let current: BTreeSet<String> = counts.iter().map(|(name, _)| name.clone()).collect();
        counts.truncate(top_n);
        out.push_str(&trend_line(period, &counts));

        let debuts: Vec<&str> = current
            .difference(&previous)
            .take(top_n)
            .map(String::as_str)
            .collect();
        if !debuts.is_empty() {
            out.push_str(&format!(" | New bylines: {}", debuts.join(", ")));
        }
        out.push('\n');
        previous = current;
    }
    out
}

/// Render the full chronological beat book.
pub fn render_chronicle(stories: &[Story], top_n: usize) -> String {
    let mut ordered: Vec<&Story> = stories.iter().collect();
    ordered.sort_by_key(|story| {
        story
            .date
            .as_deref()
            .and_then(parse_story_date)
            .unwrap_or(NaiveDate::MIN)
    });

    let by_month = bucket_by_period(ordered.iter().copied(), Granularity::Month);
    let by_year = bucket_by_period(ordered.iter().copied(), Granularity::Year);

    let monthly: Vec<String> = by_month
        .iter()
        .map(|(period, group)| render_month_section(period, group, top_n))
        .collect();

    let mut document = String::from("# Beat Book (Chronological)\n\n");
    document.push_str("This beat book summarizes coverage over time based on story metadata.\n\n");
    document.push_str(&render_topic_trends(&by_year, top_n));
    document.push('\n');
    document.push_str(&render_location_trends(&by_year, top_n));
    document.push('\n');
    document.push_str(&render_newsroom_trends(&by_year, top_n));
    document.push('\n');
    document.push_str("# Monthly Coverage Timeline\n\n");
    document.push_str(&monthly.join("\n"));
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn story(title: &str, date: &str, topic: &str, places: &[&str]) -> Story {
        let mut story = Story::new(title, "content").with_date(date);
        if !topic.is_empty() {
            story.extra.insert("topic".to_string(), json!(topic));
        }
        story.extra.insert("places".to_string(), json!(places));
        story
    }

    #[test]
    fn test_normalize_author_strips_emails_and_splits() {
        assert_eq!(
            normalize_author("Jane Doe jdoe@example.com"),
            vec!["Jane Doe"]
        );
        assert_eq!(
            normalize_author("Jane Doe and John Smith; Bob Lee, Ann Ray"),
            vec!["Jane Doe", "John Smith", "Bob Lee", "Ann Ray"]
        );
        assert_eq!(normalize_author("Alexander Randall"), vec!["Alexander Randall"]);
        assert!(normalize_author("").is_empty());
        assert!(normalize_author("jdoe@example.com").is_empty());
    }

    #[test]
    fn test_period_display() {
        assert_eq!(
            Period::Month {
                year: 2023,
                month: 1
            }
            .to_string(),
            "January 2023"
        );
        assert_eq!(Period::Year(2023).to_string(), "2023");
        assert_eq!(Period::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_bucket_by_period_keeps_unknown_last() {
        let stories = vec![
            Story::new("undated", "x"),
            story("a", "2023-01-15", "", &[]),
            story("b", "2023-02-01", "", &[]),
            Story::new("mangled", "x").with_date("2023-02-30"),
            story("c", "2023-01-20", "", &[]),
        ];
        let buckets = bucket_by_period(stories.iter(), Granularity::Month);
        let periods: Vec<Period> = buckets.keys().copied().collect();
        assert_eq!(
            periods,
            vec![
                Period::Month {
                    year: 2023,
                    month: 1
                },
                Period::Month {
                    year: 2023,
                    month: 2
                },
                Period::Unknown
            ]
        );
        assert_eq!(buckets[&Period::Unknown].len(), 2);

        let years = bucket_by_period(stories.iter(), Granularity::Year);
        assert_eq!(years[&Period::Year(2023)].len(), 3);
        assert_eq!(years[&Period::Unknown].len(), 2);
    }

    #[test]
    fn test_chronicle_layout() {
        let jan = story("Blaze on Main St", "2023-01-15", "Public Safety", &["Easton"])
            .with_author("Jane Doe");
        let feb = story("Budget passes", "2023-02-01", "Local government", &["Easton"]);
        let undated = Story::new("No date here", "x");

        let document = render_chronicle(&[feb, undated, jan], DEFAULT_TOP_N);

        assert!(document.starts_with("# Beat Book (Chronological)\n\n"));
        assert!(document.contains(
            "This beat book summarizes coverage over time based on story metadata.\n\n"
        ));
        assert!(document.contains("## Topic Trends Over Time\n"));
        assert!(document.contains("## Location Focus Over Time\n"));
        assert!(document.contains("## Newsroom and Bylines Over Time\n"));
        assert!(document.contains("- 2023: Public Safety (1), Local government (1)\n"));
        assert!(document.contains("# Monthly Coverage Timeline\n\n"));
        assert!(document.contains("## January 2023\n"));
        assert!(document.contains("- Top topics: Public Safety (1)\n"));
        assert!(document.contains("- Top places: Easton (1)\n"));
        assert!(document.contains("- Top organizations: None\n"));
        assert!(document.contains("- Top bylines: Jane Doe (1)\n"));
        assert!(document.contains("- Sample stories:\n  - Blaze on Main St\n"));
        assert!(document.contains("## Unknown\n"));

        let january = document.find("## January 2023").unwrap();
        let february = document.find("## February 2023").unwrap();
        let unknown = document.find("## Unknown").unwrap();
        assert!(january < february && february < unknown);
    }

    #[test]
    fn test_top_n_caps_every_list() {
        let stories = vec![
            story("a", "2023-01-01", "", &["Easton", "Oxford"]),
            story("b", "2023-01-02", "", &["Easton", "Trappe"]),
        ];
        let document = render_chronicle(&stories, 2);
        assert!(document.contains("- Top places: Easton (2), Oxford (1)\n"));
        assert!(!document.contains("Trappe"));
    }

    #[test]
    fn test_sample_stories_capped_at_three() {
        let stories: Vec<Story> = (0..5)
            .map(|i| story(&format!("Story {i}"), "2023-01-10", "", &[]))
            .collect();
        let document = render_chronicle(&stories, DEFAULT_TOP_N);
        let samples = document
            .lines()
            .filter(|line| line.starts_with("  - "))
            .count();
        assert_eq!(samples, 3);
        assert!(document.contains("  - Story 0\n"));
        assert!(!document.contains("Story 3"));
    }

    #[test]
    fn test_new_bylines_list_debuts_only() {
        let early = story("a", "2022-06-01", "", &[]).with_author("Ann Lee");
        let late_one = story("b", "2023-06-01", "", &[]).with_author("Ann Lee");
        let late_two = story("c", "2023-06-02", "", &[]).with_author("Bob Orr");

        let document = render_chronicle(&[early, late_one, late_two], DEFAULT_TOP_N);

        // Topic and location trends emit per-year lines too, so scope
        // the search to the newsroom section.
        let newsroom = &document[document.find("## Newsroom and Bylines Over Time").unwrap()..];
        let lines: Vec<&str> = newsroom.lines().collect();
        let year_2022 = lines.iter().find(|l| l.starts_with("- 2022: ")).unwrap();
        let year_2023 = lines.iter().find(|l| l.starts_with("- 2023: ")).unwrap();
        assert!(year_2022.ends_with("| New bylines: Ann Lee"));
        assert!(year_2023.ends_with("| New bylines: Bob Orr"));
    }

    #[test]
    fn test_untitled_stories_get_a_placeholder() {
        let document = render_chronicle(&[story("", "2023-01-01", "", &[])], DEFAULT_TOP_N);
        assert!(document.contains("  - Untitled\n"));
    }
}
