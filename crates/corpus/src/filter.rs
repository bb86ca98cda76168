use std::fmt;

use serde::{Deserialize, Serialize};

use crate::story::Story;

/// Eligibility rules for oracle-backed stages. Recurring features and
/// listings sections waste oracle calls, so they are dropped up front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Case-insensitive substrings matched against the title.
    pub title_patterns: Vec<String>,
    /// Literal markers matched against the body text.
    pub section_markers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            title_patterns: vec![
                "TODAY IN HISTORY".to_string(),
                "RELIGION CALENDAR".to_string(),
                "MID-SHORE CALENDAR".to_string(),
                "OBITUARY".to_string(),
            ],
            section_markers: vec![
                "Section: Calendar".to_string(),
                "Section: Columns".to_string(),
                "Section: Letters".to_string(),
            ],
        }
    }
}

impl FilterConfig {
    /// Returns the reason a story should be excluded, or `None` if it
    /// passes the filter.
    pub fn exclusion_reason(&self, story: &Story) -> Option<ExcludeReason> {
        let title_upper = story.title.to_uppercase();
        for pattern in &self.title_patterns {
            if title_upper.contains(pattern.as_str()) {
                return Some(ExcludeReason::TitlePattern(pattern.clone()));
            }
        }
        for marker in &self.section_markers {
            if story.content.contains(marker.as_str()) {
                return Some(ExcludeReason::SectionMarker(marker.clone()));
            }
        }
        None
    }

    /// Split a corpus into kept stories and excluded records. Relative
    /// order within `kept` matches the input order.
    pub fn apply(&self, stories: Vec<Story>) -> FilterOutcome {
        let mut kept = Vec::with_capacity(stories.len());
        let mut excluded = Vec::new();
        for story in stories {
            match self.exclusion_reason(&story) {
                Some(reason) => excluded.push(ExcludedStory {
                    title: story.title,
                    reason,
                }),
                None => kept.push(story),
            }
        }
        FilterOutcome { kept, excluded }
    }
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<Story>,
    pub excluded: Vec<ExcludedStory>,
}

#[derive(Debug, Clone)]
pub struct ExcludedStory {
    pub title: String,
    pub reason: ExcludeReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeReason {
    TitlePattern(String),
    SectionMarker(String),
}

impl fmt::Display for ExcludeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExcludeReason::TitlePattern(p) => write!(f, "title matches '{}'", p),
            ExcludeReason::SectionMarker(m) => write!(f, "body contains '{}'", m),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Story> {
        vec![
            Story::new("Council approves budget", "The county council..."),
            Story::new("Today in History: March 2", "On this date..."),
            Story::new("Bridge reopens", "Section: Columns\nOpinion piece..."),
            Story::new("Obituary: Jane Doe", "Jane Doe, 84, of Easton..."),
            Story::new("Storm damages marina", "High winds on Saturday..."),
        ]
    }

    #[test]
    fn test_title_patterns_match_case_insensitively() {
        let outcome = FilterConfig::default().apply(corpus());
        let kept: Vec<&str> = outcome.kept.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(kept, vec!["Council approves budget", "Storm damages marina"]);
        assert_eq!(outcome.excluded.len(), 3);
    }

    #[test]
    fn test_exclusion_reasons_are_specific() {
        let outcome = FilterConfig::default().apply(corpus());
        assert_eq!(
            outcome.excluded[0].reason,
            ExcludeReason::TitlePattern("TODAY IN HISTORY".to_string())
        );
        assert_eq!(
            outcome.excluded[1].reason,
            ExcludeReason::SectionMarker("Section: Columns".to_string())
        );
    }

    #[test]
    fn test_section_markers_are_case_sensitive() {
        let story = Story::new("Letters to the editor", "section: letters\n...");
        assert!(FilterConfig::default().exclusion_reason(&story).is_none());
    }

    #[test]
    fn test_empty_config_keeps_everything() {
        let config = FilterConfig {
            title_patterns: vec![],
            section_markers: vec![],
        };
        let outcome = config.apply(corpus());
        assert_eq!(outcome.kept.len(), 5);
        assert!(outcome.excluded.is_empty());
    }
}
