use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Date formats accepted across the corpus. ISO first since that is
/// what the archive exports; the others show up in older files.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a story date string against the known formats.
pub fn parse_story_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

pub fn season_of(date: NaiveDate) -> Season {
    Season::from_month(date.month())
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Extract a year even from dates too mangled to parse fully, as long
/// as the leading token is numeric (e.g. "2023-02-30").
pub fn year_of(raw: &str) -> Option<i32> {
    if let Some(date) = parse_story_date(raw) {
        return Some(date.year());
    }
    raw.trim().split('-').next()?.parse().ok()
}

/// Calendar facts derived from an optional raw date string. Each field
/// is independently `None` when the date is missing or unusable.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarFacts {
    pub year: Option<i32>,
    pub season: Option<Season>,
    pub is_weekend: Option<bool>,
}

pub fn calendar_facts(raw: Option<&str>) -> CalendarFacts {
    let Some(raw) = raw else {
        return CalendarFacts::default();
    };
    let parsed = parse_story_date(raw);
    CalendarFacts {
        year: year_of(raw),
        season: parsed.map(season_of),
        is_weekend: parsed.map(is_weekend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_known_formats() {
        for raw in ["2024-03-02", "2024/03/02", "03/02/2024"] {
            let date = parse_story_date(raw).unwrap();
            assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
        }
        assert!(parse_story_date("March 2, 2024").is_none());
        assert!(parse_story_date("").is_none());
    }

    #[test]
    fn test_season_boundaries() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(5), Season::Spring);
        assert_eq!(Season::from_month(6), Season::Summer);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(9), Season::Fall);
        assert_eq!(Season::from_month(11), Season::Fall);
    }

    #[test]
    fn test_weekend_detection() {
        // 2024-03-02 was a Saturday, 2024-03-04 a Monday.
        assert!(is_weekend(NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()));
        assert!(!is_weekend(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()));
    }

    #[test]
    fn test_year_survives_unparseable_tail() {
        assert_eq!(year_of("2023-02-30"), Some(2023));
        assert_eq!(year_of("garbage"), None);
    }

    #[test]
    fn test_facts_for_missing_date() {
        let facts = calendar_facts(None);
        assert!(facts.year.is_none());
        assert!(facts.season.is_none());
        assert!(facts.is_weekend.is_none());
    }

    #[test]
    fn test_facts_for_valid_date() {
        let facts = calendar_facts(Some("2024-07-14"));
        assert_eq!(facts.year, Some(2024));
        assert_eq!(facts.season, Some(Season::Summer));
        assert_eq!(facts.is_weekend, Some(true));
    }

    #[test]
    fn test_season_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Season::Fall).unwrap(), "\"fall\"");
    }
}
