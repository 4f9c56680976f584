//! Query profile: watch history summarised as structured filter clauses.
//!
//! The clauses are handed to an external query evaluator, which decides how
//! strictly to apply each operator. This module only decides *what* to ask
//! for and in which order.
//!
//! ## Clauses, in precedence order
//! 1. `all` over `Genres`: the top-K genres
//! 2. `any` over `Tags`: the top-K tags
//! 3. `between` over `ProductionYear`: mean year ± window
//! 4. `>` over `CommunityRating`: `max(mean_rating - margin, floor)`
//! 5. (opt-in) `any` over studio names, then directors, writers and actors

use crate::config::QueryProfileConfig;
use crate::error::Result;
use catalog::{ContentItem, PersonKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

pub const FIELD_GENRES: &str = "Genres";
pub const FIELD_TAGS: &str = "Tags";
pub const FIELD_PRODUCTION_YEAR: &str = "ProductionYear";
pub const FIELD_COMMUNITY_RATING: &str = "CommunityRating";
pub const FIELD_STUDIO_NAMES: &str = "Studios.Name";
pub const FIELD_PEOPLE_NAMES: &str = "People.Name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOperator {
    #[serde(rename = "all")]
    All,
    #[serde(rename = "any")]
    Any,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = ">")]
    GreaterThan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Number(f64),
    Text(String),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// One filter clause for the external evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryClause {
    pub operator: QueryOperator,
    pub fields: Vec<String>,
    pub queries: Vec<QueryValue>,
}

impl QueryClause {
    pub fn new(operator: QueryOperator, field: &str, queries: Vec<QueryValue>) -> Self {
        Self {
            operator,
            fields: vec![field.to_string()],
            queries,
        }
    }
}

/// Ordered clauses; earlier clauses take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryProfile {
    pub clauses: Vec<QueryClause>,
}

impl QueryProfile {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// First clause over `field`, if any
    pub fn clause_for(&self, field: &str) -> Option<&QueryClause> {
        self.clauses
            .iter()
            .find(|clause| clause.fields.iter().any(|f| f == field))
    }
}

// =============================================================================
// History statistics
// =============================================================================

/// Frequency tables over the played part of a watch history.
#[derive(Debug, Clone, Default)]
pub struct HistoryStats {
    pub played_count: usize,
    /// Case-folded genre -> number of played items
    pub genres: HashMap<String, usize>,
    /// Case-folded tag -> number of played items
    pub tags: HashMap<String, usize>,
    pub studios: HashMap<String, usize>,
    pub directors: HashMap<String, usize>,
    pub writers: HashMap<String, usize>,
    pub actors: HashMap<String, usize>,
    pub years: HashMap<i32, usize>,
    pub ratings: Vec<f64>,
}

impl HistoryStats {
    /// Aggregate the played items of `items`.
    pub fn from_history<'a>(items: impl IntoIterator<Item = &'a ContentItem>) -> Self {
        let mut stats = Self::default();
        for item in items.into_iter().filter(|item| item.is_played()) {
            stats.played_count += 1;
            for key in item.genre_keys() {
                *stats.genres.entry(key).or_insert(0) += 1;
            }
            for key in item.tag_keys() {
                *stats.tags.entry(key).or_insert(0) += 1;
            }
            for studio in &item.studios {
                bump(&mut stats.studios, &studio.name);
            }
            for person in &item.people {
                match person.kind {
                    PersonKind::Director => bump(&mut stats.directors, &person.name),
                    PersonKind::Writer => bump(&mut stats.writers, &person.name),
                    PersonKind::Actor => bump(&mut stats.actors, &person.name),
                    _ => {}
                }
            }
            if let Some(year) = item.production_year {
                *stats.years.entry(year).or_insert(0) += 1;
            }
            if let Some(rating) = item.community_rating {
                stats.ratings.push(rating);
            }
        }
        stats
    }

    /// Count-weighted mean production year, rounded
    pub fn mean_year(&self) -> Option<i32> {
        let count: usize = self.years.values().sum();
        if count == 0 {
            return None;
        }
        let total: f64 = self
            .years
            .iter()
            .map(|(&year, &n)| f64::from(year) * n as f64)
            .sum();
        Some((total / count as f64).round() as i32)
    }

    /// Mean community rating of the played items that have one
    pub fn mean_rating(&self) -> Option<f64> {
        if self.ratings.is_empty() {
            return None;
        }
        Some(self.ratings.iter().sum::<f64>() / self.ratings.len() as f64)
    }
}

fn bump(counts: &mut HashMap<String, usize>, name: &str) {
    let name = name.trim();
    if !name.is_empty() {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
}

/// The `k` most frequent keys, most frequent first; ties broken by name so
/// the output does not depend on hash order.
pub fn top_keys(counts: &HashMap<String, usize>, k: usize) -> Vec<String> {
    let mut entries: Vec<(&String, &usize)> = counts.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    entries.into_iter().take(k).map(|(key, _)| key.clone()).collect()
}

// =============================================================================
// Extraction
// =============================================================================

/// Derives a [`QueryProfile`] from watch history.
#[derive(Debug, Clone)]
pub struct QueryProfileExtractor {
    config: QueryProfileConfig,
}

impl QueryProfileExtractor {
    pub fn new(config: QueryProfileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn extract<'a>(&self, items: impl IntoIterator<Item = &'a ContentItem>) -> QueryProfile {
        self.extract_from_stats(&HistoryStats::from_history(items))
    }

    pub fn extract_from_stats(&self, stats: &HistoryStats) -> QueryProfile {
        let mut clauses = Vec::new();

        let genres = top_keys(&stats.genres, self.config.top_genres);
        if !genres.is_empty() {
            clauses.push(text_clause(QueryOperator::All, FIELD_GENRES, genres));
        }

        let tags = top_keys(&stats.tags, self.config.top_tags);
        if !tags.is_empty() {
            clauses.push(text_clause(QueryOperator::Any, FIELD_TAGS, tags));
        }

        if let Some(year) = stats.mean_year() {
            let (year, window) = (f64::from(year), f64::from(self.config.year_window));
            clauses.push(QueryClause::new(
                QueryOperator::Between,
                FIELD_PRODUCTION_YEAR,
                vec![(year - window).into(), (year + window).into()],
            ));
        }

        if let Some(mean) = stats.mean_rating() {
            let minimum = (mean - self.config.rating_margin).max(self.config.rating_floor);
            clauses.push(QueryClause::new(
                QueryOperator::GreaterThan,
                FIELD_COMMUNITY_RATING,
                vec![minimum.into()],
            ));
        }

        if self.config.include_studios {
            let studios = top_keys(&stats.studios, self.config.top_studios);
            if !studios.is_empty() {
                clauses.push(text_clause(QueryOperator::Any, FIELD_STUDIO_NAMES, studios));
            }
        }

        if self.config.include_people {
            for people in [&stats.directors, &stats.writers, &stats.actors] {
                let names = top_keys(people, self.config.top_people);
                if !names.is_empty() {
                    clauses.push(text_clause(QueryOperator::Any, FIELD_PEOPLE_NAMES, names));
                }
            }
        }

        debug!(
            "Extracted query profile with {} clauses from {} played items",
            clauses.len(),
            stats.played_count
        );
        QueryProfile { clauses }
    }
}

impl Default for QueryProfileExtractor {
    fn default() -> Self {
        Self {
            config: QueryProfileConfig::default(),
        }
    }
}

fn text_clause(operator: QueryOperator, field: &str, values: Vec<String>) -> QueryClause {
    QueryClause {
        operator,
        fields: vec![field.to_string()],
        queries: values.into_iter().map(QueryValue::Text).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Person, Studio};

    fn played(id: &str, genres: &[&str], year: Option<i32>, rating: Option<f64>) -> ContentItem {
        let mut item = ContentItem {
            genres: genres.iter().map(|g| g.to_string()).collect(),
            production_year: year,
            community_rating: rating,
            ..ContentItem::new(id, id)
        };
        item.user_data.played = true;
        item
    }

    fn history() -> Vec<ContentItem> {
        vec![
            played("1", &["Action", "Thriller"], Some(1990), Some(8.0)),
            played("2", &["Action"], Some(2000), Some(7.0)),
            played("3", &["Drama", "action"], Some(2000), Some(9.0)),
            played("4", &["Comedy"], None, None),
        ]
    }

    #[test]
    fn test_history_stats() {
        let stats = HistoryStats::from_history(&history());
        assert_eq!(stats.played_count, 4);
        assert_eq!(stats.genres["action"], 3);
        assert_eq!(stats.years[&2000], 2);
        assert_eq!(stats.ratings.len(), 3);
        // (1990 + 2000 * 2) / 3 = 1996.67
        assert_eq!(stats.mean_year(), Some(1997));
        assert!((stats.mean_rating().unwrap() - 8.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_keys_are_deterministic() {
        let stats = HistoryStats::from_history(&history());
        // action (3), then comedy/drama/thriller tie at 1 and sort by name
        assert_eq!(top_keys(&stats.genres, 3), vec!["action", "comedy", "drama"]);
        assert_eq!(top_keys(&stats.genres, 0), Vec::<String>::new());
    }

    #[test]
    fn test_profile_clause_order_and_values() {
        let profile = QueryProfileExtractor::default().extract(&history());
        let operators: Vec<QueryOperator> = profile.clauses.iter().map(|c| c.operator).collect();
        assert_eq!(
            operators,
            vec![QueryOperator::All, QueryOperator::Between, QueryOperator::GreaterThan]
        );

        let years = profile.clause_for(FIELD_PRODUCTION_YEAR).unwrap();
        assert_eq!(years.queries, vec![QueryValue::Number(1992.0), QueryValue::Number(2002.0)]);

        let rating = profile.clause_for(FIELD_COMMUNITY_RATING).unwrap();
        assert_eq!(rating.queries, vec![QueryValue::Number(7.5)]);

        // No tags anywhere in the history
        assert!(profile.clause_for(FIELD_TAGS).is_none());
    }

    #[test]
    fn test_rating_floor() {
        let items = vec![
            played("1", &["Horror"], None, Some(5.0)),
            played("2", &["Horror"], None, Some(5.5)),
        ];
        let profile = QueryProfileExtractor::default().extract(&items);
        let rating = profile.clause_for(FIELD_COMMUNITY_RATING).unwrap();
        assert_eq!(rating.queries, vec![QueryValue::Number(6.0)]);
    }

    #[test]
    fn test_year_window_at_extreme_years() {
        let items = vec![played("1", &["Western"], Some(i32::MAX), None)];
        let profile = QueryProfileExtractor::default().extract(&items);
        let years = profile.clause_for(FIELD_PRODUCTION_YEAR).unwrap();
        let upper = f64::from(i32::MAX) + 5.0;
        assert_eq!(
            years.queries,
            vec![QueryValue::Number(f64::from(i32::MAX) - 5.0), QueryValue::Number(upper)]
        );

        let items = vec![played("1", &["Western"], Some(i32::MIN), None)];
        let profile = QueryProfileExtractor::default().extract(&items);
        let years = profile.clause_for(FIELD_PRODUCTION_YEAR).unwrap();
        assert_eq!(years.queries[0], QueryValue::Number(f64::from(i32::MIN) - 5.0));
    }

    #[test]
    fn test_oversized_year_window_is_rejected() {
        let config = QueryProfileConfig {
            year_window: i32::MAX,
            ..QueryProfileConfig::default()
        };
        assert!(QueryProfileExtractor::new(config).is_err());

        let config = QueryProfileConfig {
            year_window: crate::config::MAX_YEAR_WINDOW,
            ..QueryProfileConfig::default()
        };
        let extractor = QueryProfileExtractor::new(config).unwrap();
        let profile = extractor.extract(&[played("1", &["Western"], Some(2000), None)]);
        let years = profile.clause_for(FIELD_PRODUCTION_YEAR).unwrap();
        assert_eq!(years.queries, vec![QueryValue::Number(1500.0), QueryValue::Number(2500.0)]);
    }

    #[test]
    fn test_people_and_studios_are_opt_in() {
        let mut item = played("1", &["Crime"], Some(1995), None);
        item.studios = vec![Studio { id: "s1".to_string(), name: "Regency".to_string() }];
        item.people = vec![
            Person {
                id: "d1".to_string(),
                name: "Michael Mann".to_string(),
                kind: PersonKind::Director,
            },
            Person {
                id: "a1".to_string(),
                name: "Al Pacino".to_string(),
                kind: PersonKind::Actor,
            },
        ];
        let items = vec![item];

        let stats = HistoryStats::from_history(&items);
        assert_eq!(stats.directors["Michael Mann"], 1);
        assert!(stats.writers.is_empty());

        let default_profile = QueryProfileExtractor::default().extract(&items);
        assert!(default_profile.clause_for(FIELD_STUDIO_NAMES).is_none());
        assert!(default_profile.clause_for(FIELD_PEOPLE_NAMES).is_none());

        let config = QueryProfileConfig::default().with_people_and_studios();
        let extractor = QueryProfileExtractor::new(config).unwrap();
        let profile = extractor.extract(&items);
        assert!(profile.clause_for(FIELD_STUDIO_NAMES).is_some());
        // director and actor clauses, no writer clause
        let people_clauses = profile
            .clauses
            .iter()
            .filter(|c| c.fields[0] == FIELD_PEOPLE_NAMES)
            .count();
        assert_eq!(people_clauses, 2);
    }

    #[test]
    fn test_empty_history_gives_empty_profile() {
        let mut item = played("1", &["Action"], Some(2000), Some(8.0));
        item.user_data.played = false;
        let profile = QueryProfileExtractor::default().extract(&[item]);
        assert!(profile.is_empty());
    }

    #[test]
    fn test_profile_serializes_as_clause_array() {
        let profile = QueryProfile {
            clauses: vec![QueryClause::new(
                QueryOperator::GreaterThan,
                FIELD_COMMUNITY_RATING,
                vec![6.5.into()],
            )],
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert_eq!(json, r#"[{"operator":">","fields":["CommunityRating"],"queries":[6.5]}]"#);
    }
}
