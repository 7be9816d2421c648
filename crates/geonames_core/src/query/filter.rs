//! Declarative filter for Geoname-family queries.

use super::expansion::{parse_expansions, Expansion};
use super::{QueryError, QueryResult};
use std::collections::BTreeSet;

/// Language used for localized-name expansion when none is given.
pub const DEFAULT_ISO_LANGUAGE: &str = "en";

/// Named, optional constraints for a Geoname-family query.
///
/// Every `None` field imposes no constraint; present fields combine with AND.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeonameFilter {
    pub country_code: Option<String>,
    pub admin1_code: Option<String>,
    pub admin2_code: Option<String>,
    pub admin3_code: Option<String>,
    pub admin4_code: Option<String>,
    /// Inclusive lower bound.
    pub min_population: Option<i64>,
    /// Inclusive upper bound.
    pub max_population: Option<i64>,
    pub feature_class: Option<String>,
    pub feature_code: Option<String>,
    /// Case-insensitive substring of `name`.
    pub name_like: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub expand: BTreeSet<Expansion>,
    /// Only consulted by the localized admin1 expansion.
    pub iso_language: String,
}

impl Default for GeonameFilter {
    fn default() -> Self {
        Self {
            country_code: None,
            admin1_code: None,
            admin2_code: None,
            admin3_code: None,
            admin4_code: None,
            min_population: None,
            max_population: None,
            feature_class: None,
            feature_code: None,
            name_like: None,
            limit: None,
            offset: None,
            expand: BTreeSet::new(),
            iso_language: DEFAULT_ISO_LANGUAGE.to_string(),
        }
    }
}

impl GeonameFilter {
    /// Builds a filter from `key=value` pairs using the public schema keys.
    ///
    /// `expand` takes a comma-separated token list. Empty values are treated
    /// as absent.
    ///
    /// # Errors
    /// - `InvalidFilter` for unknown keys or non-numeric bounds/pagination.
    /// - `UnknownExpansion` for unrecognized expansion tokens.
    pub fn from_pairs<I, K, V>(pairs: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref().trim();
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key {
                "country_code" => filter.country_code = Some(value.to_string()),
                "admin1_code" => filter.admin1_code = Some(value.to_string()),
                "admin2_code" => filter.admin2_code = Some(value.to_string()),
                "admin3_code" => filter.admin3_code = Some(value.to_string()),
                "admin4_code" => filter.admin4_code = Some(value.to_string()),
                "min_population" => filter.min_population = Some(parse_number(key, value)?),
                "max_population" => filter.max_population = Some(parse_number(key, value)?),
                "feature_class" => filter.feature_class = Some(value.to_string()),
                "feature_code" => filter.feature_code = Some(value.to_string()),
                "name_like" => filter.name_like = Some(value.to_string()),
                "limit" => filter.limit = Some(parse_number(key, value)?),
                "offset" => filter.offset = Some(parse_number(key, value)?),
                "expand" => filter.expand.extend(parse_expansions(value.split(','))?),
                "iso_language" => filter.iso_language = value.to_string(),
                other => {
                    return Err(QueryError::InvalidFilter {
                        key: other.to_string(),
                        message: "unknown filter key".to_string(),
                    })
                }
            }
        }
        Ok(filter)
    }

    /// Adds expansions from raw tokens.
    pub fn with_expand_tokens<I, S>(mut self, tokens: I) -> QueryResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.expand.extend(parse_expansions(tokens)?);
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> QueryResult<T>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| QueryError::InvalidFilter {
        key: key.to_string(),
        message: format!("`{value}` is not a valid number: {err}"),
    })
}
