//! Expansion-token resolution.
//!
//! The token → joins/fields mapping is a static rule table; nothing here
//! looks at stored data. Resolution output is set-based, so duplicate and
//! reordered tokens resolve to the same plan.

use super::{QueryError, QueryResult};
use crate::repo::family::EntityFamily;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Left-outer joins the composer knows how to add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JoinKind {
    /// `countries.iso_alpha2 = base.country_code`.
    Country,
    /// Canonical `ADM1` admin division for `(country_code, admin1_code)`.
    Admin1,
    /// Short, non-preferred alternate name of the joined `ADM1` row.
    Admin1AlternateName,
}

impl JoinKind {
    /// Join that must be present for this one to make sense.
    pub fn depends_on(self) -> Option<JoinKind> {
        match self {
            Self::Admin1AlternateName => Some(Self::Admin1),
            Self::Country | Self::Admin1 => None,
        }
    }
}

/// Extra output columns contributed by joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExtraField {
    CountryName,
    PostalCodeRegex,
    Admin1Name,
}

impl ExtraField {
    /// Output column alias.
    pub fn column(self) -> &'static str {
        match self {
            Self::CountryName => "country_name",
            Self::PostalCodeRegex => "postal_code_regex",
            Self::Admin1Name => "admin1_name",
        }
    }

    /// Join the field is read from.
    pub fn source_join(self) -> JoinKind {
        match self {
            Self::CountryName | Self::PostalCodeRegex => JoinKind::Country,
            Self::Admin1Name => JoinKind::Admin1,
        }
    }
}

/// Typed expansion token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Expansion {
    Country,
    Admin1,
    /// `admin1`, with the display name taken from localized alternate names.
    Admin1Localized,
}

struct ExpansionRule {
    expansion: Expansion,
    token: &'static str,
    joins: &'static [JoinKind],
    fields: &'static [ExtraField],
}

const EXPANSION_RULES: &[ExpansionRule] = &[
    ExpansionRule {
        expansion: Expansion::Country,
        token: "country",
        joins: &[JoinKind::Country],
        fields: &[ExtraField::CountryName, ExtraField::PostalCodeRegex],
    },
    ExpansionRule {
        expansion: Expansion::Admin1,
        token: "admin1",
        joins: &[JoinKind::Admin1],
        fields: &[ExtraField::Admin1Name],
    },
    ExpansionRule {
        expansion: Expansion::Admin1Localized,
        token: "admin1_localized",
        joins: &[JoinKind::Admin1, JoinKind::Admin1AlternateName],
        fields: &[ExtraField::Admin1Name],
    },
];

impl Expansion {
    pub fn token(self) -> &'static str {
        self.rule().token
    }

    fn rule(self) -> &'static ExpansionRule {
        match self {
            Self::Country => &EXPANSION_RULES[0],
            Self::Admin1 => &EXPANSION_RULES[1],
            Self::Admin1Localized => &EXPANSION_RULES[2],
        }
    }
}

impl FromStr for Expansion {
    type Err = QueryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        EXPANSION_RULES
            .iter()
            .find(|rule| rule.token.eq_ignore_ascii_case(normalized))
            .map(|rule| rule.expansion)
            .ok_or_else(|| QueryError::UnknownExpansion(normalized.to_string()))
    }
}

impl Display for Expansion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Joins and fields required to satisfy a set of expansions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionPlan {
    pub joins: BTreeSet<JoinKind>,
    pub fields: BTreeSet<ExtraField>,
}

impl ExpansionPlan {
    pub fn from_expansions<'a, I>(expansions: I) -> Self
    where
        I: IntoIterator<Item = &'a Expansion>,
    {
        let mut plan = Self::default();
        for expansion in expansions {
            let rule = expansion.rule();
            plan.joins.extend(rule.joins.iter().copied());
            plan.fields.extend(rule.fields.iter().copied());
        }
        plan
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty() && self.fields.is_empty()
    }

    /// Drops joins the family does not support, joins whose prerequisite was
    /// dropped, and fields whose source join is gone.
    ///
    /// This is how the admin-division family avoids joining `ADM1` onto itself.
    pub fn restricted_to(&self, family: &EntityFamily) -> Self {
        let supported: BTreeSet<JoinKind> = self
            .joins
            .iter()
            .copied()
            .filter(|join| family.supports(*join))
            .collect();
        let joins: BTreeSet<JoinKind> = supported
            .iter()
            .copied()
            .filter(|join| join.depends_on().map_or(true, |dep| supported.contains(&dep)))
            .collect();
        let fields = self
            .fields
            .iter()
            .copied()
            .filter(|field| joins.contains(&field.source_join()))
            .collect();
        Self { joins, fields }
    }
}

/// Parses raw tokens into typed expansions.
///
/// # Errors
/// - `UnknownExpansion` for the first token that matches no rule. Blank
///   tokens (e.g. from a trailing comma) are skipped.
pub fn parse_expansions<I, S>(tokens: I) -> QueryResult<BTreeSet<Expansion>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut expansions = BTreeSet::new();
    for token in tokens {
        let token = token.as_ref();
        if token.trim().is_empty() {
            continue;
        }
        expansions.insert(token.parse::<Expansion>()?);
    }
    Ok(expansions)
}

/// Resolves raw expansion tokens into the joins and fields they require.
pub fn resolve<I, S>(tokens: I) -> QueryResult<ExpansionPlan>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let expansions = parse_expansions(tokens)?;
    Ok(ExpansionPlan::from_expansions(&expansions))
}
