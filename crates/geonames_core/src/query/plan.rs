//! Pure filter → SQL plan composition.
//!
//! # Invariants
//! - `compose` is deterministic: equal inputs give byte-equal SQL and params.
//! - Bind parameters appear in `params` in placeholder order.
//! - Results are ordered by `geoname_id` so pagination is stable.
//! - Name matching compares Unicode-lowercased text on both sides.

use super::expansion::{ExpansionPlan, ExtraField, JoinKind};
use super::filter::GeonameFilter;
use crate::db::CASE_FOLD_FN;
use crate::repo::family::{EntityFamily, GEONAME_COLUMNS};
use rusqlite::types::Value;

/// Composed read query for one entity family.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub sql: String,
    pub params: Vec<Value>,
    /// Expansion columns selected after the base columns, in select order.
    pub extra_columns: Vec<ExtraField>,
}

/// Builds the read query for `family` constrained by `filter`.
pub fn compose(family: &EntityFamily, filter: &GeonameFilter) -> QueryPlan {
    let expansion = ExpansionPlan::from_expansions(&filter.expand).restricted_to(family);
    let mut params: Vec<Value> = Vec::new();

    let mut select: Vec<String> = GEONAME_COLUMNS
        .iter()
        .map(|column| format!("base.{column} AS {column}"))
        .collect();
    let extra_columns: Vec<ExtraField> = expansion.fields.iter().copied().collect();
    for field in &extra_columns {
        select.push(format!(
            "{} AS {}",
            field_expression(*field, &expansion),
            field.column()
        ));
    }

    let mut sql = format!("SELECT {} FROM {} AS base", select.join(", "), family.table);

    if expansion.joins.contains(&JoinKind::Country) {
        sql.push_str(" LEFT JOIN countries AS country ON country.iso_alpha2 = base.country_code");
    }
    if expansion.joins.contains(&JoinKind::Admin1) {
        sql.push_str(
            " LEFT JOIN admin_divisions AS admin1
                ON admin1.country_code = base.country_code
               AND admin1.admin1_code = base.admin1_code
               AND admin1.feature_code = 'ADM1'",
        );
    }
    if expansion.joins.contains(&JoinKind::Admin1AlternateName) {
        sql.push_str(
            " LEFT JOIN (
                SELECT geoname_id, MIN(alternate_name) AS alternate_name
                FROM alternate_names
                WHERE iso_language = ?
                  AND is_short_name = 1
                  AND is_preferred_name = 0
                GROUP BY geoname_id
            ) AS admin1_alt ON admin1_alt.geoname_id = admin1.geoname_id",
        );
        params.push(Value::Text(filter.iso_language.clone()));
    }

    sql.push_str(" WHERE 1 = 1");
    push_exact(&mut sql, &mut params, "country_code", &filter.country_code);
    push_exact(&mut sql, &mut params, "admin1_code", &filter.admin1_code);
    push_exact(&mut sql, &mut params, "admin2_code", &filter.admin2_code);
    push_exact(&mut sql, &mut params, "admin3_code", &filter.admin3_code);
    push_exact(&mut sql, &mut params, "admin4_code", &filter.admin4_code);
    if let Some(min) = filter.min_population {
        sql.push_str(" AND base.population >= ?");
        params.push(Value::Integer(min));
    }
    if let Some(max) = filter.max_population {
        sql.push_str(" AND base.population <= ?");
        params.push(Value::Integer(max));
    }
    push_exact(&mut sql, &mut params, "feature_class", &filter.feature_class);
    push_exact(&mut sql, &mut params, "feature_code", &filter.feature_code);
    if let Some(fragment) = filter.name_like.as_deref() {
        sql.push_str(&format!(" AND {CASE_FOLD_FN}(base.name) LIKE ? ESCAPE '\\'"));
        params.push(Value::Text(format!(
            "%{}%",
            escape_like(&fragment.to_lowercase())
        )));
    }

    sql.push_str(" ORDER BY base.geoname_id ASC");

    let offset = filter.offset.unwrap_or(0);
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(i64::from(limit)));
        if offset > 0 {
            sql.push_str(" OFFSET ?");
            params.push(Value::Integer(i64::from(offset)));
        }
    } else if offset > 0 {
        sql.push_str(" LIMIT -1 OFFSET ?");
        params.push(Value::Integer(i64::from(offset)));
    }

    QueryPlan {
        sql,
        params,
        extra_columns,
    }
}

fn field_expression(field: ExtraField, expansion: &ExpansionPlan) -> &'static str {
    match field {
        ExtraField::CountryName => "country.country_name",
        ExtraField::PostalCodeRegex => "country.postal_code_regex",
        ExtraField::Admin1Name if expansion.joins.contains(&JoinKind::Admin1AlternateName) => {
            "admin1_alt.alternate_name"
        }
        ExtraField::Admin1Name => "admin1.name",
    }
}

fn push_exact(sql: &mut String, params: &mut Vec<Value>, column: &str, value: &Option<String>) {
    if let Some(value) = value {
        sql.push_str(&format!(" AND base.{column} = ?"));
        params.push(Value::Text(value.clone()));
    }
}

fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for ch in fragment.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
