//! Read-path query planning for Geoname-family entities.
//!
//! # Responsibility
//! - Resolve client expansion tokens into joins and extra output fields.
//! - Turn an immutable filter into a composed SQL plan.
//! - Assemble joined rows into enriched read models.
//!
//! # Invariants
//! - Planning is pure: no connection is touched until a plan is executed.
//! - Expansion joins are left-outer and never remove a base row.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod assemble;
pub mod expansion;
pub mod filter;
pub mod plan;

pub type QueryResult<T> = Result<T, QueryError>;

/// Client-side query errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    UnknownExpansion(String),
    InvalidFilter { key: String, message: String },
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownExpansion(token) => write!(f, "unknown expansion token `{token}`"),
            Self::InvalidFilter { key, message } => write!(f, "invalid filter `{key}`: {message}"),
        }
    }
}

impl Error for QueryError {}
