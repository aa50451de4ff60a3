//! Embedded seed dataset: approximate reported figures (billions USD) for the
//! tracked universe, Q1 2021 through Q3 2024. Used when every live fetch
//! strategy fails and in offline mode.
//!
//! The CSV is compiled in and parsed through the production tabular parser,
//! so the fallback path exercises exactly the code the live path uses.

use crate::error::ParseError;
use crate::models::CompanySeries;
use crate::parser::parse_delimited;

const SEED_CSV: &str = include_str!("../../data/seed.csv");

/// Parse the embedded dataset into company series.
pub fn seed_series() -> Result<Vec<CompanySeries>, ParseError> {
    parse_delimited(SEED_CSV)
}
