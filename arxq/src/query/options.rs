//! Trailing options extracted from the token stream before parsing:
//! result cap, sort specification, and date filters.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::fields::{SortCriterion, SortOrder};

pub const DEFAULT_RESULT_COUNT: u32 = 10;
pub const RESULT_COUNT_LIMIT: u32 = 1000;

/// Control parameters separated from content tokens. Defaults apply when
/// the input carries no corresponding token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub max_results: u32,
    pub sort_by: SortCriterion,
    pub sort_order: SortOrder,
    /// Lower submission-date bound, local time (`>YYYYMMDD[HHMM[SS]]`)
    pub since: Option<NaiveDateTime>,
    /// Upper submission-date bound, local time (`<YYYYMMDD[HHMM[SS]]`)
    pub until: Option<NaiveDateTime>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_RESULT_COUNT,
            sort_by: SortCriterion::SubmittedDate,
            sort_order: SortOrder::Descending,
            since: None,
            until: None,
        }
    }
}

impl SearchOptions {
    pub fn has_date_filter(&self) -> bool {
        self.since.is_some() || self.until.is_some()
    }
}

/// Parse a date literal in one of the three accepted digit forms:
/// `YYYYMMDD`, `YYYYMMDDHHMM`, `YYYYMMDDHHMMSS`. Returns None for any
/// other length or a calendar-invalid value.
pub fn parse_date_literal(digits: &str) -> Option<NaiveDateTime> {
    match digits.len() {
        8 => NaiveDate::parse_from_str(digits, "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0),
        12 => NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M").ok(),
        14 => NaiveDateTime::parse_from_str(digits, "%Y%m%d%H%M%S").ok(),
        _ => None,
    }
}
