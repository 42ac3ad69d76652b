//! Identifier and document number generation.
//!
//! Record ids are prefixed UUIDs so they stay unique across plans; document
//! numbers follow the human-readable `BP-`/`PR-` formats with a random
//! four-digit suffix.

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use uuid::Uuid;

/// Builds a new record id such as `bpi-3f2c...`.
#[must_use]
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Internal reference number for a new budget item.
#[must_use]
pub fn internal_no() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("INT-{millis}")
}

fn random_suffix() -> u16 {
    rand::thread_rng().gen_range(1000..=9999)
}

/// Plan number in the form `BP-<year>-<nnnn>`.
#[must_use]
pub fn plan_number(year: i32) -> String {
    format!("BP-{year}-{}", random_suffix())
}

/// Purchase request number in the form `PR-<yyyy><mm>-<nnnn>`.
#[must_use]
pub fn pr_number(date: NaiveDate) -> String {
    format!("PR-{}{:02}-{}", date.year(), date.month(), random_suffix())
}
