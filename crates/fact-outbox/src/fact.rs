//! The fact record and its wire-form projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One unit of data to deliver to the fact intake API.
///
/// Fields are fixed at construction. Delivery state (attempts, outcome)
/// lives in the buffer and sender, never on the record itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// First day of the reporting period.
    pub period_start: NaiveDate,
    /// Last day of the reporting period.
    pub period_end: NaiveDate,
    /// Reporting period granularity label (e.g. "month").
    pub period_key: String,
    /// Target indicator identifier.
    pub indicator_to_mo_id: i64,
    /// Sub-indicator identifier carried by the record; not sent on the wire.
    pub indicator_to_mo_fact_id: i64,
    /// Numeric value of the fact.
    pub value: i64,
    /// Timestamp the fact applies to.
    pub fact_time: NaiveDate,
    /// Whether this is a plan value rather than an actual.
    pub is_plan: bool,
    /// Identifier of the acting user.
    pub auth_user_id: i64,
    /// Free-text comment.
    pub comment: String,
}

impl Fact {
    /// Project the record onto the `save_fact` form contract.
    ///
    /// `indicator_to_mo_fact_id` is always sent as the literal `"0"`,
    /// regardless of the record's own field. `is_plan` is encoded as
    /// `"1"`/`"0"`.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("period_start", self.period_start.to_string()),
            ("period_end", self.period_end.to_string()),
            ("period_key", self.period_key.clone()),
            ("indicator_to_mo_id", self.indicator_to_mo_id.to_string()),
            ("indicator_to_mo_fact_id", "0".to_string()),
            ("value", self.value.to_string()),
            ("fact_time", self.fact_time.to_string()),
            ("is_plan", if self.is_plan { "1" } else { "0" }.to_string()),
            ("auth_user_id", self.auth_user_id.to_string()),
            ("comment", self.comment.clone()),
        ]
    }
}
