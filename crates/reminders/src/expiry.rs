//! Expiry resolution and reminder thresholds
//!
//! All comparisons happen on calendar dates. "Today" and every resolved
//! expiry date are midnight-normalised before the day offset is taken, so
//! `ceil((expiry - today) / 1 day)` is simply the difference in days.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use grocify_core::GrocifyError;
use serde::{Deserialize, Serialize};

/// Default reminder thresholds: five days before expiry and the day itself
pub const DEFAULT_THRESHOLDS: [i64; 2] = [5, 0];

/// Calendar date of `now` in its own timezone
pub fn normalize_to_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    now.date_naive()
}

/// Resolve the date an item stops being usable
///
/// An explicit expiry date wins. Otherwise purchase date plus shelf life is
/// used when both are present. Returns `None` when neither is available or
/// the sum leaves the representable date range.
pub fn resolve_expiry(
    expiry_date: Option<NaiveDate>,
    purchase_date: Option<NaiveDate>,
    shelf_life_days: Option<i32>,
) -> Option<NaiveDate> {
    if expiry_date.is_some() {
        return expiry_date;
    }

    match (purchase_date, shelf_life_days) {
        (Some(purchased), Some(days)) => {
            purchased.checked_add_signed(Duration::days(i64::from(days)))
        }
        _ => None,
    }
}

/// Signed number of calendar days from `today` until `expiry`
pub fn day_offset(today: NaiveDate, expiry: NaiveDate) -> i64 {
    (expiry - today).num_days()
}

/// Human phrasing for a day offset, e.g. "expires today"
pub fn describe_offset(offset: i64) -> String {
    match offset {
        0 => "expires today".to_string(),
        1 => "expires in 1 day".to_string(),
        n if n > 1 => format!("expires in {} days", n),
        -1 => "expired 1 day ago".to_string(),
        n => format!("expired {} days ago", -n),
    }
}

/// Outcome of evaluating one item against the thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// No usable expiry information
    Unresolvable,
    /// Resolved, but the offset is not a reminder threshold
    NotDue { offset: i64 },
    /// Resolved and the offset matches a threshold
    Due { offset: i64 },
}

impl Evaluation {
    pub fn is_due(&self) -> bool {
        matches!(self, Evaluation::Due { .. })
    }
}

/// Set of day offsets that trigger a reminder
///
/// Stored sorted descending without duplicates. Every threshold is
/// non-negative: reminders are only sent before or on the expiry day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderThresholds {
    days: Vec<i64>,
}

impl Default for ReminderThresholds {
    fn default() -> Self {
        Self {
            days: DEFAULT_THRESHOLDS.to_vec(),
        }
    }
}

impl ReminderThresholds {
    /// Build a threshold set from raw day counts
    ///
    /// # Errors
    ///
    /// Returns a validation error when the list is empty or holds a negative
    /// value.
    pub fn from_days(days: impl IntoIterator<Item = i64>) -> Result<Self, GrocifyError> {
        let mut days: Vec<i64> = days.into_iter().collect();

        if days.is_empty() {
            return Err(GrocifyError::validation(
                "thresholds",
                "at least one reminder threshold is required",
            ));
        }

        if let Some(negative) = days.iter().find(|d| **d < 0) {
            return Err(GrocifyError::validation(
                "thresholds",
                format!("threshold {} is negative", negative),
            ));
        }

        days.sort_unstable_by(|a, b| b.cmp(a));
        days.dedup();

        Ok(Self { days })
    }

    /// Whether an offset triggers a reminder
    pub fn contains(&self, offset: i64) -> bool {
        self.days.contains(&offset)
    }

    /// Thresholds, largest first
    pub fn days(&self) -> &[i64] {
        &self.days
    }

    /// Evaluate a single item's dates against this set
    pub fn evaluate(
        &self,
        today: NaiveDate,
        expiry_date: Option<NaiveDate>,
        purchase_date: Option<NaiveDate>,
        shelf_life_days: Option<i32>,
    ) -> Evaluation {
        let Some(expiry) = resolve_expiry(expiry_date, purchase_date, shelf_life_days) else {
            return Evaluation::Unresolvable;
        };

        let offset = day_offset(today, expiry);
        if self.contains(offset) {
            Evaluation::Due { offset }
        } else {
            Evaluation::NotDue { offset }
        }
    }
}
