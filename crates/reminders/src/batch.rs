//! Per-user grouping of due items into notification batches

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;
use uuid::Uuid;

use crate::expiry::{describe_offset, Evaluation, ReminderThresholds};
use crate::store::ReminderCandidate;

/// One line of a reminder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub item_id: Uuid,
    pub name: String,
    pub category: String,
    pub day_offset: i64,
}

impl BatchEntry {
    /// "expires today" or "expires in N days" for this entry alone
    pub fn phrase(&self) -> String {
        describe_offset(self.day_offset)
    }
}

/// All due items of one user, soonest expiry first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationBatch {
    pub user_id: Uuid,
    pub email: String,
    pub entries: Vec<BatchEntry>,
}

impl NotificationBatch {
    /// Item names in batch order
    pub fn item_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Whether any entry expires on the evaluation day
    pub fn has_expiring_today(&self) -> bool {
        self.entries.iter().any(|e| e.day_offset == 0)
    }
}

/// Result of evaluating a full candidate set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPlan {
    pub batches: Vec<NotificationBatch>,
    pub scanned: usize,
    pub unresolvable: usize,
    pub qualifying: usize,
}

/// Evaluate candidates for `today` and group the due ones by owner
///
/// Each item is checked independently, so a user can receive entries for
/// several thresholds in one batch. Duplicate rows for the same item are
/// collapsed before evaluation and count once towards every counter
/// except `scanned`. Entries are ordered by ascending day offset, then by name.
/// Users without due items get no batch.
pub fn build_batches(
    candidates: &[ReminderCandidate],
    today: NaiveDate,
    thresholds: &ReminderThresholds,
) -> BatchPlan {
    let mut grouped: BTreeMap<Uuid, NotificationBatch> = BTreeMap::new();
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut plan = BatchPlan {
        scanned: candidates.len(),
        ..Default::default()
    };

    for candidate in candidates {
        if !seen.insert(candidate.item_id) {
            continue;
        }

        let offset = match thresholds.evaluate(
            today,
            candidate.expiry_date,
            candidate.purchase_date,
            candidate.shelf_life_days,
        ) {
            Evaluation::Due { offset } => offset,
            Evaluation::NotDue { .. } => continue,
            Evaluation::Unresolvable => {
                debug!(item_id = %candidate.item_id, "Skipping item without expiry information");
                plan.unresolvable += 1;
                continue;
            }
        };

        plan.qualifying += 1;

        grouped
            .entry(candidate.user_id)
            .or_insert_with(|| NotificationBatch {
                user_id: candidate.user_id,
                email: candidate.email.clone(),
                entries: Vec::new(),
            })
            .entries
            .push(BatchEntry {
                item_id: candidate.item_id,
                name: candidate.name.clone(),
                category: candidate.category.clone(),
                day_offset: offset,
            });
    }

    plan.batches = grouped
        .into_values()
        .map(|mut batch| {
            batch
                .entries
                .sort_by(|a, b| a.day_offset.cmp(&b.day_offset).then_with(|| a.name.cmp(&b.name)));
            batch
        })
        .collect();

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn candidate(user_id: Uuid, name: &str, expires_in: Option<i64>) -> ReminderCandidate {
        ReminderCandidate {
            item_id: Uuid::new_v4(),
            name: name.to_string(),
            category: "Produce".to_string(),
            purchase_date: None,
            shelf_life_days: None,
            expiry_date: expires_in.map(|d| today() + Duration::days(d)),
            user_id,
            email: format!("{}@example.com", user_id.simple()),
        }
    }

    #[test]
    fn test_same_user_sorted_soonest_first() {
        let user = Uuid::new_v4();
        let candidates = vec![
            candidate(user, "Yogurt", Some(5)),
            candidate(user, "Spinach", Some(0)),
        ];

        let plan = build_batches(&candidates, today(), &ReminderThresholds::default());

        assert_eq!(plan.batches.len(), 1);
        let entries = &plan.batches[0].entries;
        assert_eq!(entries[0].name, "Spinach");
        assert_eq!(entries[0].phrase(), "expires today");
        assert_eq!(entries[1].name, "Yogurt");
        assert_eq!(entries[1].phrase(), "expires in 5 days");
        assert!(plan.batches[0].has_expiring_today());
    }

    #[test]
    fn test_non_threshold_offsets_dropped() {
        let user = Uuid::new_v4();
        let candidates = vec![
            candidate(user, "Bread", Some(3)),
            candidate(user, "Cheese", Some(-1)),
        ];

        let plan = build_batches(&candidates, today(), &ReminderThresholds::default());

        assert!(plan.batches.is_empty());
        assert_eq!(plan.scanned, 2);
        assert_eq!(plan.qualifying, 0);
        assert_eq!(plan.unresolvable, 0);
    }

    #[test]
    fn test_unresolvable_counted_not_batched() {
        let user = Uuid::new_v4();
        let mut undated = candidate(user, "Rice", None);
        undated.purchase_date = Some(today());

        let plan = build_batches(&[undated], today(), &ReminderThresholds::default());

        assert!(plan.batches.is_empty());
        assert_eq!(plan.unresolvable, 1);
    }

    #[test]
    fn test_grouped_per_user() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let candidates = vec![
            candidate(alice, "Milk", Some(0)),
            candidate(bob, "Eggs", Some(5)),
            candidate(alice, "Butter", Some(5)),
        ];

        let plan = build_batches(&candidates, today(), &ReminderThresholds::default());

        assert_eq!(plan.batches.len(), 2);
        assert_eq!(plan.qualifying, 3);

        let alice_batch = plan.batches.iter().find(|b| b.user_id == alice).unwrap();
        assert_eq!(alice_batch.item_names(), vec!["Milk", "Butter"]);

        let bob_batch = plan.batches.iter().find(|b| b.user_id == bob).unwrap();
        assert_eq!(bob_batch.item_names(), vec!["Eggs"]);
    }

    #[test]
    fn test_duplicate_rows_collapsed() {
        let user = Uuid::new_v4();
        let row = candidate(user, "Tofu", Some(0));

        let plan = build_batches(&[row.clone(), row], today(), &ReminderThresholds::default());

        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].entries.len(), 1);
        assert_eq!(plan.qualifying, 1);
    }

    #[test]
    fn test_duplicate_unresolvable_rows_counted_once() {
        let user = Uuid::new_v4();
        let undated = candidate(user, "Rice", None);
        let due = candidate(user, "Tofu", Some(0));

        let plan = build_batches(
            &[undated.clone(), undated, due.clone(), due],
            today(),
            &ReminderThresholds::default(),
        );

        assert_eq!(plan.scanned, 4);
        assert_eq!(plan.unresolvable, 1);
        assert_eq!(plan.qualifying, 1);
    }

    #[test]
    fn test_shelf_life_resolution_in_batch() {
        let user = Uuid::new_v4();
        let mut row = candidate(user, "Lettuce", None);
        row.purchase_date = Some(today() - Duration::days(10));
        row.shelf_life_days = Some(15);

        let plan = build_batches(&[row], today(), &ReminderThresholds::default());

        assert_eq!(plan.batches[0].entries[0].day_offset, 5);
    }

    #[test]
    fn test_custom_thresholds() {
        let user = Uuid::new_v4();
        let candidates = vec![candidate(user, "Bread", Some(3))];
        let thresholds = ReminderThresholds::from_days(vec![3, 1]).unwrap();

        let plan = build_batches(&candidates, today(), &thresholds);

        assert_eq!(plan.batches[0].entries[0].phrase(), "expires in 3 days");
    }
}
