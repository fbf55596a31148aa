//! Sales-list version comparison.
//!
//! A version is an immutable copy of every unit row in a sales list at the
//! moment it was saved. Comparing two versions (or a version with the live
//! list) yields one [`UnitDelta`] per unit present on either side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::DiffStatus;
use crate::status::SaleStatus;
use crate::types::{DbId, Money};

/// The per-unit pricing state captured by a version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceRow {
    pub unit_id: DbId,
    pub unit_number: String,
    pub list_price: Option<Money>,
    pub sold_price: Option<Money>,
    pub sale_status: SaleStatus,
    pub client_id: Option<DbId>,
}

/// How one unit differs between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitDelta {
    pub unit_id: DbId,
    pub unit_number: String,
    pub status: DiffStatus,
    pub old_list_price: Option<Money>,
    pub new_list_price: Option<Money>,
    /// `new - old`, only when both sides carry a list price.
    pub list_price_delta: Option<Money>,
    pub old_sold_price: Option<Money>,
    pub new_sold_price: Option<Money>,
    pub old_sale_status: Option<SaleStatus>,
    pub new_sale_status: Option<SaleStatus>,
    pub old_client_id: Option<DbId>,
    pub new_client_id: Option<DbId>,
}

/// Counts per diff status plus aggregate value movement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub unchanged: usize,
    /// Sum of list prices on the newer side minus the older side.
    pub list_value_delta: Money,
    /// Units that moved into reserved or sold.
    pub newly_committed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionComparison {
    pub entries: Vec<UnitDelta>,
    pub summary: ComparisonSummary,
}

/// Version numbers start at 1 and increase by one per list.
pub fn next_version_number(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// Compare two snapshots unit by unit, ordered by unit number.
pub fn compare_snapshots(from: &[UnitPriceRow], to: &[UnitPriceRow]) -> VersionComparison {
    let old: BTreeMap<DbId, &UnitPriceRow> = from.iter().map(|r| (r.unit_id, r)).collect();
    let new: BTreeMap<DbId, &UnitPriceRow> = to.iter().map(|r| (r.unit_id, r)).collect();

    let mut ids: Vec<DbId> = old.keys().chain(new.keys()).copied().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut summary = ComparisonSummary::default();
    let mut entries = Vec::with_capacity(ids.len());

    for id in ids {
        let before = old.get(&id).copied();
        let after = new.get(&id).copied();
        let Some(status) = DiffStatus::classify(before, after) else {
            continue;
        };

        match status {
            DiffStatus::Added => summary.added += 1,
            DiffStatus::Removed => summary.removed += 1,
            DiffStatus::Changed => summary.changed += 1,
            DiffStatus::Unchanged => summary.unchanged += 1,
        }

        let old_list = before.and_then(|r| r.list_price);
        let new_list = after.and_then(|r| r.list_price);
        summary.list_value_delta +=
            new_list.unwrap_or(Money::ZERO) - old_list.unwrap_or(Money::ZERO);

        let was_committed = before.is_some_and(|r| r.sale_status.counts_as_committed());
        let is_committed = after.is_some_and(|r| r.sale_status.counts_as_committed());
        if is_committed && !was_committed {
            summary.newly_committed += 1;
        }

        let unit_number = after
            .or(before)
            .map(|r| r.unit_number.clone())
            .unwrap_or_default();

        entries.push(UnitDelta {
            unit_id: id,
            unit_number,
            status,
            old_list_price: old_list,
            new_list_price: new_list,
            list_price_delta: old_list.zip(new_list).map(|(a, b)| b - a),
            old_sold_price: before.and_then(|r| r.sold_price),
            new_sold_price: after.and_then(|r| r.sold_price),
            old_sale_status: before.map(|r| r.sale_status),
            new_sale_status: after.map(|r| r.sale_status),
            old_client_id: before.and_then(|r| r.client_id),
            new_client_id: after.and_then(|r| r.client_id),
        });
    }

    entries.sort_by(|a, b| natural_cmp(&a.unit_number, &b.unit_number).then(a.unit_id.cmp(&b.unit_id)));

    VersionComparison { entries, summary }
}

/// Orders "2" before "10" and "A2" before "A10".
fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    let key = |s: &str| {
        let digits_at = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (prefix, rest) = s.split_at(digits_at);
        let num_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let number = rest[..num_len].parse::<u64>().unwrap_or(0);
        (prefix.to_lowercase(), number, rest[num_len..].to_lowercase())
    };
    key(a).cmp(&key(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(unit_id: DbId, number: &str, list: Option<&str>, status: SaleStatus) -> UnitPriceRow {
        UnitPriceRow {
            unit_id,
            unit_number: number.to_string(),
            list_price: list.map(|p| p.parse().unwrap()),
            sold_price: None,
            sale_status: status,
            client_id: None,
        }
    }

    #[test]
    fn version_numbers_start_at_one() {
        assert_eq!(next_version_number(None), 1);
        assert_eq!(next_version_number(Some(4)), 5);
    }

    #[test]
    fn identical_snapshots_are_unchanged() {
        let rows = vec![
            row(1, "101", Some("650000"), SaleStatus::Available),
            row(2, "102", Some("700000"), SaleStatus::Sold),
        ];
        let cmp = compare_snapshots(&rows, &rows);
        assert_eq!(cmp.summary.unchanged, 2);
        assert!(cmp.summary.list_value_delta.is_zero());
        assert!(cmp.entries.iter().all(|e| e.status == DiffStatus::Unchanged));
    }

    #[test]
    fn detects_price_change_and_delta() {
        let from = vec![row(1, "101", Some("650000"), SaleStatus::Available)];
        let to = vec![row(1, "101", Some("675000.50"), SaleStatus::Available)];
        let cmp = compare_snapshots(&from, &to);
        let e = &cmp.entries[0];
        assert_eq!(e.status, DiffStatus::Changed);
        assert_eq!(e.list_price_delta, Some("25000.50".parse().unwrap()));
        assert_eq!(cmp.summary.list_value_delta, "25000.50".parse::<Money>().unwrap());
    }

    #[test]
    fn added_and_removed_units() {
        let from = vec![row(1, "101", Some("100"), SaleStatus::Available)];
        let to = vec![row(2, "102", Some("300"), SaleStatus::Reserved)];
        let cmp = compare_snapshots(&from, &to);
        assert_eq!(cmp.summary.added, 1);
        assert_eq!(cmp.summary.removed, 1);
        assert_eq!(cmp.summary.newly_committed, 1);
        assert_eq!(cmp.summary.list_value_delta, Money::from(200));

        let removed = cmp.entries.iter().find(|e| e.unit_id == 1).unwrap();
        assert_eq!(removed.status, DiffStatus::Removed);
        assert_eq!(removed.new_sale_status, None);
        assert_eq!(removed.list_price_delta, None);
    }

    #[test]
    fn status_change_alone_counts_as_changed() {
        let from = vec![row(1, "101", Some("100"), SaleStatus::Available)];
        let to = vec![row(1, "101", Some("100"), SaleStatus::Sold)];
        let cmp = compare_snapshots(&from, &to);
        assert_eq!(cmp.summary.changed, 1);
        assert_eq!(cmp.summary.newly_committed, 1);
        assert_eq!(cmp.entries[0].list_price_delta, Some(Money::ZERO));
    }

    #[test]
    fn entries_are_in_natural_unit_order() {
        let to = vec![
            row(3, "10", None, SaleStatus::Available),
            row(1, "2", None, SaleStatus::Available),
            row(2, "A1", None, SaleStatus::Available),
        ];
        let cmp = compare_snapshots(&[], &to);
        let numbers: Vec<_> = cmp.entries.iter().map(|e| e.unit_number.as_str()).collect();
        assert_eq!(numbers, vec!["2", "10", "A1"]);
    }
}
