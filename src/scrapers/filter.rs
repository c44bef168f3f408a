//! Catalog scope filtering.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::models::{CatalogEntry, DistributionKind};

/// Keep only free and coupon entries, preserving order.
///
/// Entries with an unknown or missing distribution kind are dropped along
/// with paid ones.
pub fn filter_catalog(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let initial = entries.len();

    let kept: Vec<CatalogEntry> = entries
        .into_iter()
        .filter(|entry| match entry.distribution {
            Some(DistributionKind::Free) | Some(DistributionKind::Coupon) => true,
            Some(DistributionKind::Paid) => false,
            None => {
                debug!(id = %entry.id, "Dropping entry with unknown distribution kind");
                false
            }
        })
        .collect();

    info!(
        "Filtered {} out-of-scope watchfaces. New total is {}.",
        initial - kept.len(),
        kept.len()
    );
    kept
}

/// Ids to extract, first occurrence wins.
pub fn candidate_ids(entries: &[CatalogEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(entry.id.as_str()))
        .map(|entry| entry.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, kind: Option<DistributionKind>) -> CatalogEntry {
        CatalogEntry::new(id, kind)
    }

    #[test]
    fn drops_paid_entries_in_order() {
        let filtered = filter_catalog(vec![
            entry("a", Some(DistributionKind::Free)),
            entry("b", Some(DistributionKind::Paid)),
            entry("c", Some(DistributionKind::Coupon)),
        ]);

        let ids: Vec<_> = filtered.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn drops_unknown_kinds() {
        let filtered = filter_catalog(vec![
            entry("a", None),
            entry("b", Some(DistributionKind::Free)),
        ]);
        assert_eq!(filtered, vec![entry("b", Some(DistributionKind::Free))]);
    }

    #[test]
    fn empty_input() {
        assert!(filter_catalog(Vec::new()).is_empty());
    }

    #[test]
    fn output_is_ordered_subsequence_without_paid() {
        let kinds = [
            Some(DistributionKind::Paid),
            Some(DistributionKind::Free),
            None,
            Some(DistributionKind::Coupon),
            Some(DistributionKind::Paid),
            Some(DistributionKind::Free),
        ];
        let input: Vec<_> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| entry(&i.to_string(), *k))
            .collect();

        let output = filter_catalog(input.clone());

        assert!(output
            .iter()
            .all(|e| e.distribution != Some(DistributionKind::Paid)));
        let mut cursor = input.iter();
        for kept in &output {
            assert!(cursor.any(|e| e == kept), "{:?} out of order", kept);
        }
    }

    #[test]
    fn candidate_ids_deduplicates() {
        let entries = vec![
            entry("a", Some(DistributionKind::Free)),
            entry("b", Some(DistributionKind::Coupon)),
            entry("a", Some(DistributionKind::Coupon)),
        ];
        assert_eq!(candidate_ids(&entries), vec!["a", "b"]);
    }
}
