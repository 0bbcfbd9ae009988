//! Set operations behind relation type retirement

use super::models::{ObsoleteRow, RetirementCandidate};
use log::debug;
use std::collections::HashSet;

/// Candidate current-catalog ids for a legacy id, one per offset
pub fn offset_candidates(legacy_id: i64, offsets: &[i64]) -> Vec<(i64, i64)> {
    offsets
        .iter()
        .filter_map(|&offset| legacy_id.checked_add(offset).map(|id| (offset, id)))
        .collect()
}

/// Keep only rows whose version tag contains `filter`
///
/// Rows without a tag carry an empty string and only survive when no
/// filter is given.
pub fn filter_by_version<'a>(
    rows: &'a [ObsoleteRow],
    filter: Option<&str>,
) -> Vec<&'a ObsoleteRow> {
    match filter {
        Some(tag) => rows
            .iter()
            .filter(|row| row.catalog_version.contains(tag))
            .collect(),
        None => rows.iter().collect(),
    }
}

/// Match every row against `observed` once per offset
///
/// Candidates are grouped by offset in the order the offsets are given,
/// rows keep table order within each group. Duplicate ids keep their first
/// occurrence.
pub fn match_offsets(
    rows: &[&ObsoleteRow],
    observed: &HashSet<i64>,
    offsets: &[i64],
    source: &str,
) -> Vec<RetirementCandidate> {
    let mut pairs: Vec<(&ObsoleteRow, i64, i64)> = rows
        .iter()
        .flat_map(|row| {
            offset_candidates(row.legacy_id, offsets)
                .into_iter()
                .map(move |(offset, type_id)| (*row, offset, type_id))
        })
        .collect();
    // Stable, so table order survives within an offset
    pairs.sort_by_key(|(_, offset, _)| offsets.iter().position(|o| o == offset));

    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for (row, offset, type_id) in pairs {
        if !observed.contains(&type_id) {
            continue;
        }
        if !seen.insert(type_id) {
            debug!("{} already matched, skipping row with TS_Id {}", type_id, row.legacy_id);
            continue;
        }
        candidates.push(RetirementCandidate {
            row: row.clone(),
            source: source.to_string(),
            offset,
            type_id,
            in_current_catalog: None,
        });
    }

    candidates
}

/// Observed ids that the current catalog no longer has
///
/// Keeps the order of `observed` and drops repeats.
pub fn direct_diff(observed: &[i64], current: &HashSet<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    observed
        .iter()
        .copied()
        .filter(|id| !current.contains(id) && seen.insert(*id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(legacy_id: i64, version: &str) -> ObsoleteRow {
        ObsoleteRow {
            legacy_id,
            catalog_version: version.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_offset_candidates_are_exact() {
        assert_eq!(
            offset_candidates(608, &[200000, 220000]),
            vec![(200000, 200608), (220000, 220608)]
        );
        assert!(offset_candidates(i64::MAX, &[1]).is_empty());
    }

    #[test]
    fn test_only_observed_candidates_match() {
        let rows = [row(608, "2.29")];
        let refs: Vec<&ObsoleteRow> = rows.iter().collect();
        let observed = HashSet::from([200608, 5]);

        let candidates = match_offsets(&refs, &observed, &[200000, 220000], "obsolete.xlsx");

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].type_id, 200608);
        assert_eq!(candidates[0].offset, 200000);
        assert_eq!(candidates[0].source, "obsolete.xlsx");
    }

    #[test]
    fn test_row_matching_both_offsets_yields_two_entries() {
        let rows = [row(608, "")];
        let refs: Vec<&ObsoleteRow> = rows.iter().collect();
        let observed = HashSet::from([200608, 220608]);

        let ids: Vec<i64> = match_offsets(&refs, &observed, &[200000, 220000], "x")
            .iter()
            .map(|c| c.type_id)
            .collect();
        assert_eq!(ids, vec![200608, 220608]);
    }

    #[test]
    fn test_duplicate_ids_keep_first_occurrence() {
        // 20608 + 200000 and 608 + 220000 land on the same id
        let rows = [row(608, "a"), row(20608, "b")];
        let refs: Vec<&ObsoleteRow> = rows.iter().collect();
        let observed = HashSet::from([220608]);

        let candidates = match_offsets(&refs, &observed, &[200000, 220000], "x");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].offset, 200000);
        assert_eq!(candidates[0].row.legacy_id, 20608);
    }

    #[test]
    fn test_overflowing_offset_skips_only_that_row() {
        let rows = [row(i64::MAX, ""), row(608, "")];
        let refs: Vec<&ObsoleteRow> = rows.iter().collect();
        let observed = HashSet::from([200608]);

        let candidates = match_offsets(&refs, &observed, &[200000], "x");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].row.legacy_id, 608);
    }

    #[test]
    fn test_untagged_rows_only_filtered_on_request() {
        let rows = [row(1, ""), row(2, "2.30"), row(3, "2.31")];

        assert_eq!(filter_by_version(&rows, None).len(), 3);

        let filtered: Vec<i64> = filter_by_version(&rows, Some("2.3"))
            .iter()
            .map(|r| r.legacy_id)
            .collect();
        assert_eq!(filtered, vec![2, 3]);
    }

    #[test]
    fn test_direct_diff_has_no_false_positives() {
        let current = HashSet::from([200805, 200806, 21]);
        let observed = [200805, 999, 21, 999, 1000];

        let retired = direct_diff(&observed, &current);

        assert_eq!(retired, vec![999, 1000]);
        assert!(retired.iter().all(|id| !current.contains(id)));
    }
}
