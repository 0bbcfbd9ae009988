// Reconciliation service
//
// Works out which relation types the operational store still holds although
// the catalog has retired them. Pure set logic over identifiers, no I/O.

pub mod core;
pub mod models;

pub use self::core::direct_diff;
pub use models::{CandidateReport, ObsoleteRow, RetirementCandidate};

use std::collections::HashSet;

/// Offsets turning legacy relation ids into current catalog ids
pub const DEFAULT_OFFSETS: [i64; 2] = [200000, 220000];

/// Input for offset-based reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileContext<'a> {
    pub obsolete: &'a [ObsoleteRow],
    /// Name of the obsolete list, carried into every candidate
    pub source: &'a str,
    pub observed: &'a [i64],
    /// Relation ids of the current catalog, when it was fetched
    pub current: Option<&'a HashSet<i64>>,
}

/// Tunables for offset-based reconciliation
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub offsets: Vec<i64>,
    pub version_filter: Option<String>,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            offsets: DEFAULT_OFFSETS.to_vec(),
            version_filter: None,
        }
    }
}

/// Result of offset-based reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReconcileResults {
    pub candidates: Vec<RetirementCandidate>,
    /// Rows left after the version filter
    pub rows_considered: usize,
}

impl ReconcileResults {
    /// Identifiers to retire, in candidate order
    pub fn type_ids(&self) -> Vec<i64> {
        self.candidates.iter().map(|c| c.type_id).collect()
    }
}

/// Match the obsolete table against the observed ids
pub fn reconcile_offsets(context: &ReconcileContext, options: &ReconcileOptions) -> ReconcileResults {
    let rows = core::filter_by_version(context.obsolete, options.version_filter.as_deref());
    let observed: HashSet<i64> = context.observed.iter().copied().collect();

    let mut candidates = core::match_offsets(&rows, &observed, &options.offsets, context.source);

    if let Some(current) = context.current {
        for candidate in &mut candidates {
            candidate.in_current_catalog = Some(current.contains(&candidate.type_id));
        }
    }

    ReconcileResults {
        candidates,
        rows_considered: rows.len(),
    }
}
