//! Identity join: rewrite provider-B stat records with canonical names.
//!
//! Downstream of the resolver, each FotMob stat row picks up the
//! matched Understat name plus the score and method audit columns
//! before it enters the reshaping stage.

use crate::resolver::{MatchDecision, MatchMethod};
use crate::roster::StatRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What to do with records whose name did not resolve.
///
/// An explicit caller choice: some consumers want only
/// cross-source-verified rows, others want all data even under
/// degraded source-provider naming.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Drop unmatched records entirely.
    Drop,
    /// Pass unmatched records through under their original
    /// provider-B name, tagged `unmatched` with score 0.
    KeepSourceName,
}

/// A provider-B stat record carrying its resolved canonical identity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub canonical_name: String,
    pub match_method: MatchMethod,
    pub match_score: u8,
    #[serde(flatten)]
    pub record: StatRecord,
}

/// Attach resolved identities to provider-B records.
///
/// Decisions are looked up by source name (first decision wins when a
/// name appears twice). Records without any decision - e.g. names the
/// resolver skipped as empty - follow the unmatched policy.
pub fn attach_identities(
    records: &[StatRecord],
    decisions: &[MatchDecision],
    policy: UnmatchedPolicy,
) -> Vec<ResolvedRecord> {
    let by_name: HashMap<&str, &MatchDecision> =
        decisions
            .iter()
            .fold(HashMap::new(), |mut map, decision| {
                map.entry(decision.source_name.as_str()).or_insert(decision);
                map
            });

    records
        .iter()
        .filter_map(|record| {
            if let Some(decision) = by_name.get(record.name.as_str()) {
                if let Some(target) = decision.outcome.target() {
                    return Some(ResolvedRecord {
                        canonical_name: target.to_string(),
                        match_method: decision.outcome.method(),
                        match_score: decision.outcome.score(),
                        record: record.clone(),
                    });
                }
            }
            match policy {
                UnmatchedPolicy::Drop => None,
                UnmatchedPolicy::KeepSourceName => Some(ResolvedRecord {
                    canonical_name: record.name.clone(),
                    match_method: MatchMethod::Unmatched,
                    match_score: 0,
                    record: record.clone(),
                }),
            }
        })
        .collect()
}
