//! Match resolver: the manual -> exact -> fuzzy -> unmatched cascade.
//!
//! Each provider-B name resolves to at most one provider-A name via a
//! strict priority order; the first applicable tier wins and there is
//! no fallthrough. Every decision carries its score and method so
//! callers can audit confidence - ambiguity is never swallowed
//! silently.

use crate::mappings::ManualMappings;
use crate::normalize::normalize;
use crate::roster::RosterEntry;
use crate::similarity::token_sort_score;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// How a source name was resolved, for counting and audit columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethod {
    Manual,
    Exact,
    Fuzzy,
    Unmatched,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Manual => "manual",
            MatchMethod::Exact => "exact",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::Unmatched => "unmatched",
        }
    }
}

/// Terminal state of the resolution cascade for one source name.
///
/// The invariants of the data model hold by construction: manual and
/// exact matches always score 100, fuzzy carries the scorer's output,
/// unmatched has no target and scores 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MatchOutcome {
    /// Resolved via the curated manual table. Overrides everything,
    /// including an exact match on a different candidate.
    Manual { target: String },
    /// Normalized forms are identical.
    Exact { target: String },
    /// Best token-sort score met the configured threshold.
    Fuzzy { target: String, score: u8 },
    /// No tier applied.
    Unmatched,
}

impl MatchOutcome {
    pub fn target(&self) -> Option<&str> {
        match self {
            MatchOutcome::Manual { target }
            | MatchOutcome::Exact { target }
            | MatchOutcome::Fuzzy { target, .. } => Some(target),
            MatchOutcome::Unmatched => None,
        }
    }

    pub fn score(&self) -> u8 {
        match self {
            MatchOutcome::Manual { .. } | MatchOutcome::Exact { .. } => 100,
            MatchOutcome::Fuzzy { score, .. } => *score,
            MatchOutcome::Unmatched => 0,
        }
    }

    pub fn method(&self) -> MatchMethod {
        match self {
            MatchOutcome::Manual { .. } => MatchMethod::Manual,
            MatchOutcome::Exact { .. } => MatchMethod::Exact,
            MatchOutcome::Fuzzy { .. } => MatchMethod::Fuzzy,
            MatchOutcome::Unmatched => MatchMethod::Unmatched,
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchOutcome::Unmatched)
    }
}

/// One resolution record per provider-B roster entry. Immutable after
/// creation; consumed by the report and the identity join.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchDecision {
    pub source_name: String,
    pub team: String,
    pub minutes: Option<f64>,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

/// Tunables for a resolution run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Minimum token-sort score to accept an automated fuzzy match.
    pub fuzzy_threshold: u8,
    /// Stricter bar below which accepted fuzzy matches are flagged
    /// for human review.
    pub review_threshold: u8,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 85,
            review_threshold: 95,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ResolveError> {
        if self.fuzzy_threshold > 100 {
            return Err(ResolveError::InvalidThreshold {
                name: "fuzzy_threshold",
                value: self.fuzzy_threshold,
            });
        }
        if self.review_threshold > 100 {
            return Err(ResolveError::InvalidThreshold {
                name: "review_threshold",
                value: self.review_threshold,
            });
        }
        if self.review_threshold < self.fuzzy_threshold {
            return Err(ResolveError::ReviewBelowFuzzy {
                review: self.review_threshold,
                fuzzy: self.fuzzy_threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{name} out of range: {value} (must be within 0-100)")]
    InvalidThreshold { name: &'static str, value: u8 },
    #[error("review_threshold {review} is below fuzzy_threshold {fuzzy}")]
    ReviewBelowFuzzy { review: u8, fuzzy: u8 },
}

/// Output of one resolution run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resolution {
    /// One decision per non-empty source entry, in source order.
    pub decisions: Vec<MatchDecision>,
    /// Target names whose normalized form collides with an earlier
    /// target entry. Resolved first-wins, but surfaced so operators
    /// can deduplicate the upstream data.
    pub duplicate_targets: Vec<String>,
    /// Source entries skipped for having an empty display name.
    pub skipped_sources: usize,
}

/// Resolve every provider-B roster entry against the provider-A roster.
///
/// Priority cascade per source name, first applicable tier wins:
/// 1. manual table (raw-name key, score 100)
/// 2. exact normalized equality (score 100, first target on duplicates)
/// 3. best fuzzy score at or above `fuzzy_threshold`, ties broken by
///    target enumeration order - an explicit, deterministic tie-break
/// 4. unmatched (score 0)
///
/// Empty target roster means every source is unmatched; empty source
/// roster yields empty output. Each name resolves independently, so
/// the all-pairs fuzzy scan runs in parallel while output order
/// follows the source roster.
pub fn resolve_rosters(
    sources: &[RosterEntry],
    targets: &[RosterEntry],
    mappings: &ManualMappings,
    config: &ResolverConfig,
) -> Result<Resolution, ResolveError> {
    config.validate()?;

    // Normalize targets once; the fuzzy scan and exact tier both run
    // against these precomputed forms.
    let normalized_targets: Vec<(&RosterEntry, String)> = targets
        .iter()
        .map(|entry| (entry, normalize(&entry.name)))
        .collect();

    let duplicate_targets = find_duplicate_targets(&normalized_targets);

    let mut skipped_sources = 0usize;
    let live_sources: Vec<&RosterEntry> = sources
        .iter()
        .filter(|entry| {
            if entry.name.trim().is_empty() {
                debug!(team = %entry.team, "skipping roster entry with empty name");
                skipped_sources += 1;
                false
            } else {
                true
            }
        })
        .collect();

    let decisions: Vec<MatchDecision> = live_sources
        .par_iter()
        .map(|entry| MatchDecision {
            source_name: entry.name.clone(),
            team: entry.team.clone(),
            minutes: entry.minutes,
            outcome: resolve_one(&entry.name, &normalized_targets, mappings, config),
        })
        .collect();

    Ok(Resolution {
        decisions,
        duplicate_targets,
        skipped_sources,
    })
}

fn resolve_one(
    source_name: &str,
    normalized_targets: &[(&RosterEntry, String)],
    mappings: &ManualMappings,
    config: &ResolverConfig,
) -> MatchOutcome {
    // 1. Manual override. Takes precedence even over an exact match:
    //    the table exists to correct cases where automated matching
    //    picks the wrong candidate.
    if let Some(target) = mappings.get(source_name) {
        return MatchOutcome::Manual {
            target: target.to_string(),
        };
    }

    let source_norm = normalize(source_name);

    // 2. Exact normalized equality, first target wins on duplicates.
    for (target, target_norm) in normalized_targets {
        if source_norm == *target_norm {
            return MatchOutcome::Exact {
                target: target.name.clone(),
            };
        }
    }

    // 3. Best fuzzy candidate. Strict > keeps the first target on a
    //    tied score.
    let mut best: Option<(&RosterEntry, u8)> = None;
    for (target, _) in normalized_targets {
        let score = token_sort_score(source_name, &target.name);
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((target, score));
        }
    }

    match best {
        Some((target, score)) if score >= config.fuzzy_threshold => MatchOutcome::Fuzzy {
            target: target.name.clone(),
            score,
        },
        // 4. Nothing cleared the threshold.
        _ => MatchOutcome::Unmatched,
    }
}

/// Raw names of target entries whose normalized form already appeared
/// earlier in the roster.
fn find_duplicate_targets(normalized_targets: &[(&RosterEntry, String)]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for (target, norm) in normalized_targets {
        if norm.is_empty() {
            continue;
        }
        let count = seen.entry(norm.as_str()).or_insert(0);
        *count += 1;
        if *count > 1 {
            duplicates.push(target.name.clone());
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<RosterEntry> {
        names
            .iter()
            .map(|n| RosterEntry::new(*n, "Test FC"))
            .collect()
    }

    fn resolve(
        sources: &[RosterEntry],
        targets: &[RosterEntry],
        mappings: &ManualMappings,
    ) -> Resolution {
        resolve_rosters(sources, targets, mappings, &ResolverConfig::default()).unwrap()
    }

    #[test]
    fn test_manual_beats_exact() {
        // "Ederson" exact-matches a target, but the manual table says
        // the right identity is "Ederson Moraes".
        let mappings = ManualMappings::from_pairs([("Ederson", "Ederson Moraes")]);
        let sources = roster(&["Ederson"]);
        let targets = roster(&["Ederson", "Ederson Moraes"]);

        let resolution = resolve(&sources, &targets, &mappings);
        let decision = &resolution.decisions[0];

        assert_eq!(
            decision.outcome,
            MatchOutcome::Manual {
                target: "Ederson Moraes".to_string()
            }
        );
        assert_eq!(decision.outcome.score(), 100);
    }

    #[test]
    fn test_manual_target_need_not_be_on_roster() {
        let mappings = ManualMappings::from_pairs([("Amad", "Amad Diallo")]);
        let sources = roster(&["Amad"]);
        let targets = roster(&["Erling Haaland"]);

        let resolution = resolve(&sources, &targets, &mappings);
        assert_eq!(
            resolution.decisions[0].outcome.target(),
            Some("Amad Diallo")
        );
    }

    #[test]
    fn test_exact_beats_fuzzy() {
        let sources = roster(&["Alisson"]);
        let targets = roster(&["Alisson", "Alison"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Exact {
                target: "Alisson".to_string()
            }
        );
    }

    #[test]
    fn test_exact_uses_normalized_forms() {
        let sources = roster(&["andre onana"]);
        let targets = roster(&["André Onana"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Exact {
                target: "André Onana".to_string()
            }
        );
    }

    #[test]
    fn test_fuzzy_threshold_boundary() {
        // 20 chars at edit distance 3 scores exactly 85 (accepted);
        // 25 chars at distance 4 scores 84 (rejected).
        let at_threshold = roster(&["aaaaaaaaaaaaaaaaaaaa"]);
        let targets_85 = roster(&["aaaaaaaaaaaaaaaaabbb"]);
        let resolution = resolve(&at_threshold, &targets_85, &ManualMappings::new());
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Fuzzy {
                target: "aaaaaaaaaaaaaaaaabbb".to_string(),
                score: 85
            }
        );

        let below = roster(&["aaaaaaaaaaaaaaaaaaaaaaaaa"]);
        let targets_84 = roster(&["aaaaaaaaaaaaaaaaaaaaabbbb"]);
        let resolution = resolve(&below, &targets_84, &ManualMappings::new());
        assert_eq!(resolution.decisions[0].outcome, MatchOutcome::Unmatched);
        assert_eq!(resolution.decisions[0].outcome.score(), 0);
    }

    #[test]
    fn test_fuzzy_tie_breaks_to_first_target() {
        // Both targets score 90 against the source; enumeration order
        // decides.
        let sources = roster(&["aaaaaaaaab"]);
        let targets = roster(&["aaaaaaaaac", "aaaaaaaaad"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Fuzzy {
                target: "aaaaaaaaac".to_string(),
                score: 90
            }
        );
    }

    #[test]
    fn test_reordered_name_resolves_fuzzy() {
        let sources = roster(&["de Bruyne, Kevin"]);
        let targets = roster(&["Kevin De Bruyne"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Fuzzy {
                target: "Kevin De Bruyne".to_string(),
                score: 100
            }
        );
    }

    #[test]
    fn test_empty_target_roster_unmatches_everything() {
        let sources = roster(&["Erling Haaland", "Bukayo Saka"]);
        let resolution = resolve(&sources, &[], &ManualMappings::new());

        assert_eq!(resolution.decisions.len(), 2);
        for decision in &resolution.decisions {
            assert_eq!(decision.outcome, MatchOutcome::Unmatched);
            assert_eq!(decision.outcome.target(), None);
        }
    }

    #[test]
    fn test_empty_source_roster_yields_empty_output() {
        let targets = roster(&["Erling Haaland"]);
        let resolution = resolve(&[], &targets, &ManualMappings::new());
        assert!(resolution.decisions.is_empty());
    }

    #[test]
    fn test_empty_source_names_are_skipped_and_counted() {
        let sources = vec![
            RosterEntry::new("", "Test FC"),
            RosterEntry::new("   ", "Test FC"),
            RosterEntry::new("Erling Haaland", "Man City"),
        ];
        let targets = roster(&["Erling Haaland"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(resolution.skipped_sources, 2);
        assert_eq!(resolution.decisions.len(), 1);
        assert_eq!(resolution.decisions[0].source_name, "Erling Haaland");
    }

    #[test]
    fn test_duplicate_targets_surfaced() {
        let targets = vec![
            RosterEntry::new("Danny Ward", "Leicester"),
            RosterEntry::new("Danny  Ward", "Nottingham Forest"),
            RosterEntry::new("James Ward-Prowse", "West Ham"),
        ];
        let sources = roster(&["Danny Ward"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        assert_eq!(resolution.duplicate_targets, vec!["Danny  Ward"]);
        // First-in-enumeration-order wins.
        assert_eq!(
            resolution.decisions[0].outcome,
            MatchOutcome::Exact {
                target: "Danny Ward".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let config = ResolverConfig {
            fuzzy_threshold: 120,
            review_threshold: 95,
        };
        let err = resolve_rosters(&[], &[], &ManualMappings::new(), &config).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::InvalidThreshold {
                name: "fuzzy_threshold",
                value: 120
            }
        ));

        let config = ResolverConfig {
            fuzzy_threshold: 90,
            review_threshold: 85,
        };
        assert!(matches!(
            resolve_rosters(&[], &[], &ManualMappings::new(), &config).unwrap_err(),
            ResolveError::ReviewBelowFuzzy { .. }
        ));
    }

    #[test]
    fn test_decisions_preserve_source_order() {
        let sources = roster(&["Bukayo Saka", "Erling Haaland", "Rodri"]);
        let targets = roster(&["Rodri", "Erling Haaland", "Bukayo Saka"]);

        let resolution = resolve(&sources, &targets, &ManualMappings::new());
        let names: Vec<&str> = resolution
            .decisions
            .iter()
            .map(|d| d.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["Bukayo Saka", "Erling Haaland", "Rodri"]);
    }

    #[test]
    fn test_outcome_serializes_with_method_tag() {
        let decision = MatchDecision {
            source_name: "Daniel Burn".to_string(),
            team: "Newcastle".to_string(),
            minutes: Some(1710.0),
            outcome: MatchOutcome::Fuzzy {
                target: "Dan Burn".to_string(),
                score: 88,
            },
        };

        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["method"], "fuzzy");
        assert_eq!(json["target"], "Dan Burn");
        assert_eq!(json["score"], 88);
    }
}
