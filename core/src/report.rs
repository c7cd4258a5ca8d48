//! Aggregated audit view over a batch of match decisions.
//!
//! The report answers the two operator questions after every run:
//! which unmatched names are worth adding to the manual table (high
//! minutes first), and which accepted fuzzy matches are shaky enough
//! to deserve a spot-check.

use crate::resolver::{MatchMethod, MatchOutcome, Resolution};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Decision counts by resolution method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCounts {
    pub manual: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
    pub total: usize,
}

impl MethodCounts {
    pub fn matched(&self) -> usize {
        self.manual + self.exact + self.fuzzy
    }
}

/// An unmatched name with enough playing time to matter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    pub name: String,
    pub team: String,
    pub minutes: f64,
}

/// An accepted fuzzy match below the review threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub source_name: String,
    pub target: String,
    pub score: u8,
    pub team: String,
}

/// Summary of one resolution run. Pure aggregation: derived from the
/// decisions without mutating them, recomputed each run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchReport {
    pub counts: MethodCounts,
    /// Unmatched names at or above the significance threshold, most
    /// minutes first - the priority queue for manual-mapping work.
    pub needs_mapping: Vec<UnmatchedEntry>,
    /// Fuzzy matches scoring below the review threshold.
    pub review: Vec<ReviewEntry>,
    /// Data-quality warning: target names that normalize identically
    /// to an earlier roster entry (resolved first-wins).
    pub duplicate_targets: Vec<String>,
    /// Source entries dropped for having an empty display name.
    pub skipped_sources: usize,
    /// Share of total source minutes carried by matched decisions.
    /// Absent when no source entry had minutes data.
    pub minutes_coverage_pct: Option<f64>,
    pub review_threshold: u8,
    pub significance_threshold: f64,
}

impl MatchReport {
    /// Build the report for one resolution run.
    ///
    /// `significance_threshold` is in the same unit as the roster's
    /// minutes column; unmatched entries below it (or without minutes
    /// data) are counted but not listed.
    pub fn from_resolution(
        resolution: &Resolution,
        review_threshold: u8,
        significance_threshold: f64,
    ) -> Self {
        let mut counts = MethodCounts::default();
        let mut needs_mapping = Vec::new();
        let mut review = Vec::new();
        let mut total_minutes = 0.0;
        let mut matched_minutes = 0.0;
        let mut saw_minutes = false;

        for decision in &resolution.decisions {
            counts.total += 1;
            match decision.outcome.method() {
                MatchMethod::Manual => counts.manual += 1,
                MatchMethod::Exact => counts.exact += 1,
                MatchMethod::Fuzzy => counts.fuzzy += 1,
                MatchMethod::Unmatched => counts.unmatched += 1,
            }

            if let Some(minutes) = decision.minutes {
                saw_minutes = true;
                total_minutes += minutes;
                if decision.outcome.is_matched() {
                    matched_minutes += minutes;
                }
            }

            match &decision.outcome {
                MatchOutcome::Unmatched => {
                    if let Some(minutes) = decision.minutes {
                        if minutes >= significance_threshold {
                            needs_mapping.push(UnmatchedEntry {
                                name: decision.source_name.clone(),
                                team: decision.team.clone(),
                                minutes,
                            });
                        }
                    }
                }
                MatchOutcome::Fuzzy { target, score } => {
                    if *score < review_threshold {
                        review.push(ReviewEntry {
                            source_name: decision.source_name.clone(),
                            target: target.clone(),
                            score: *score,
                            team: decision.team.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        needs_mapping.sort_by(|a, b| {
            b.minutes
                .partial_cmp(&a.minutes)
                .unwrap_or(Ordering::Equal)
        });

        let minutes_coverage_pct = if saw_minutes && total_minutes > 0.0 {
            Some(matched_minutes / total_minutes * 100.0)
        } else {
            None
        };

        Self {
            counts,
            needs_mapping,
            review,
            duplicate_targets: resolution.duplicate_targets.clone(),
            skipped_sources: resolution.skipped_sources,
            minutes_coverage_pct,
            review_threshold,
            significance_threshold,
        }
    }

    /// Matched decisions as a percentage of all decisions.
    pub fn matched_pct(&self) -> f64 {
        if self.counts.total == 0 {
            return 0.0;
        }
        self.counts.matched() as f64 / self.counts.total as f64 * 100.0
    }
}

impl fmt::Display for MatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "matching summary")?;
        writeln!(f, "  manual:    {:>4}", self.counts.manual)?;
        writeln!(f, "  exact:     {:>4}", self.counts.exact)?;
        writeln!(f, "  fuzzy:     {:>4}", self.counts.fuzzy)?;
        writeln!(f, "  unmatched: {:>4}", self.counts.unmatched)?;
        writeln!(
            f,
            "  total:     {:>4} ({:.1}% matched)",
            self.counts.total,
            self.matched_pct()
        )?;

        if let Some(pct) = self.minutes_coverage_pct {
            writeln!(f, "  minutes coverage: {:.1}%", pct)?;
        }
        if self.skipped_sources > 0 {
            writeln!(f, "  skipped empty names: {}", self.skipped_sources)?;
        }
        if !self.duplicate_targets.is_empty() {
            writeln!(
                f,
                "  duplicate target names (first-wins): {}",
                self.duplicate_targets.join(", ")
            )?;
        }

        if !self.needs_mapping.is_empty() {
            writeln!(
                f,
                "unmatched with {}+ minutes (add to manual mappings):",
                self.significance_threshold
            )?;
            for entry in &self.needs_mapping {
                writeln!(
                    f,
                    "  {:<30} {:<25} {:>5.0} min",
                    entry.name, entry.team, entry.minutes
                )?;
            }
        }

        if !self.review.is_empty() {
            writeln!(
                f,
                "fuzzy matches below {} (please review):",
                self.review_threshold
            )?;
            for entry in &self.review {
                writeln!(
                    f,
                    "  {:<30} -> {:<30} (score {:>3}, {})",
                    entry.source_name, entry.target, entry.score, entry.team
                )?;
            }
        }

        Ok(())
    }
}
