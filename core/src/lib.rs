//! Pitchmatch Core - cross-source player identity reconciliation.
//!
//! This crate unifies player records scraped from two independent
//! providers (Understat season totals and FotMob per-match aggregates)
//! into a single canonical identity space. It provides:
//! - Name normalization (case folding, diacritic stripping, whitespace collapse)
//! - Token-order-insensitive similarity scoring
//! - The manual -> exact -> fuzzy -> unmatched resolution cascade
//! - Match report aggregation for audit output
//! - Identity join for rewriting provider records with canonical names
//!
//! The engine is pure, synchronous computation over in-memory rosters;
//! scraping, reshaping, and persistence live in the surrounding services.

pub mod join;
pub mod mappings;
pub mod normalize;
pub mod report;
pub mod resolver;
pub mod roster;
pub mod similarity;

pub use join::{attach_identities, ResolvedRecord, UnmatchedPolicy};
pub use mappings::ManualMappings;
pub use normalize::normalize;
pub use report::MatchReport;
pub use resolver::{
    resolve_rosters, MatchDecision, MatchMethod, MatchOutcome, Resolution, ResolveError,
    ResolverConfig,
};
pub use roster::{Provider, RosterEntry, StatRecord};
pub use similarity::token_sort_score;
