//! Provider tags and the in-memory tabular shapes the engine operates on.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Data source a roster or stat row was scraped from.
///
/// Understat is the canonical identity space (season totals scraped
/// from HTML tables); FotMob supplies per-match aggregates via its
/// JSON API under its own name spellings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Understat,
    Fotmob,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Understat => "understat",
            Provider::Fotmob => "fotmob",
        }
    }
}

/// One player row on a provider roster.
///
/// `minutes` is the significance weight (minutes played) used to
/// prioritize which unmatched names most need a manual mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub minutes: Option<f64>,
}

impl RosterEntry {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            minutes: None,
        }
    }

    pub fn with_minutes(name: impl Into<String>, team: impl Into<String>, minutes: f64) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            minutes: Some(minutes),
        }
    }
}

/// A provider-B stat row headed for the reshaping stage.
///
/// The per-table stat columns vary by dataset (defense, goalkeeping,
/// possession, ...), so everything beyond the identity columns rides
/// in the flattened `stats` map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub name: String,
    pub team: String,
    #[serde(default)]
    pub minutes: Option<f64>,
    #[serde(flatten)]
    pub stats: BTreeMap<String, serde_json::Value>,
}

impl StatRecord {
    pub fn new(name: impl Into<String>, team: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            team: team.into(),
            minutes: None,
            stats: BTreeMap::new(),
        }
    }

    /// Identity view of this record, for feeding the resolver.
    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry {
            name: self.name.clone(),
            team: self.team.clone(),
            minutes: self.minutes,
        }
    }
}
