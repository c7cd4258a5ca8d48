//! Curated manual name mappings.
//!
//! The manual table is human-verified ground truth: provider-B
//! (FotMob) display name -> provider-A (Understat) display name. It is
//! the highest-priority resolution source and exists specifically to
//! correct cases where automated matching would pick the wrong
//! candidate or none at all (truncations, nicknames, legal-name
//! differences). Authored by operators, read-only at resolution time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mapping of raw provider-B display names to provider-A names.
///
/// Lookup is by the exact raw string the provider emits, not the
/// normalized form: the table is curated against real scraped output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManualMappings(HashMap<String, String>);

impl ManualMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(s, t)| (s.into(), t.into()))
                .collect(),
        )
    }

    /// Parse a mappings file: a flat JSON object of
    /// `{"FotMob Name": "Understat Name"}` entries.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    pub fn get(&self, source_name: &str) -> Option<&str> {
        self.0.get(source_name).map(|s| s.as_str())
    }

    pub fn insert(&mut self, source_name: impl Into<String>, target_name: impl Into<String>) {
        self.0.insert(source_name.into(), target_name.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Curated starter table for the Premier League run, so the
    /// pipeline produces useful output before any operator has written
    /// a mappings file. Known FotMob/Understat mismatches, weighted
    /// toward goalkeepers and 500+ minute players.
    pub fn premier_league() -> Self {
        Self::from_pairs([
            // Goalkeepers
            ("Alisson Becker", "Alisson"),
            ("Ederson", "Ederson Moraes"),
            ("Andre Onana", "André Onana"),
            ("Kepa Arrizabalaga", "Kepa"),
            // Common abbreviated names
            ("Amad", "Amad Diallo"),
            ("Andre", "André"),
            // Name variations
            ("Edward Nketiah", "Eddie Nketiah"),
            ("Emile Smith Rowe", "Emile Smith-Rowe"),
            // High-minute players
            ("Ezri Konsa", "Ezri Konsa Ngoyo"),
            ("Florentino", "Florentino Luís"),
            ("Malick Diouf", "El Hadji Malick Diouf"),
            ("Kristoffer Vassbakk Ajer", "Kristoffer Ajer"),
            ("Idrissa Gana Gueye", "Idrissa Gueye"),
            ("Toti Gomes", "Toti"),
            ("Destiny Udogie", "Iyenoma Destiny Udogie"),
            ("Victor Nilsson Lindelöf", "Victor Lindelöf"),
            ("Estevao", "Estêvão"),
            ("Matty Cash", "Matthew Cash"),
            ("Igor Thiago", "Thiago"),
            ("Lesley Ugochukwu", "Chimuanya Ugochukwu"),
            ("Daniel Burn", "Dan Burn"),
            ("Alex Jimenez", "Alejandro Jiménez"),
        ])
    }
}

impl FromIterator<(String, String)> for ManualMappings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
