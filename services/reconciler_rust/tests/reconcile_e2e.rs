//! End-to-end reconciliation over a realistic two-provider roster:
//! resolve -> report -> identity join, exercising every cascade tier
//! in one run.

use pitchmatch_core::{
    attach_identities, resolve_rosters, ManualMappings, MatchMethod, MatchOutcome, MatchReport,
    ResolverConfig, RosterEntry, StatRecord, UnmatchedPolicy,
};

fn understat_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::new("Erling Haaland", "Manchester City"),
        RosterEntry::new("Kevin De Bruyne", "Manchester City"),
        RosterEntry::new("Ederson", "Manchester City"),
        RosterEntry::new("Ederson Moraes", "Manchester City"),
        RosterEntry::new("Dan Burn", "Newcastle United"),
        RosterEntry::new("André Onana", "Manchester United"),
    ]
}

fn fotmob_roster() -> Vec<RosterEntry> {
    vec![
        RosterEntry::with_minutes("Haaland", "Manchester City", 2790.0),
        RosterEntry::with_minutes("de Bruyne, Kevin", "Manchester City", 2100.0),
        RosterEntry::with_minutes("Ederson", "Manchester City", 2610.0),
        RosterEntry::with_minutes("Daniel Burn", "Newcastle United", 1710.0),
        RosterEntry::with_minutes("Andre Onana", "Manchester United", 3060.0),
        RosterEntry::with_minutes("Totally Unknown", "Burnley", 950.0),
        RosterEntry::with_minutes("Benchwarmer", "Burnley", 45.0),
    ]
}

fn mappings() -> ManualMappings {
    ManualMappings::from_pairs([
        ("Ederson", "Ederson Moraes"),
        ("Daniel Burn", "Dan Burn"),
        ("Haaland", "Erling Haaland"),
    ])
}

#[test]
fn full_run_resolves_every_tier() {
    let resolution = resolve_rosters(
        &fotmob_roster(),
        &understat_roster(),
        &mappings(),
        &ResolverConfig::default(),
    )
    .unwrap();

    let by_name = |name: &str| {
        resolution
            .decisions
            .iter()
            .find(|d| d.source_name == name)
            .unwrap()
    };

    // Truncated surname: manual table carries it (pure token-sort
    // scoring leaves "Haaland" vs "Erling Haaland" near 50).
    assert_eq!(
        by_name("Haaland").outcome,
        MatchOutcome::Manual {
            target: "Erling Haaland".to_string()
        }
    );

    // Manual wins over the exact match on "Ederson" itself.
    assert_eq!(
        by_name("Ederson").outcome.target(),
        Some("Ederson Moraes")
    );
    assert_eq!(by_name("Ederson").outcome.method(), MatchMethod::Manual);

    // Reordered comma form clears the fuzzy threshold at 100 after
    // token sorting.
    assert_eq!(
        by_name("de Bruyne, Kevin").outcome,
        MatchOutcome::Fuzzy {
            target: "Kevin De Bruyne".to_string(),
            score: 100
        }
    );

    // Diacritic-folded exact match.
    assert_eq!(
        by_name("Andre Onana").outcome,
        MatchOutcome::Exact {
            target: "André Onana".to_string()
        }
    );

    // Manual variation spelling.
    assert_eq!(by_name("Daniel Burn").outcome.target(), Some("Dan Burn"));

    assert_eq!(
        by_name("Totally Unknown").outcome,
        MatchOutcome::Unmatched
    );
}

#[test]
fn report_flags_only_significant_unmatched() {
    let resolution = resolve_rosters(
        &fotmob_roster(),
        &understat_roster(),
        &mappings(),
        &ResolverConfig::default(),
    )
    .unwrap();
    let report = MatchReport::from_resolution(&resolution, 95, 500.0);

    assert_eq!(report.counts.manual, 3);
    assert_eq!(report.counts.exact, 1);
    assert_eq!(report.counts.fuzzy, 1);
    assert_eq!(report.counts.unmatched, 2);
    assert_eq!(report.counts.total, 7);

    // 950-minute unknown needs a mapping; the 45-minute one does not.
    let flagged: Vec<&str> = report
        .needs_mapping
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(flagged, vec!["Totally Unknown"]);

    // The 100-score fuzzy match sits above the review bar.
    assert!(report.review.is_empty());
}

#[test]
fn join_applies_caller_policy() {
    let records: Vec<StatRecord> = fotmob_roster()
        .into_iter()
        .map(|entry| {
            let mut record = StatRecord::new(entry.name, entry.team);
            record.minutes = entry.minutes;
            record
        })
        .collect();

    let resolution = resolve_rosters(
        &fotmob_roster(),
        &understat_roster(),
        &mappings(),
        &ResolverConfig::default(),
    )
    .unwrap();

    let verified = attach_identities(&records, &resolution.decisions, UnmatchedPolicy::Drop);
    assert_eq!(verified.len(), 5);
    assert!(verified.iter().all(|r| r.match_score > 0));
    assert!(verified
        .iter()
        .any(|r| r.canonical_name == "Kevin De Bruyne"));

    let everything =
        attach_identities(&records, &resolution.decisions, UnmatchedPolicy::KeepSourceName);
    assert_eq!(everything.len(), records.len());
    let unknown = everything
        .iter()
        .find(|r| r.record.name == "Totally Unknown")
        .unwrap();
    assert_eq!(unknown.canonical_name, "Totally Unknown");
    assert_eq!(unknown.match_method, MatchMethod::Unmatched);
}
