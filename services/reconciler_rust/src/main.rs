//! Reconciliation run orchestrator.
//!
//! Loads the Understat season roster and every FotMob season dataset
//! from the data directory, resolves FotMob names to canonical
//! Understat identities, logs the audit report, and writes the matched
//! datasets plus a run-tagged report file for the downstream
//! reshaping stage.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dotenv::dotenv;
use pitchmatch_core::{
    attach_identities, resolve_rosters, ManualMappings, MatchDecision, MatchReport, ResolverConfig,
    RosterEntry, StatRecord, UnmatchedPolicy,
};
use serde::Serialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Everything one run needs, resolved from the environment up front.
#[derive(Debug)]
struct RunConfig {
    data_dir: PathBuf,
    resolver: ResolverConfig,
    min_minutes: f64,
    keep_unmatched: bool,
    mappings_file: Option<PathBuf>,
    dry_run: bool,
}

impl RunConfig {
    fn from_env() -> Result<Self> {
        let data_dir =
            PathBuf::from(env::var("RECONCILER_DATA_DIR").unwrap_or_else(|_| "data".to_string()));

        let resolver = ResolverConfig {
            fuzzy_threshold: parse_env("RECONCILER_FUZZY_THRESHOLD", 85)?,
            review_threshold: parse_env("RECONCILER_REVIEW_THRESHOLD", 95)?,
        };
        resolver
            .validate()
            .context("invalid resolver configuration")?;

        Ok(Self {
            data_dir,
            resolver,
            min_minutes: parse_env("RECONCILER_MIN_MINUTES", 500.0)?,
            keep_unmatched: env_flag("RECONCILER_KEEP_UNMATCHED"),
            mappings_file: env::var("RECONCILER_MAPPINGS_FILE").ok().map(PathBuf::from),
            dry_run: env_flag("RECONCILER_DRY_RUN"),
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {key}: {raw}")),
        Err(_) => Ok(default),
    }
}

fn env_flag(key: &str) -> bool {
    let val = env::var(key).unwrap_or_else(|_| "0".to_string());
    matches!(val.to_lowercase().as_str(), "1" | "true" | "yes")
}

/// Per-dataset slice of the run report, including the full decision
/// list as the name-mapping reference for operators.
#[derive(Debug, Serialize)]
struct DatasetReport {
    dataset: String,
    report: MatchReport,
    decisions: Vec<MatchDecision>,
}

/// Audit file written at the end of a run.
#[derive(Debug, Serialize)]
struct ReportEnvelope {
    run_id: Uuid,
    generated_at: DateTime<Utc>,
    fuzzy_threshold: u8,
    review_threshold: u8,
    significance_threshold: f64,
    datasets: Vec<DatasetReport>,
}

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = RunConfig::from_env()?;
    let run_id = Uuid::new_v4();

    info!(
        "Starting reconciler run {} (threshold: {}, review: {}, min minutes: {}, keep unmatched: {}, dry run: {})",
        run_id,
        config.resolver.fuzzy_threshold,
        config.resolver.review_threshold,
        config.min_minutes,
        config.keep_unmatched,
        config.dry_run,
    );

    let mappings = load_mappings(&config)?;
    info!("Loaded {} manual mappings", mappings.len());

    let understat = load_roster(&config.data_dir.join("understat_players.json"))?;
    info!("Understat roster: {} players", understat.len());

    let datasets = discover_fotmob_datasets(&config.data_dir)?;
    if datasets.is_empty() {
        warn!(
            "No fotmob_*_season.json datasets found in {}",
            config.data_dir.display()
        );
    }

    let policy = if config.keep_unmatched {
        UnmatchedPolicy::KeepSourceName
    } else {
        UnmatchedPolicy::Drop
    };

    let mut dataset_reports = Vec::new();
    for path in datasets {
        let dataset_report = reconcile_dataset(&path, &understat, &mappings, &config, policy)?;
        dataset_reports.push(dataset_report);
    }

    if config.dry_run {
        info!("Dry run: no report file written");
        return Ok(());
    }

    let envelope = ReportEnvelope {
        run_id,
        generated_at: Utc::now(),
        fuzzy_threshold: config.resolver.fuzzy_threshold,
        review_threshold: config.resolver.review_threshold,
        significance_threshold: config.min_minutes,
        datasets: dataset_reports,
    };
    let report_path = config.data_dir.join(format!("match_report_{run_id}.json"));
    write_json(&report_path, &envelope)?;
    info!("Wrote run report to {}", report_path.display());

    Ok(())
}

/// Run the resolver over one FotMob dataset and write its matched
/// counterpart next to it.
fn reconcile_dataset(
    path: &Path,
    understat: &[RosterEntry],
    mappings: &ManualMappings,
    config: &RunConfig,
    policy: UnmatchedPolicy,
) -> Result<DatasetReport> {
    let dataset = dataset_name(path);
    info!("Matching dataset {dataset}");

    let records = load_records(path)?;
    let sources: Vec<RosterEntry> = records.iter().map(StatRecord::roster_entry).collect();

    let resolution = resolve_rosters(&sources, understat, mappings, &config.resolver)
        .with_context(|| format!("resolution failed for {dataset}"))?;
    let report = MatchReport::from_resolution(
        &resolution,
        config.resolver.review_threshold,
        config.min_minutes,
    );

    for line in report.to_string().lines() {
        info!("{line}");
    }

    let resolved = attach_identities(&records, &resolution.decisions, policy);
    info!(
        "{dataset}: {} of {} records carried forward",
        resolved.len(),
        records.len()
    );

    if !config.dry_run {
        let out_path = path.with_file_name(format!("{dataset}_matched.json"));
        write_json(&out_path, &resolved)?;
        info!("Wrote matched dataset to {}", out_path.display());
    }

    Ok(DatasetReport {
        dataset,
        report,
        decisions: resolution.decisions,
    })
}

fn load_mappings(config: &RunConfig) -> Result<ManualMappings> {
    match &config.mappings_file {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read mappings file {}", path.display()))?;
            ManualMappings::from_json_str(&raw)
                .with_context(|| format!("failed to parse mappings file {}", path.display()))
        }
        None => Ok(ManualMappings::premier_league()),
    }
}

fn load_roster(path: &Path) -> Result<Vec<RosterEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse roster {}", path.display()))
}

fn load_records(path: &Path) -> Result<Vec<StatRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse dataset {}", path.display()))
}

/// FotMob season datasets in the data dir, sorted for deterministic
/// run order.
fn discover_fotmob_datasets(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("failed to read data dir {}", data_dir.display()))?;

    let mut datasets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|name| name.starts_with("fotmob_") && name.ends_with("_season.json"))
                .unwrap_or(false)
        })
        .collect();

    datasets.sort();
    Ok(datasets)
}

fn dataset_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}
