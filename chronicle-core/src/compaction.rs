/*!
Threshold- and age-driven consolidation of active snapshots.

Many small snapshots accumulate quickly; compaction merges the oldest of
them into one archive bundle and deletes the originals, bounding the growth
of the active set. The scheme is a flat two-tier take on an LSM tree:
bundles are terminal and never compacted again.

Durability ordering is fixed: the bundle is fully written before any
original is deleted, so a crash mid-operation leaves the active set intact.
*/

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ChronicleConfig;
use crate::naming::SnapshotNaming;
use crate::snapshot::list_documents;
use crate::Result;

/// Outcome of a compaction check.
#[derive(Debug, Clone, Serialize)]
pub struct CompactionStatus {
    pub snapshot_count: usize,
    pub needed: bool,
    pub oldest_snapshot: Option<String>,
    pub newest_snapshot: Option<String>,
    /// Which condition fired, or why none did
    pub reason: String,
    pub threshold: usize,
    pub auto_compact_enabled: bool,
}

/// Outcome of a compaction request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CompactionOutcome {
    /// Snapshots were consolidated into a new bundle
    Archived(ArchiveReport),
    /// Neither the count threshold nor the age limit was hit
    NotNeeded,
    /// The policy forbids compaction
    Disabled,
}

/// Details of a successful consolidation.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveReport {
    pub archived_count: usize,
    pub archive_path: PathBuf,
    pub archived_files: Vec<String>,
    /// Originals whose post-bundle deletion failed; the bundle is still valid
    pub orphaned: Vec<String>,
}

/// Consolidates active snapshots into archive bundles.
pub struct CompactionEngine {
    root: PathBuf,
    config: ChronicleConfig,
    naming: SnapshotNaming,
}

impl CompactionEngine {
    pub fn new<P: Into<PathBuf>>(root: P, config: &ChronicleConfig) -> Result<Self> {
        let naming = SnapshotNaming::new(&config.snapshot)?;
        Ok(Self {
            root: root.into(),
            config: config.clone(),
            naming,
        })
    }

    /// Report whether consolidation is due.
    ///
    /// Compaction is needed when the active count reaches the threshold or
    /// any snapshot is older than the age limit; the age condition is
    /// reported first when both hold. Snapshots with non-conforming names
    /// count toward the threshold but are never considered aged.
    pub fn check_needed(&self) -> Result<CompactionStatus> {
        let snapshots = list_documents(&self.config.snapshots_dir(&self.root))?;
        let policy = &self.config.compaction;

        let aged = self.aged_snapshots(&snapshots);
        let count = snapshots.len();
        let needed = count >= policy.threshold || !aged.is_empty();

        let reason = if !aged.is_empty() {
            format!(
                "{} snapshot(s) older than {} days",
                aged.len(),
                policy.max_age_days
            )
        } else if count >= policy.threshold {
            format!(
                "snapshot count {count} reached threshold {}",
                policy.threshold
            )
        } else {
            format!("no compaction needed - {count}/{} snapshots", policy.threshold)
        };

        Ok(CompactionStatus {
            snapshot_count: count,
            needed,
            oldest_snapshot: snapshots.first().cloned(),
            newest_snapshot: snapshots.last().cloned(),
            reason,
            threshold: policy.threshold,
            auto_compact_enabled: policy.auto_compact,
        })
    }

    /// Consolidate due snapshots into one archive bundle.
    ///
    /// Selection prefers every snapshot past the age limit; when only the
    /// count threshold fired, the oldest half (at least one) is taken, so a
    /// successful compaction always shrinks the active set. The bundle is
    /// written before any original is deleted; deletion failures are
    /// reported as orphans and never retried.
    pub fn compact(&self) -> Result<CompactionOutcome> {
        let policy = &self.config.compaction;
        if !policy.auto_compact {
            return Ok(CompactionOutcome::Disabled);
        }

        let status = self.check_needed()?;
        if !status.needed {
            return Ok(CompactionOutcome::NotNeeded);
        }

        let snapshots = list_documents(&self.config.snapshots_dir(&self.root))?;
        let aged = self.aged_snapshots(&snapshots);
        let selected: Vec<String> = if aged.is_empty() {
            let take = (snapshots.len() / 2).max(1);
            snapshots.into_iter().take(take).collect()
        } else {
            aged
        };

        let snapshots_dir = self.config.snapshots_dir(&self.root);
        let archived_dir = self.config.archived_dir(&self.root);
        fs::create_dir_all(&archived_dir)?;

        let (first, last) = self.date_range(&selected);
        let archive_name = self.naming.archive_name(first, last);
        let archive_path = archived_dir.join(&archive_name);

        // write the bundle first; the originals stay intact on any failure
        let mut bundle = String::new();
        bundle.push_str("# Archived History Bundle\n");
        bundle.push_str(&format!(
            "**Archived**: {}\n",
            self.naming.format_date(Utc::now().date_naive())
        ));
        bundle.push_str(&format!("**Snapshots**: {}\n", selected.len()));
        bundle.push_str(&format!(
            "**Period**: {} to {}\n",
            self.naming.format_date(first),
            self.naming.format_date(last)
        ));
        for name in &selected {
            let content = fs::read_to_string(snapshots_dir.join(name))?;
            bundle.push_str("\n---\n");
            bundle.push_str(&format!("## Source: {name}\n\n"));
            bundle.push_str(&content);
        }
        fs::write(&archive_path, &bundle)?;

        let mut orphaned = Vec::new();
        for name in &selected {
            if let Err(e) = fs::remove_file(snapshots_dir.join(name)) {
                warn!(snapshot = %name, error = %e, "failed to delete archived original");
                orphaned.push(name.clone());
            }
        }

        info!(
            archive = %archive_path.display(),
            count = selected.len(),
            "compacted snapshots into bundle"
        );
        Ok(CompactionOutcome::Archived(ArchiveReport {
            archived_count: selected.len(),
            archive_path,
            archived_files: selected,
            orphaned,
        }))
    }

    /// Snapshots whose filename date lies beyond the age limit, oldest first.
    fn aged_snapshots(&self, snapshots: &[String]) -> Vec<String> {
        let cutoff = Utc::now().date_naive() - chrono::Duration::days(self.config.compaction.max_age_days);
        snapshots
            .iter()
            .filter(|name| {
                self.naming
                    .parse(name)
                    .is_some_and(|parsed| parsed.date < cutoff)
            })
            .cloned()
            .collect()
    }

    /// Min/max filename dates of the selection; today when none parse.
    fn date_range(&self, selected: &[String]) -> (NaiveDate, NaiveDate) {
        let dates: Vec<NaiveDate> = selected
            .iter()
            .filter_map(|name| self.naming.parse(name).map(|parsed| parsed.date))
            .collect();
        match (dates.iter().min(), dates.iter().max()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                let today = Utc::now().date_naive();
                (today, today)
            }
        }
    }
}
