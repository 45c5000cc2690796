/*!
Component evolution and timeline extraction.

Historical snapshots are mined for status markers to reconstruct how a named
component progressed over time. Matching is deliberately heuristic: a
case-insensitive substring selects the lines that mention the component, and
fixed marker sets decide the status. Stronger markers win over weaker ones
within a single snapshot, so a document that first plans a component and
later completes it reports the completed state.
*/

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ChronicleConfig;
use crate::naming::{SnapshotNaming, UNKNOWN_MILESTONE};
use crate::snapshot::list_documents;
use crate::Result;

/// Derived status of a component within one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ComponentStatus {
    /// The component is mentioned without any status marker
    Mentioned,
    /// Unchecked box, "todo", "planned", ❌
    Planned,
    /// 🚧, "in progress", "wip"
    InProgress,
    /// Checked box, "completed", "done", ✅
    Completed,
}

impl std::fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Mentioned => "Mentioned",
            Self::Planned => "Planned",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        };
        f.write_str(text)
    }
}

/// One observation of a component in the history.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionStep {
    pub date: NaiveDate,
    pub milestone: String,
    pub status: ComponentStatus,
    pub source_file: String,
}

/// One document in the global history listing.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub milestone: String,
    /// Capture type for snapshots, "Archived" for bundles
    pub event_type: String,
    pub source_file: String,
}

/// Read-only extractor over active snapshots and archive bundles.
pub struct EvolutionTracker {
    root: PathBuf,
    config: ChronicleConfig,
    naming: SnapshotNaming,
}

impl EvolutionTracker {
    pub fn new<P: Into<PathBuf>>(root: P, config: &ChronicleConfig) -> Result<Self> {
        let naming = SnapshotNaming::new(&config.snapshot)?;
        Ok(Self {
            root: root.into(),
            config: config.clone(),
            naming,
        })
    }

    /// Timeline of a single component: every active snapshot that mentions
    /// it, ascending by date, with the strongest status marker found.
    pub fn get_evolution(&self, component: &str) -> Result<Vec<EvolutionStep>> {
        let dir = self.config.snapshots_dir(&self.root);
        let needle = component.to_lowercase();
        let mut steps = Vec::new();

        for name in list_documents(&dir)? {
            let content = fs::read_to_string(dir.join(&name))?;
            if !content.to_lowercase().contains(&needle) {
                continue;
            }
            let (date, milestone) = match self.naming.parse(&name) {
                Some(parsed) => (parsed.date, parsed.milestone),
                None => (NaiveDate::MIN, UNKNOWN_MILESTONE.to_string()),
            };
            steps.push(EvolutionStep {
                date,
                milestone,
                status: strongest_status(&content, &needle),
                source_file: name,
            });
        }

        steps.sort_by(|a, b| (a.date, &a.source_file).cmp(&(b.date, &b.source_file)));
        Ok(steps)
    }

    /// Every active and archived document as one event, ascending by date.
    ///
    /// Snapshot names are inverted through the filename template; bundle
    /// names carry their range start. A non-conforming name degrades to the
    /// minimum date and "Unknown" parts instead of failing the listing.
    pub fn get_timeline(&self) -> Result<Vec<TimelineEvent>> {
        let mut events = Vec::new();

        for name in list_documents(&self.config.snapshots_dir(&self.root))? {
            let event = match self.naming.parse(&name) {
                Some(parsed) => TimelineEvent {
                    date: parsed.date,
                    milestone: parsed.milestone,
                    event_type: parsed.capture_type,
                    source_file: name,
                },
                None => TimelineEvent {
                    date: NaiveDate::MIN,
                    milestone: UNKNOWN_MILESTONE.to_string(),
                    event_type: UNKNOWN_MILESTONE.to_string(),
                    source_file: name,
                },
            };
            events.push(event);
        }

        for name in list_documents(&self.config.archived_dir(&self.root))? {
            events.push(TimelineEvent {
                date: self.naming.parse_archive(&name).unwrap_or(NaiveDate::MIN),
                milestone: UNKNOWN_MILESTONE.to_string(),
                event_type: "Archived".to_string(),
                source_file: name,
            });
        }

        events.sort_by(|a, b| (a.date, &a.source_file).cmp(&(b.date, &b.source_file)));
        Ok(events)
    }
}

/// Strongest status over every line mentioning the component.
/// `needle` must already be lowercased.
fn strongest_status(content: &str, needle: &str) -> ComponentStatus {
    let mut strongest = ComponentStatus::Mentioned;
    for line in content.lines() {
        let lower = line.to_lowercase();
        if !lower.contains(needle) {
            continue;
        }
        strongest = strongest.max(line_status(&lower));
        if strongest == ComponentStatus::Completed {
            break;
        }
    }
    strongest
}

/// Status markers on one (lowercased) line, by fixed precedence.
fn line_status(lower: &str) -> ComponentStatus {
    const COMPLETED: [&str; 4] = ["[x]", "completed", "done", "✅"];
    const IN_PROGRESS: [&str; 3] = ["🚧", "in progress", "wip"];
    const PLANNED: [&str; 4] = ["[ ]", "todo", "planned", "❌"];

    if COMPLETED.iter().any(|marker| lower.contains(marker)) {
        ComponentStatus::Completed
    } else if IN_PROGRESS.iter().any(|marker| lower.contains(marker)) {
        ComponentStatus::InProgress
    } else if PLANNED.iter().any(|marker| lower.contains(marker)) {
        ComponentStatus::Planned
    } else {
        ComponentStatus::Mentioned
    }
}
