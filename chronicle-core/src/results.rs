//! Typed result records for the service boundary.
//!
//! Each operation returns one explicit record; transports serialize these
//! (or an error fold of `{success: false, message}`) in a single place
//! instead of assembling ad hoc JSON per call site.

use std::path::PathBuf;

use serde::Serialize;

use crate::evolution::{EvolutionStep, TimelineEvent};
use crate::search::SearchMatch;

/// Result of a snapshot creation request.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotOutcome {
    pub success: bool,
    pub snapshot_path: Option<PathBuf>,
    pub message: String,
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonOutcome {
    pub success: bool,
    pub added_sections: Vec<String>,
    pub removed_sections: Vec<String>,
    pub modified_sections: Vec<String>,
    pub message: String,
}

/// Result of a history search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub search_term: String,
    pub total_matches: usize,
    pub matches: Vec<SearchMatch>,
}

/// Result of a component evolution query.
#[derive(Debug, Clone, Serialize)]
pub struct EvolutionOutcome {
    pub component_name: String,
    pub steps: Vec<EvolutionStep>,
    pub summary: String,
}

/// Result of a timeline listing.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineOutcome {
    pub events: Vec<TimelineEvent>,
}

/// Result of project initialization.
#[derive(Debug, Clone, Serialize)]
pub struct InitOutcome {
    pub success: bool,
    pub message: String,
    pub history_dir: PathBuf,
    pub snapshots_dir: PathBuf,
    pub archived_dir: PathBuf,
}
