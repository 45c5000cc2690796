//! Development context: the value a snapshot is rendered from.
//!
//! The context is produced outside the core by an implementor of
//! [`ContextCapture`] (the capture port) and consumed immutably by the
//! snapshot store. The core never inspects version-control state itself.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// Complete development context at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevelopmentContext {
    pub timestamp: DateTime<Utc>,

    /// Unique id for this capture
    pub capture_id: String,

    /// How the capture was initiated ("manual", "scheduled", ...)
    #[serde(rename = "type")]
    pub capture_type: String,

    pub milestone: String,

    pub workspace: WorkspaceContext,

    pub git: GitContext,

    /// Tracked documentation files, path → full text. Ordered map so that
    /// rendering the same context twice produces identical output.
    pub documentation: BTreeMap<String, String>,

    pub metadata: ContextMetadata,
}

impl DevelopmentContext {
    /// Create an empty context stamped with the current time and a fresh id.
    pub fn new<S1, S2>(capture_type: S1, milestone: S2) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            timestamp: Utc::now(),
            capture_id: Uuid::new_v4().to_string(),
            capture_type: capture_type.into(),
            milestone: milestone.into(),
            workspace: WorkspaceContext::default(),
            git: GitContext::default(),
            documentation: BTreeMap::new(),
            metadata: ContextMetadata::default(),
        }
    }
}

/// State of the development workspace at capture time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceContext {
    pub working_directory: PathBuf,
    pub open_files: Vec<PathBuf>,
    pub recent_commands: Vec<CommandRecord>,
}

/// A shell command observed near capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub command: String,
    pub timestamp: DateTime<Utc>,
    pub exit_code: Option<i32>,
}

/// Version-control state, filled in by an external capture adapter.
/// All fields default to empty when no repository is present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitContext {
    pub branch: String,
    pub commit: String,
    pub commit_message: String,
    pub uncommitted_files: Vec<String>,
    pub recent_commits: Vec<CommitInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub hash: String,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
}

/// Descriptive metadata about the environment the capture ran in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextMetadata {
    pub project_name: String,
    pub tool_version: String,
    pub os: String,
    pub user: String,
    pub tags: Vec<String>,
}

/// Capture port: produces a [`DevelopmentContext`] for a snapshot.
///
/// Implementations live outside the core (the CLI ships a local workspace
/// adapter); tests use in-memory stubs with fixed timestamps.
pub trait ContextCapture {
    fn capture(&self, capture_type: &str, milestone: &str) -> Result<DevelopmentContext>;
}
