//! Configuration for storage paths, snapshot naming, and compaction policy.
//!
//! One JSON object (`chronicle.config.json` at the workspace root) defines
//! where history lives and when it is compacted. The configuration is a plain
//! value handed to each component at construction time; nothing reads it from
//! global state.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{ChronicleError, Result};

/// Name of the on-disk configuration file, relative to the workspace root.
pub const CONFIG_FILE_NAME: &str = "chronicle.config.json";

/// Top-level configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronicleConfig {
    pub version: String,
    pub paths: StoragePaths,
    pub snapshot: SnapshotPolicy,
    pub compaction: CompactionPolicy,
    pub tracking: TrackingPolicy,
}

/// Directory layout, relative to the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoragePaths {
    /// Root of all history state
    pub history: PathBuf,
    /// Active snapshot documents
    pub snapshots: PathBuf,
    /// Consolidated archive bundles
    pub archived: PathBuf,
}

/// Snapshot naming and milestone validation rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotPolicy {
    /// strftime format used for the `{date}` placeholder
    pub date_format: String,
    /// Filename template; must contain `{date}` and `{milestone}`
    pub filename_pattern: String,
    /// Regex a milestone must fully match
    pub validation: String,
    /// Maximum milestone length in characters
    pub max_length: usize,
}

/// Thresholds that decide when active snapshots are consolidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionPolicy {
    /// Active snapshot count at which compaction becomes due
    pub threshold: usize,
    /// Snapshots older than this many days are always due
    pub max_age_days: i64,
    /// Whether compaction may run at all
    pub auto_compact: bool,
}

/// What the capture adapter collects into a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingPolicy {
    /// Glob patterns selecting documentation files to embed
    pub documentation_files: Vec<String>,
}

impl Default for ChronicleConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            paths: StoragePaths::default(),
            snapshot: SnapshotPolicy::default(),
            compaction: CompactionPolicy::default(),
            tracking: TrackingPolicy::default(),
        }
    }
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self {
            history: PathBuf::from(".chronicle"),
            snapshots: PathBuf::from(".chronicle/snapshots"),
            archived: PathBuf::from(".chronicle/archived"),
        }
    }
}

impl Default for SnapshotPolicy {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".to_string(),
            filename_pattern: "SNAPSHOT_{date}_{type}_{milestone}.md".to_string(),
            validation: "^[a-zA-Z0-9-]+$".to_string(),
            max_length: 50,
        }
    }
}

impl Default for CompactionPolicy {
    fn default() -> Self {
        Self {
            threshold: 20,
            max_age_days: 90,
            auto_compact: true,
        }
    }
}

impl Default for TrackingPolicy {
    fn default() -> Self {
        Self {
            documentation_files: vec!["*.md".to_string()],
        }
    }
}

impl ChronicleConfig {
    /// Load the configuration from `chronicle.config.json` under `root`,
    /// falling back to the defaults when the file does not exist.
    ///
    /// A file that exists but cannot be parsed is an error rather than a
    /// silent fallback.
    pub fn load_or_default<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON under `root`.
    pub fn save<P: AsRef<Path>>(&self, root: P) -> Result<PathBuf> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Validate policy fields that would otherwise fail deep inside an
    /// operation: the milestone regex must compile, the filename template
    /// must carry the placeholders the extractor inverts, and a zero
    /// threshold would make every check report compaction due.
    pub fn validate(&self) -> Result<()> {
        if self.compaction.threshold == 0 {
            return Err(ChronicleError::configuration(
                "compaction threshold must be at least 1",
            ));
        }
        if Regex::new(&self.snapshot.validation).is_err() {
            return Err(ChronicleError::configuration(format!(
                "invalid milestone validation pattern: {}",
                self.snapshot.validation
            )));
        }
        for placeholder in ["{date}", "{milestone}"] {
            if !self.snapshot.filename_pattern.contains(placeholder) {
                return Err(ChronicleError::configuration(format!(
                    "filename pattern is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(())
    }

    /// Active snapshot directory resolved against the workspace root.
    pub fn snapshots_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.paths.snapshots)
    }

    /// Archive bundle directory resolved against the workspace root.
    pub fn archived_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.paths.archived)
    }

    /// History root resolved against the workspace root.
    pub fn history_dir<P: AsRef<Path>>(&self, root: P) -> PathBuf {
        root.as_ref().join(&self.paths.history)
    }
}
