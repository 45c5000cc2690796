/*!
History service: the orchestrating facade over the lifecycle components.

The service composes the capture port, snapshot store, search index,
evolution tracker, and compaction engine behind the use cases a transport
exposes: create, check, compact, search, evolve, compare, init. Mutating
operations fold their failures into `{success: false, message}` records;
read-only queries return `Result` and the transport folds errors at its
single serialization boundary.
*/

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::compaction::{CompactionEngine, CompactionOutcome, CompactionStatus};
use crate::config::{ChronicleConfig, CONFIG_FILE_NAME};
use crate::context::ContextCapture;
use crate::evolution::EvolutionTracker;
use crate::results::{
    ComparisonOutcome, EvolutionOutcome, InitOutcome, SearchOutcome, SnapshotOutcome,
    TimelineOutcome,
};
use crate::search::{SearchIndex, SearchScope};
use crate::snapshot::SnapshotStore;
use crate::Result;

/// Capture type recorded for snapshots requested through the service.
const MANUAL_CAPTURE: &str = "manual";

/// Orchestrator for the snapshot history lifecycle.
pub struct HistoryService<C: ContextCapture> {
    root: PathBuf,
    config: ChronicleConfig,
    capture: C,
    store: SnapshotStore,
    index: SearchIndex,
    tracker: EvolutionTracker,
    engine: CompactionEngine,
}

impl<C: ContextCapture> HistoryService<C> {
    /// Compose the service for one workspace root.
    ///
    /// # Errors
    /// `ChronicleError::Configuration` when the configured validation or
    /// filename patterns do not compile.
    pub fn new<P: Into<PathBuf>>(root: P, config: ChronicleConfig, capture: C) -> Result<Self> {
        let root = root.into();
        config.validate()?;
        Ok(Self {
            store: SnapshotStore::new(&root, &config)?,
            index: SearchIndex::new(&root, &config),
            tracker: EvolutionTracker::new(&root, &config)?,
            engine: CompactionEngine::new(&root, &config)?,
            capture,
            config,
            root,
        })
    }

    pub fn config(&self) -> &ChronicleConfig {
        &self.config
    }

    /// The capture adapter this service snapshots through.
    pub fn capture(&self) -> &C {
        &self.capture
    }

    /// Create a snapshot for the given milestone.
    ///
    /// The milestone is validated before the context is captured, so a bad
    /// description leaves no partial state. After a successful write the
    /// compaction policy is applied; a compaction failure is logged and
    /// swallowed, and never fails the create.
    pub fn create_snapshot(&self, milestone: &str) -> SnapshotOutcome {
        match self.try_create_snapshot(milestone) {
            Ok(snapshot_path) => SnapshotOutcome {
                success: true,
                message: format!(
                    "Snapshot created successfully at {}",
                    snapshot_path.display()
                ),
                snapshot_path: Some(snapshot_path),
            },
            Err(e) => {
                error!(error = %e, "failed to create snapshot");
                SnapshotOutcome {
                    success: false,
                    snapshot_path: None,
                    message: e.to_string(),
                }
            }
        }
    }

    fn try_create_snapshot(&self, milestone: &str) -> Result<PathBuf> {
        self.store.validate_milestone(milestone)?;

        let context = self.capture.capture(MANUAL_CAPTURE, milestone)?;
        let snapshot = self.store.create(milestone, &context)?;

        if self.config.compaction.auto_compact {
            match self.engine.compact() {
                Ok(CompactionOutcome::Archived(report)) => info!(
                    archive = %report.archive_path.display(),
                    count = report.archived_count,
                    "auto-compaction archived snapshots"
                ),
                Ok(_) => {}
                Err(e) => warn!(error = %e, "auto-compaction failed after snapshot create"),
            }
        }

        Ok(snapshot.path)
    }

    /// Report whether compaction is currently due.
    pub fn check_compaction(&self) -> Result<CompactionStatus> {
        self.engine.check_needed()
    }

    /// Explicitly request compaction.
    pub fn compact(&self) -> Result<CompactionOutcome> {
        self.engine.compact()
    }

    /// Search active and archived history for a term.
    pub fn search(&self, term: &str, max_results: usize) -> Result<SearchOutcome> {
        let matches = self
            .index
            .search(term, max_results, SearchScope::ActiveAndArchived)?;
        Ok(SearchOutcome {
            search_term: term.to_string(),
            total_matches: matches.len(),
            matches,
        })
    }

    /// Active snapshot filenames matching a simple glob.
    pub fn find_files(&self, pattern: &str) -> Result<Vec<String>> {
        self.index.files_by_pattern(pattern)
    }

    /// Evolution of one component across the history.
    pub fn get_evolution(&self, component: &str) -> Result<EvolutionOutcome> {
        let steps = self.tracker.get_evolution(component)?;
        let summary = if steps.is_empty() {
            "Component not found in history".to_string()
        } else {
            format!("Component found in {} snapshots", steps.len())
        };
        Ok(EvolutionOutcome {
            component_name: component.to_string(),
            steps,
            summary,
        })
    }

    /// Every active and archived document as a dated event.
    pub fn get_timeline(&self) -> Result<TimelineOutcome> {
        Ok(TimelineOutcome {
            events: self.tracker.get_timeline()?,
        })
    }

    /// Compare two stored snapshots by name.
    pub fn compare(&self, name_a: &str, name_b: &str) -> ComparisonOutcome {
        match self.store.compare(name_a, name_b) {
            Ok(diff) => ComparisonOutcome {
                success: true,
                message: format!(
                    "Comparison complete: {} added, {} removed, {} modified",
                    diff.added.len(),
                    diff.removed.len(),
                    diff.modified.len()
                ),
                added_sections: diff.added,
                removed_sections: diff.removed,
                modified_sections: diff.modified,
            },
            Err(e) => {
                error!(error = %e, "failed to compare snapshots");
                ComparisonOutcome {
                    success: false,
                    added_sections: Vec::new(),
                    removed_sections: Vec::new(),
                    modified_sections: Vec::new(),
                    message: e.to_string(),
                }
            }
        }
    }

    /// Create the history directories and persist the configuration file
    /// when none exists yet.
    pub fn init(&self) -> InitOutcome {
        let history_dir = self.config.history_dir(&self.root);
        let snapshots_dir = self.config.snapshots_dir(&self.root);
        let archived_dir = self.config.archived_dir(&self.root);

        match self.try_init(&history_dir, &snapshots_dir, &archived_dir) {
            Ok(()) => InitOutcome {
                success: true,
                message: "Initialized chronicle history".to_string(),
                history_dir,
                snapshots_dir,
                archived_dir,
            },
            Err(e) => {
                error!(error = %e, "failed to initialize project");
                InitOutcome {
                    success: false,
                    message: e.to_string(),
                    history_dir,
                    snapshots_dir,
                    archived_dir,
                }
            }
        }
    }

    fn try_init(&self, history: &Path, snapshots: &Path, archived: &Path) -> Result<()> {
        fs::create_dir_all(history)?;
        fs::create_dir_all(snapshots)?;
        fs::create_dir_all(archived)?;

        if !self.root.join(CONFIG_FILE_NAME).exists() {
            let path = self.config.save(&self.root)?;
            info!(path = %path.display(), "wrote configuration file");
        }
        Ok(())
    }
}
