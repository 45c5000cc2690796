/*!
# Chronicle Core Engine

Chronological, queryable history of a project's documentation state.

This crate provides the snapshot lifecycle engine: validated snapshot
creation, threshold- and age-driven compaction that consolidates small
snapshots into long-term archive bundles, linear text search over active and
archived documents, and a component-evolution extractor that mines the
history for status markers.

## Architecture

The core keeps infrastructure at the edges:

- Context capture is a port ([`ContextCapture`]); adapters live in the
  binaries and in tests.
- Configuration is an explicit value ([`ChronicleConfig`]) handed to each
  component; there is no global state.
- Each use case returns a typed result record; transports serialize those at
  one boundary.

Every operation is a bounded, synchronous read/write sequence. Read-only
queries may run concurrently; nothing coordinates two writers racing on the
same directory, which is a deliberate single-local-writer assumption.

## Usage

```no_run
use chronicle_core::{ChronicleConfig, ContextCapture, DevelopmentContext, HistoryService};

struct Capture;

impl ContextCapture for Capture {
    fn capture(
        &self,
        capture_type: &str,
        milestone: &str,
    ) -> chronicle_core::Result<DevelopmentContext> {
        Ok(DevelopmentContext::new(capture_type, milestone))
    }
}

let config = ChronicleConfig::default();
let service = HistoryService::new("/path/to/project", config, Capture)?;

let outcome = service.create_snapshot("feature-landed");
assert!(outcome.success);

let results = service.search("feature", 5)?;
println!("{} matches", results.total_matches);
# Ok::<(), chronicle_core::ChronicleError>(())
```
*/

pub mod compaction;
pub mod config;
pub mod context;
pub mod error;
pub mod evolution;
pub mod naming;
pub mod results;
pub mod search;
pub mod service;
pub mod snapshot;

pub use compaction::{ArchiveReport, CompactionEngine, CompactionOutcome, CompactionStatus};
pub use config::{ChronicleConfig, CompactionPolicy, SnapshotPolicy, StoragePaths, TrackingPolicy};
pub use context::{ContextCapture, DevelopmentContext, GitContext, WorkspaceContext};
pub use error::{ChronicleError, Result};
pub use evolution::{ComponentStatus, EvolutionStep, EvolutionTracker, TimelineEvent};
pub use results::{
    ComparisonOutcome, EvolutionOutcome, InitOutcome, SearchOutcome, SnapshotOutcome,
    TimelineOutcome,
};
pub use search::{SearchIndex, SearchMatch, SearchScope};
pub use service::HistoryService;
pub use snapshot::{SectionDiff, Snapshot, SnapshotStore};
