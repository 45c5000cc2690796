/*!
Snapshot creation, rendering, and structural comparison.

This module owns the write side of the history: it validates the milestone,
renders a development context into one immutable markdown document, and
persists it under the active snapshot directory. It also provides the
structural diff between two stored documents, section by section.
*/

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::info;

use crate::config::ChronicleConfig;
use crate::context::DevelopmentContext;
use crate::naming::SnapshotNaming;
use crate::{ChronicleError, Result};

/// An immutable snapshot document, as written to the active directory.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Filename stem: date + capture type + milestone
    pub id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub content: String,
}

/// Structural difference between two snapshots, by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

/// Store for active snapshot documents.
pub struct SnapshotStore {
    root: PathBuf,
    config: ChronicleConfig,
    naming: SnapshotNaming,
    validation: Regex,
}

impl SnapshotStore {
    /// Build a store for the given workspace root, compiling the milestone
    /// validation regex and the filename codec up front.
    ///
    /// # Errors
    /// `ChronicleError::Configuration` when either pattern does not compile.
    pub fn new<P: Into<PathBuf>>(root: P, config: &ChronicleConfig) -> Result<Self> {
        let naming = SnapshotNaming::new(&config.snapshot)?;
        let validation = Regex::new(&config.snapshot.validation).map_err(|e| {
            ChronicleError::configuration(format!(
                "invalid milestone validation pattern {}: {e}",
                config.snapshot.validation
            ))
        })?;
        Ok(Self {
            root: root.into(),
            config: config.clone(),
            naming,
            validation,
        })
    }

    /// Validate a milestone description without touching the filesystem.
    ///
    /// The checks run in a fixed order and each failure is a distinct error:
    /// empty/whitespace, then length, then pattern.
    pub fn validate_milestone(&self, milestone: &str) -> Result<()> {
        if milestone.trim().is_empty() {
            return Err(ChronicleError::EmptyMilestone);
        }
        let actual = milestone.chars().count();
        let max = self.config.snapshot.max_length;
        if actual > max {
            return Err(ChronicleError::MilestoneTooLong { max, actual });
        }
        if !self.validation.is_match(milestone) {
            return Err(ChronicleError::MilestonePattern {
                pattern: self.config.snapshot.validation.clone(),
            });
        }
        Ok(())
    }

    /// Render the context and write it as a new snapshot document.
    ///
    /// Creates the active directory if absent. The filename comes from the
    /// configured template; creating the same milestone and type again within
    /// one date-format granule overwrites the earlier document.
    ///
    /// # Errors
    /// * a validation error before any I/O is attempted
    /// * `ChronicleError::Io` when the directory or file cannot be written
    pub fn create(&self, milestone: &str, context: &DevelopmentContext) -> Result<Snapshot> {
        self.validate_milestone(milestone)?;

        let filename = self
            .naming
            .render(&context.timestamp, &context.capture_type, milestone);
        let dir = self.config.snapshots_dir(&self.root);
        fs::create_dir_all(&dir)?;

        let content = render_snapshot(context)?;
        let path = dir.join(&filename);
        fs::write(&path, &content)?;
        info!(path = %path.display(), milestone, "created snapshot");

        let id = filename.trim_end_matches(".md").to_string();
        Ok(Snapshot {
            id,
            path,
            created_at: context.timestamp,
            content,
        })
    }

    /// Read a stored snapshot by filename.
    pub fn load(&self, name: &str) -> Result<String> {
        let path = self.config.snapshots_dir(&self.root).join(name);
        if !path.is_file() {
            return Err(ChronicleError::SnapshotNotFound(name.to_string()));
        }
        Ok(fs::read_to_string(&path)?)
    }

    /// Compare two stored snapshots section by section.
    ///
    /// Sections are delimited by `## ` / `### ` heading lines; bodies are
    /// trimmed before comparison. The diff is purely textual.
    pub fn compare(&self, name_a: &str, name_b: &str) -> Result<SectionDiff> {
        let content_a = self.load(name_a)?;
        let content_b = self.load(name_b)?;

        let sections_a = extract_sections(&content_a);
        let sections_b = extract_sections(&content_b);

        let mut diff = SectionDiff::default();
        for name in sections_b.keys() {
            if !sections_a.contains_key(name) {
                diff.added.push(name.clone());
            }
        }
        for (name, body) in &sections_a {
            match sections_b.get(name) {
                None => diff.removed.push(name.clone()),
                Some(other) if other != body => diff.modified.push(name.clone()),
                Some(_) => {}
            }
        }
        Ok(diff)
    }
}

/// List the markdown documents in a directory, sorted ascending by name.
/// A missing directory is an empty history, not an error.
pub(crate) fn list_documents(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") && entry.path().is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Render a development context into the snapshot document format.
///
/// The output is deterministic for a given context: sections appear in a
/// fixed order and the documentation map is ordered by path.
fn render_snapshot(context: &DevelopmentContext) -> Result<String> {
    let mut out = String::new();

    out.push_str("# Development Context Snapshot\n");
    out.push_str(&format!(
        "**Timestamp**: {} UTC\n",
        context.timestamp.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!("**Type**: {}\n", context.capture_type));
    out.push_str(&format!("**Milestone**: {}\n\n", context.milestone));

    if !context.git.branch.is_empty() {
        out.push_str("## Git Context\n");
        out.push_str(&format!("- **Branch**: {}\n", context.git.branch));
        out.push_str(&format!("- **Commit**: {}\n", context.git.commit));
        out.push_str(&format!("- **Message**: {}\n", context.git.commit_message));
        if !context.git.uncommitted_files.is_empty() {
            let total = context.git.uncommitted_files.len();
            out.push_str(&format!("- **Uncommitted Files**: {total}\n"));
            for file in context.git.uncommitted_files.iter().take(10) {
                out.push_str(&format!("  - {file}\n"));
            }
            if total > 10 {
                out.push_str(&format!("  - ... and {} more\n", total - 10));
            }
        }
        out.push('\n');
    }

    out.push_str("## Workspace Context\n");
    out.push_str(&format!(
        "- **Working Directory**: {}\n",
        context.workspace.working_directory.display()
    ));
    if !context.workspace.recent_commands.is_empty() {
        out.push_str("- **Recent Commands**:\n");
        for record in context.workspace.recent_commands.iter().take(5) {
            out.push_str(&format!("  - `{}`\n", record.command));
        }
    }
    out.push('\n');

    if !context.documentation.is_empty() {
        out.push_str("## Documentation\n");
        for (file, text) in &context.documentation {
            out.push_str(&format!("### {file}\n\n"));
            out.push_str(text);
            out.push_str("\n\n---\n\n");
        }
    }

    out.push_str("## Context Metadata\n");
    out.push_str("```json\n");
    out.push_str(&serde_json::to_string(context)?);
    out.push_str("\n```\n");

    Ok(out)
}

/// Split a document into named sections keyed by their `## ` / `### `
/// heading text. Content before the first heading is ignored; bodies are
/// trimmed.
fn extract_sections(content: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut body = String::new();

    for line in content.lines() {
        if line.starts_with("## ") || line.starts_with("### ") {
            if let Some(name) = current.take() {
                sections.insert(name, body.trim().to_string());
            }
            current = Some(line.trim_start_matches('#').trim().to_string());
            body.clear();
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some(name) = current {
        sections.insert(name, body.trim().to_string());
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_context(milestone: &str) -> DevelopmentContext {
        let mut context = DevelopmentContext::new("manual", milestone);
        context.timestamp = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        context
            .documentation
            .insert("CLAUDE.md".to_string(), "## Architecture\n- Auth: Planned".to_string());
        context
    }

    fn store(temp_dir: &TempDir) -> SnapshotStore {
        SnapshotStore::new(temp_dir.path(), &ChronicleConfig::default()).unwrap()
    }

    #[test]
    fn test_validation_order_and_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        assert!(matches!(
            store.validate_milestone("").unwrap_err(),
            ChronicleError::EmptyMilestone
        ));
        assert!(matches!(
            store.validate_milestone("   ").unwrap_err(),
            ChronicleError::EmptyMilestone
        ));

        let at_limit = "a".repeat(50);
        assert!(store.validate_milestone(&at_limit).is_ok());

        let over_limit = "a".repeat(51);
        assert!(matches!(
            store.validate_milestone(&over_limit).unwrap_err(),
            ChronicleError::MilestoneTooLong { max: 50, actual: 51 }
        ));

        assert!(matches!(
            store.validate_milestone("has spaces").unwrap_err(),
            ChronicleError::MilestonePattern { .. }
        ));
        assert!(matches!(
            store.validate_milestone("under_score").unwrap_err(),
            ChronicleError::MilestonePattern { .. }
        ));

        // length is checked before the pattern: an over-long invalid string
        // still reports the length failure
        let long_invalid = "bad milestone ".repeat(10);
        assert!(matches!(
            store.validate_milestone(&long_invalid).unwrap_err(),
            ChronicleError::MilestoneTooLong { .. }
        ));
    }

    #[test]
    fn test_create_writes_one_document() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let context = fixed_context("test-feature");

        let snapshot = store.create("test-feature", &context).unwrap();
        assert_eq!(snapshot.id, "SNAPSHOT_2024-01-15_manual_test-feature");
        assert!(snapshot.path.is_file());

        let content = std::fs::read_to_string(&snapshot.path).unwrap();
        assert!(content.starts_with("# Development Context Snapshot"));
        assert!(content.contains("**Milestone**: test-feature"));
        assert!(content.contains("## Documentation"));
        assert!(content.contains("### CLAUDE.md"));
        assert!(content.contains("## Context Metadata"));
    }

    #[test]
    fn test_create_rejects_invalid_milestone_without_side_effects() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let context = fixed_context("bad milestone");

        let err = store.create("bad milestone", &context).unwrap_err();
        assert!(err.is_validation());
        // validation failed before any I/O: the directory was never created
        assert!(!ChronicleConfig::default()
            .snapshots_dir(temp_dir.path())
            .exists());
    }

    #[test]
    fn test_render_is_deterministic() {
        let context = fixed_context("same-context");
        assert_eq!(
            render_snapshot(&context).unwrap(),
            render_snapshot(&context).unwrap()
        );
    }

    #[test]
    fn test_git_section_omitted_without_branch() {
        let context = fixed_context("no-git");
        let content = render_snapshot(&context).unwrap();
        assert!(!content.contains("## Git Context"));

        let mut with_git = fixed_context("with-git");
        with_git.git.branch = "main".to_string();
        with_git.git.commit = "abc123".to_string();
        with_git.git.uncommitted_files = (0..12).map(|i| format!("file{i}.rs")).collect();
        let content = render_snapshot(&with_git).unwrap();
        assert!(content.contains("## Git Context"));
        assert!(content.contains("- **Uncommitted Files**: 12"));
        assert!(content.contains("  - ... and 2 more"));
    }

    #[test]
    fn test_extract_sections_trims_bodies() {
        let sections = extract_sections(
            "# Title\npreamble\n## Git\n\nbody line\n\n### Files\ncontent\n",
        );
        assert_eq!(sections.get("Git").unwrap(), "body line");
        assert_eq!(sections.get("Files").unwrap(), "content");
        assert_eq!(sections.len(), 2);
    }

    #[test]
    fn test_compare_reports_added_modified_removed() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let dir = ChronicleConfig::default().snapshots_dir(temp_dir.path());
        std::fs::create_dir_all(&dir).unwrap();

        std::fs::write(
            dir.join("a.md"),
            "## Git\nbranch: main\n## Workspace\ncwd: /src\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("b.md"),
            "## Git\nbranch: feature\n## Workspace\ncwd: /src\n## Documentation\nREADME\n",
        )
        .unwrap();

        let diff = store.compare("a.md", "b.md").unwrap();
        assert_eq!(diff.added, vec!["Documentation"]);
        assert_eq!(diff.modified, vec!["Git"]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn test_compare_missing_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let err = store.compare("missing-a.md", "missing-b.md").unwrap_err();
        assert!(matches!(err, ChronicleError::SnapshotNotFound(name) if name == "missing-a.md"));
    }

    #[test]
    fn test_list_documents_sorted_and_missing_dir_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_documents(&temp_dir.path().join("nowhere"))
            .unwrap()
            .is_empty());

        let dir = temp_dir.path().join("docs");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.md"), "b").unwrap();
        std::fs::write(dir.join("a.md"), "a").unwrap();
        std::fs::write(dir.join("ignored.txt"), "x").unwrap();

        assert_eq!(list_documents(&dir).unwrap(), vec!["a.md", "b.md"]);
    }
}
