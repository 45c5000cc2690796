/*!
Linear text search across the documentation history.

No index is maintained: every query walks the stored documents newest-first
and stops as soon as the result quota is met. Matches therefore come back in
recency order, not relevance order.
*/

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::config::ChronicleConfig;
use crate::snapshot::list_documents;
use crate::Result;

/// Number of context lines shown on each side of a matched line.
const CONTEXT_LINES: usize = 2;

/// Which document sets a search visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Active snapshots only
    Active,
    /// Active snapshots plus archive bundles
    ActiveAndArchived,
}

/// One matched line with its surrounding context.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMatch {
    pub source_file: String,
    /// 1-based line number within the source file
    pub line_number: usize,
    pub matched_line: String,
    /// ±2 lines around the match; the matched line carries a `>>> ` marker
    pub context: String,
}

/// Linear search over active and archived documents.
pub struct SearchIndex {
    root: PathBuf,
    config: ChronicleConfig,
}

impl SearchIndex {
    pub fn new<P: Into<PathBuf>>(root: P, config: &ChronicleConfig) -> Self {
        Self {
            root: root.into(),
            config: config.clone(),
        }
    }

    /// Case-insensitive substring search, newest document first.
    ///
    /// Filenames are date-sortable, so descending name order is descending
    /// age. The scan short-circuits once `max_results` matches are found;
    /// repeated queries over unchanged state return identical results.
    pub fn search(
        &self,
        term: &str,
        max_results: usize,
        scope: SearchScope,
    ) -> Result<Vec<SearchMatch>> {
        let needle = term.to_lowercase();
        let mut matches = Vec::new();

        'files: for (dir, name) in self.documents(scope)? {
            let content = fs::read_to_string(dir.join(&name))?;
            let lines: Vec<&str> = content.lines().collect();
            for (index, line) in lines.iter().enumerate() {
                if !line.to_lowercase().contains(&needle) {
                    continue;
                }
                matches.push(SearchMatch {
                    source_file: name.clone(),
                    line_number: index + 1,
                    matched_line: line.trim().to_string(),
                    context: context_window(&lines, index),
                });
                if matches.len() >= max_results {
                    break 'files;
                }
            }
        }

        Ok(matches)
    }

    /// Active-directory filenames matching a simple glob: `*`, `prefix*`,
    /// `*suffix`, `*substring*`, or an exact name. Archives are excluded.
    pub fn files_by_pattern(&self, pattern: &str) -> Result<Vec<String>> {
        let names = list_documents(&self.config.snapshots_dir(&self.root))?;
        Ok(names
            .into_iter()
            .filter(|name| glob_match(pattern, name))
            .collect())
    }

    /// Documents to visit, newest-first by filename.
    fn documents(&self, scope: SearchScope) -> Result<Vec<(PathBuf, String)>> {
        let snapshots_dir = self.config.snapshots_dir(&self.root);
        let mut documents: Vec<(PathBuf, String)> = list_documents(&snapshots_dir)?
            .into_iter()
            .map(|name| (snapshots_dir.clone(), name))
            .collect();

        if scope == SearchScope::ActiveAndArchived {
            let archived_dir = self.config.archived_dir(&self.root);
            documents.extend(
                list_documents(&archived_dir)?
                    .into_iter()
                    .map(|name| (archived_dir.clone(), name)),
            );
        }

        documents.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(documents)
    }
}

/// Render the ±2-line window around `index`, marking the matched line.
fn context_window(lines: &[&str], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_LINES);
    let end = (index + CONTEXT_LINES).min(lines.len().saturating_sub(1));

    let mut window = Vec::with_capacity(end - start + 1);
    for (i, line) in lines.iter().enumerate().take(end + 1).skip(start) {
        let prefix = if i == index { ">>> " } else { "    " };
        window.push(format!("{prefix}{line}"));
    }
    window.join("\n")
}

/// Minimal glob matching: exact, prefix, suffix, and substring forms.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(rest) = pattern.strip_prefix('*') {
        if let Some(middle) = rest.strip_suffix('*') {
            return name.contains(middle);
        }
        return name.ends_with(rest);
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return name.starts_with(prefix);
    }
    pattern == name
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_snapshot(temp_dir: &TempDir, name: &str, content: &str) {
        let dir = ChronicleConfig::default().snapshots_dir(temp_dir.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn write_archive(temp_dir: &TempDir, name: &str, content: &str) {
        let dir = ChronicleConfig::default().archived_dir(temp_dir.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), content).unwrap();
    }

    fn index(temp_dir: &TempDir) -> SearchIndex {
        SearchIndex::new(temp_dir.path(), &ChronicleConfig::default())
    }

    #[test]
    fn test_search_is_case_insensitive_and_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-01-10_manual_old.md",
            "Authentication: planned\n",
        );
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-01-20_manual_new.md",
            "AUTHENTICATION: done\n",
        );

        let matches = index(&temp_dir)
            .search("authentication", 10, SearchScope::Active)
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].source_file, "SNAPSHOT_2024-01-20_manual_new.md");
        assert_eq!(matches[1].source_file, "SNAPSHOT_2024-01-10_manual_old.md");
        assert_eq!(matches[0].line_number, 1);
    }

    #[test]
    fn test_search_short_circuits_at_quota() {
        let temp_dir = TempDir::new().unwrap();
        for day in 10..20 {
            write_snapshot(
                &temp_dir,
                &format!("SNAPSHOT_2024-01-{day}_manual_m{day}.md"),
                "needle one\nneedle two\n",
            );
        }

        let matches = index(&temp_dir)
            .search("needle", 3, SearchScope::Active)
            .unwrap();
        assert_eq!(matches.len(), 3);
        // quota reached inside the newest file and its successor
        assert_eq!(matches[0].source_file, "SNAPSHOT_2024-01-19_manual_m19.md");
        assert_eq!(matches[1].source_file, "SNAPSHOT_2024-01-19_manual_m19.md");
        assert_eq!(matches[2].source_file, "SNAPSHOT_2024-01-18_manual_m18.md");
    }

    #[test]
    fn test_search_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-02-01_manual_a.md",
            "alpha\nbeta\nalpha beta\n",
        );
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-02-02_manual_b.md",
            "beta\nalpha\n",
        );

        let index = index(&temp_dir);
        let first = index.search("alpha", 10, SearchScope::Active).unwrap();
        let second = index.search("alpha", 10, SearchScope::Active).unwrap();

        let fingerprint = |matches: &[SearchMatch]| {
            matches
                .iter()
                .map(|m| (m.source_file.clone(), m.line_number))
                .collect::<Vec<_>>()
        };
        assert_eq!(fingerprint(&first), fingerprint(&second));
    }

    #[test]
    fn test_context_window_marks_match() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-03-01_manual_ctx.md",
            "one\ntwo\nthree target\nfour\nfive\n",
        );

        let matches = index(&temp_dir)
            .search("target", 1, SearchScope::Active)
            .unwrap();
        assert_eq!(matches[0].line_number, 3);
        assert_eq!(
            matches[0].context,
            "    one\n    two\n>>> three target\n    four\n    five"
        );
    }

    #[test]
    fn test_archive_scope_includes_bundles() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(
            &temp_dir,
            "SNAPSHOT_2024-04-01_manual_live.md",
            "payments live\n",
        );
        write_archive(
            &temp_dir,
            "ARCHIVE_2024-01-01_to_2024-02-01.md",
            "payments drafted\n",
        );

        let active_only = index(&temp_dir)
            .search("payments", 10, SearchScope::Active)
            .unwrap();
        assert_eq!(active_only.len(), 1);

        let all = index(&temp_dir)
            .search("payments", 10, SearchScope::ActiveAndArchived)
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].source_file, "SNAPSHOT_2024-04-01_manual_live.md");
        assert_eq!(all[1].source_file, "ARCHIVE_2024-01-01_to_2024-02-01.md");
    }

    #[test]
    fn test_missing_directories_yield_empty_results() {
        let temp_dir = TempDir::new().unwrap();
        let matches = index(&temp_dir)
            .search("anything", 10, SearchScope::ActiveAndArchived)
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_files_by_pattern_forms() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(&temp_dir, "SNAPSHOT_2024-01-01_manual_auth.md", "");
        write_snapshot(&temp_dir, "SNAPSHOT_2024-02-01_manual_search.md", "");
        write_archive(&temp_dir, "ARCHIVE_2023-01-01_to_2023-02-01.md", "");

        let index = index(&temp_dir);
        assert_eq!(index.files_by_pattern("*").unwrap().len(), 2);
        assert_eq!(index.files_by_pattern("SNAPSHOT_2024-01*").unwrap().len(), 1);
        assert_eq!(index.files_by_pattern("*auth.md").unwrap().len(), 1);
        assert_eq!(index.files_by_pattern("*manual*").unwrap().len(), 2);
        assert_eq!(
            index
                .files_by_pattern("SNAPSHOT_2024-02-01_manual_search.md")
                .unwrap()
                .len(),
            1
        );
        // archives are excluded by design
        assert!(index.files_by_pattern("ARCHIVE*").unwrap().is_empty());
    }

    #[test]
    fn test_glob_match_edges() {
        assert!(glob_match("*", "anything.md"));
        assert!(glob_match("*.md", "notes.md"));
        assert!(!glob_match("*.md", "notes.txt"));
        assert!(glob_match("SNAP*", "SNAPSHOT_x.md"));
        assert!(glob_match("*SHOT*", "SNAPSHOT_x.md"));
        assert!(glob_match("exact.md", "exact.md"));
        assert!(!glob_match("exact.md", "inexact.md"));
    }
}
