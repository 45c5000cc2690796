//! Local workspace capture adapter.
//!
//! Fills a [`DevelopmentContext`] from the filesystem: the working directory
//! and the tracked documentation files. Version-control state is left empty;
//! capturing it belongs to an external collaborator, not this tool.

use std::fs;
use std::path::PathBuf;

use chronicle_core::search::glob_match;
use chronicle_core::{ChronicleConfig, ContextCapture, DevelopmentContext};

pub struct LocalWorkspaceCapture {
    root: PathBuf,
    config: ChronicleConfig,
}

impl LocalWorkspaceCapture {
    pub fn new(root: PathBuf, config: &ChronicleConfig) -> Self {
        Self {
            root,
            config: config.clone(),
        }
    }

    /// Top-level files matching the tracking globs, path → content.
    fn collect_documentation(
        &self,
        context: &mut DevelopmentContext,
    ) -> chronicle_core::Result<()> {
        let patterns = &self.config.tracking.documentation_files;
        if !self.root.is_dir() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.path().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if patterns.iter().any(|pattern| glob_match(pattern, &name)) {
                let content = fs::read_to_string(entry.path())?;
                context.documentation.insert(name, content);
            }
        }
        Ok(())
    }
}

impl ContextCapture for LocalWorkspaceCapture {
    fn capture(&self, capture_type: &str, milestone: &str) -> chronicle_core::Result<DevelopmentContext> {
        let mut context = DevelopmentContext::new(capture_type, milestone);
        context.workspace.working_directory = self.root.clone();
        context.metadata.project_name = self
            .root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        context.metadata.tool_version = env!("CARGO_PKG_VERSION").to_string();
        context.metadata.os = std::env::consts::OS.to_string();
        context.metadata.user = std::env::var("USER").unwrap_or_default();

        self.collect_documentation(&mut context)?;
        Ok(context)
    }
}
