//! Source file discovery

use crate::config::{glob_match, ProjectConfig};
use crate::models::SourceFile;
use crate::parsers::{classify, Language};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;
use tracing::{debug, warn};

/// Always skipped, whatever the config says
const DEFAULT_EXCLUDES: &[&str] = &["**/vendor/**", "**/node_modules/**"];

/// Every file under `root` in a supported language, respecting .gitignore
/// and the config's exclusions. Sorted by path so runs are reproducible.
pub(super) fn collect_source_files(root: &Path, config: &ProjectConfig) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .sort_by_file_path(|a, b| a.cmp(b));

    std::fs::metadata(root).with_context(|| format!("Cannot read {}", root.display()))?;
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() || classify(path) == Language::Generic {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        if is_excluded(relative, config) {
            debug!("Excluded {}", relative.display());
            continue;
        }

        match std::fs::read(path) {
            Ok(content) => files.push(SourceFile::new(path, content)),
            Err(e) => warn!("Cannot read {}: {}", path.display(), e),
        }
    }

    Ok(files)
}

fn is_excluded(relative: &Path, config: &ProjectConfig) -> bool {
    let path = relative.to_string_lossy().replace('\\', "/");
    config.should_exclude(relative) || DEFAULT_EXCLUDES.iter().any(|p| glob_match(p, &path))
}
