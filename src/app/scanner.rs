use crate::app::models::{Configuration, SourceEntry};
use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use pathdiff::diff_paths;
use regex::{Regex, RegexSet};
use std::path::{Path, PathBuf};

pub const SOURCE_GLOBS: [&str; 1] = ["**/*.cs"];

/// Compiled exclusion regexes, matched anywhere in a path.
pub struct ExclusionFilter {
    set: RegexSet,
}

impl ExclusionFilter {
    pub fn new(patterns: &[String]) -> Result<Self> {
        // Compile one by one first so a bad pattern is named in the error.
        for pattern in patterns {
            Regex::new(pattern).with_context(|| format!("Invalid exclusion pattern: {}", pattern))?;
        }
        let set = RegexSet::new(patterns).context("Failed to compile exclusion patterns")?;
        Ok(Self { set })
    }

    /// Tries the path as given, then with `\` separators turned into `/`,
    /// so a pattern written with either separator applies on every platform.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let raw = path.to_string_lossy();
        if self.set.is_match(&raw) {
            return true;
        }
        raw.contains('\\') && self.set.is_match(&raw.replace('\\', "/"))
    }
}

pub struct Scanner {
    root: PathBuf,
    source_set: GlobSet,
    exclusions: ExclusionFilter,
}

impl Scanner {
    pub fn new(root: PathBuf, config: &Configuration) -> Result<Self> {
        Ok(Self {
            root,
            source_set: build_globset(&SOURCE_GLOBS)?,
            exclusions: ExclusionFilter::new(config.exclude_patterns())?,
        })
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions.is_excluded(path)
    }

    /// Lists source documents under the root, honouring `.gitignore` and the
    /// configured exclusions, sorted by path.
    pub fn scan(&self) -> Vec<SourceEntry> {
        let mut entries = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for result in walker {
            match result {
                Ok(entry) => {
                    if let Some(processed) = self.process_entry(entry.path()) {
                        entries.push(processed);
                    }
                }
                Err(err) => log::warn!("Error walking entry: {}", err),
            }
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    fn process_entry(&self, path: &Path) -> Option<SourceEntry> {
        if path.is_dir() || path.components().any(|c| c.as_os_str() == ".git") {
            return None;
        }

        let relative = diff_paths(path, &self.root)?;
        if !self.source_set.is_match(&relative) {
            return None;
        }

        if self.exclusions.is_excluded(path) {
            log::debug!("Excluded {:?}", relative);
            return None;
        }

        Some(SourceEntry {
            path: path.to_path_buf(),
            relative_path: relative.to_string_lossy().to_string(),
        })
    }
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(Glob::new(pat).context(format!("Invalid glob pattern: {}", pat))?);
    }
    Ok(builder.build()?)
}
