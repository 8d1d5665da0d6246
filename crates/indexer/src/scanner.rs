use crate::component::{classify, DiscoveredFile};
use crate::error::{IndexerError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Scanner for finding agent, skill and command files under a root
pub struct FileScanner {
    root: PathBuf,
    exclude: GlobSet,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            exclude: GlobSet::empty(),
        }
    }

    /// Skip relative paths matching any of `patterns`.
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| IndexerError::InvalidGlob {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        self.exclude = builder.build().map_err(|source| IndexerError::InvalidGlob {
            pattern: "<set>".to_string(),
            source,
        })?;
        Ok(self)
    }

    /// Walk the root and return every classified component file, sorted by relative path.
    ///
    /// Hidden directories are walked because the conventional root is `.claude/`.
    pub fn scan(&self) -> Result<Vec<DiscoveredFile>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(self.root.display().to_string()));
        }

        let mut files = Vec::new();

        let root = self.root.clone();
        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .require_git(false);
        builder.filter_entry(move |entry| !FileScanner::is_ignored_scope(entry.path(), &root));

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    let Some(relative) = self.relative_path(path) else {
                        continue;
                    };
                    if self.exclude.is_match(&relative) {
                        log::debug!("Skipping excluded {relative}");
                        continue;
                    }

                    let Some(kind) = classify(&relative) else {
                        continue;
                    };

                    match std::fs::read_to_string(path) {
                        Ok(contents) => files.push(DiscoveredFile::new(kind, relative, contents)),
                        Err(e) => log::warn!("Failed to read {}: {e}", path.display()),
                    }
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        log::info!("Found {} component files", files.len());
        Ok(files)
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                std::path::Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    fn is_ignored_scope(path: &Path, root: &Path) -> bool {
        if let Ok(relative) = path.strip_prefix(root) {
            for component in relative.components() {
                if let std::path::Component::Normal(name) = component {
                    let lowered = name.to_string_lossy().to_lowercase();
                    if IGNORED_SCOPES.iter().any(|ignored| ignored == &lowered) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

const IGNORED_SCOPES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    "node_modules",
    "target",
    ".venv",
    "__pycache__",
];

const MAX_FILE_SIZE_BYTES: u64 = 1_048_576; // 1 MB
