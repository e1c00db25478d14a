/*
 * resolver.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Include directive resolution.
//!
//! This module provides traits and implementations for loading the content of
//! `include::target[]` directives from various sources (filesystem, memory).

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Content loaded for an include directive.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedFile {
    /// The file's text.
    pub content: String,

    /// Directory that nested includes in this file resolve against.
    pub dir: PathBuf,
}

/// Trait for loading included files.
pub trait IncludeResolver {
    /// Load an include target.
    ///
    /// # Arguments
    /// * `target` - The target as written in the directive, attribute references resolved
    /// * `dir` - Directory of the file containing the directive
    ///
    /// # Returns
    /// The included content, or `None` if the target cannot be read.
    fn resolve(&self, target: &str, dir: &Path) -> Option<IncludedFile>;
}

/// Resolver that reads includes from the filesystem.
///
/// Targets are confined to `root`: a target that resolves outside of it is
/// treated as unreadable.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

impl FileSystemResolver {
    /// Create a resolver jailed to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl IncludeResolver for FileSystemResolver {
    fn resolve(&self, target: &str, dir: &Path) -> Option<IncludedFile> {
        let path = normalize(&dir.join(target));
        if !is_within(&path, &normalize(&self.root)) {
            tracing::warn!(include = %target, "include path outside of base directory");
            return None;
        }

        let content = std::fs::read_to_string(&path).ok()?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Some(IncludedFile { content, dir })
    }
}

/// Resolver that never resolves anything (for input without include support).
#[derive(Debug, Clone, Default)]
pub struct NullResolver;

impl IncludeResolver for NullResolver {
    fn resolve(&self, _target: &str, _dir: &Path) -> Option<IncludedFile> {
        None
    }
}

/// Resolver that serves includes from an in-memory map keyed by target.
///
/// Useful for testing without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    files: HashMap<String, String>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the resolver.
    pub fn add(&mut self, target: impl Into<String>, content: impl Into<String>) -> &mut Self {
        self.files.insert(target.into(), content.into());
        self
    }
}

impl IncludeResolver for MemoryResolver {
    fn resolve(&self, target: &str, dir: &Path) -> Option<IncludedFile> {
        self.files.get(target).map(|content| IncludedFile {
            content: content.clone(),
            dir: dir.to_path_buf(),
        })
    }
}

/// Lexically normalize a path, folding `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Whether a normalized `path` lies under a normalized `root`. A relative
/// root such as `.` normalizes to an empty path, so leading `..` components
/// are compared as well.
fn is_within(path: &Path, root: &Path) -> bool {
    let parents = |p: &Path| {
        p.components()
            .take_while(|c| matches!(c, Component::ParentDir))
            .count()
    };
    path.starts_with(root) && parents(path) <= parents(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_resolver() {
        assert_eq!(NullResolver.resolve("a.adoc", Path::new(".")), None);
    }

    #[test]
    fn test_memory_resolver() {
        let mut resolver = MemoryResolver::new();
        resolver.add("attrs.adoc", ":a: 1\n");

        let included = resolver.resolve("attrs.adoc", Path::new("docs")).unwrap();
        assert_eq!(included.content, ":a: 1\n");
        assert_eq!(included.dir, PathBuf::from("docs"));
        assert!(resolver.resolve("other.adoc", Path::new("docs")).is_none());
    }

    #[test]
    fn test_filesystem_resolver_reads_relative_files() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("shared")).unwrap();
        std::fs::write(temp.path().join("shared/attrs.adoc"), ":x: y\n").unwrap();

        let resolver = FileSystemResolver::new(temp.path());
        let included = resolver.resolve("shared/attrs.adoc", temp.path()).unwrap();
        assert_eq!(included.content, ":x: y\n");
        assert_eq!(included.dir, temp.path().join("shared"));
    }

    #[test]
    fn test_filesystem_resolver_stays_inside_root() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().join("docs");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(temp.path().join("secret.adoc"), ":x: y\n").unwrap();

        let resolver = FileSystemResolver::new(&root);
        assert!(resolver.resolve("../secret.adoc", &root).is_none());
    }

    #[test]
    fn test_working_directory_root() {
        // Tests run from the package directory.
        let resolver = FileSystemResolver::new(".");
        let included = resolver.resolve("Cargo.toml", Path::new(".")).unwrap();
        assert!(included.content.contains("adoc-engine"));
        assert!(resolver.resolve("../adoc-engine/Cargo.toml", Path::new(".")).is_none());
    }

    #[test]
    fn test_is_within() {
        assert!(is_within(Path::new("shared/a.adoc"), Path::new("")));
        assert!(!is_within(Path::new("../a.adoc"), Path::new("")));
        assert!(is_within(Path::new("../docs/a.adoc"), Path::new("../docs")));
        assert!(!is_within(Path::new("../../a.adoc"), Path::new("../docs")));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("a/./b/../c")), PathBuf::from("a/c"));
    }
}
