/*
 * validate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Turning parsed arguments into a [`Config`].
//!
//! Checks run in a fixed order: the topic id, then the number of input
//! files, then the input file itself (exists, is a regular file, readable).

use crate::cli::Cli;
use crate::config::Config;
use crate::error::{PhraseError, Result};
use dita_xml::is_valid_id;
use std::fs::File;
use std::path::Path;

/// Validate `args` and build the run configuration.
pub fn config_from_args(args: Cli) -> Result<Config> {
    if let Some(id) = args.id.as_deref().filter(|id| !is_valid_id(id)) {
        return Err(PhraseError::InvalidId(id.to_string()));
    }

    let mut files = args.files;
    let input = match files.len() {
        0 => return Err(PhraseError::MissingInput),
        1 => files.remove(0),
        _ => return Err(PhraseError::ArgumentCount),
    };
    check_input(&input)?;

    let mut config = Config::new(input).with_layout(args.layout);
    if let Some(id) = args.id {
        config = config.with_id(id);
    }
    if let Some(title) = args.title {
        config = config.with_title(title);
    }
    Ok(config)
}

/// Check that `path` is an existing, readable regular file.
pub fn check_input(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PhraseError::FileNotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(PhraseError::NotAFile(path.to_path_buf()));
    }
    if let Err(err) = File::open(path) {
        tracing::debug!(path = %path.display(), error = %err, "cannot open input");
        return Err(PhraseError::FileNotReadable(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::parse_from;
    use crate::config::Layout;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Cli {
        parse_from("dita-phrases", std::iter::once("dita-phrases").chain(list.iter().copied()))
            .unwrap()
    }

    fn fixture() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("attrs.adoc");
        std::fs::write(&path, ":version: 1.0\n").unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn test_valid_arguments() {
        let (_dir, path) = fixture();
        let config = config_from_args(args(&["-i", "my_id", "-t", "A & B", &path])).unwrap();
        assert_eq!(
            config,
            Config::new(PathBuf::from(&path))
                .with_id("my_id")
                .with_title("A & B")
                .with_layout(Layout::List)
        );
    }

    #[test]
    fn test_invalid_id_is_checked_first() {
        let err = config_from_args(args(&["-i", "bad id"])).unwrap_err();
        assert!(matches!(err, PhraseError::InvalidId(id) if id == "bad id"));
    }

    #[test]
    fn test_argument_count() {
        assert!(matches!(
            config_from_args(args(&[])).unwrap_err(),
            PhraseError::MissingInput
        ));
        assert!(matches!(
            config_from_args(args(&["a.adoc", "b.adoc"])).unwrap_err(),
            PhraseError::ArgumentCount
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.adoc");
        let err = config_from_args(args(&[&missing.to_string_lossy()])).unwrap_err();
        assert!(matches!(err, PhraseError::FileNotFound(path) if path == missing));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = fixture();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
        if File::open(&path).is_ok() {
            // Permission bits do not apply to root.
            return;
        }

        let err = config_from_args(args(&[&path])).unwrap_err();
        assert_eq!(err.to_string(), format!("File not readable: {path}"));
        assert!(matches!(err, PhraseError::FileNotReadable(p) if p == Path::new(&path)));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = TempDir::new().unwrap();
        let err = check_input(dir.path()).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Not a file: {}", dir.path().display())
        );
    }
}
