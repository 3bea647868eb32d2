// src/project/gitignore.rs

use std::path::Path;

use anyhow::Result;
use tracing::debug;

use crate::fs::FileSystem;

const GITIGNORE_HEADER: &str = "# Interactive Feedback MCP Configuration";

/// Make sure `<project>/.gitignore` lists `file_name`.
///
/// Creates the file when missing and appends otherwise. Returns `true` if
/// the file was written.
pub fn ensure_gitignore_entry(
    fs: &dyn FileSystem,
    project_dir: &Path,
    file_name: &str,
) -> Result<bool> {
    let path = project_dir.join(".gitignore");

    if !fs.exists(&path) {
        fs.write(&path, format!("{GITIGNORE_HEADER}\n{file_name}\n").as_bytes())?;
        debug!(path = ?path, "created .gitignore");
        return Ok(true);
    }

    let existing = fs.read_to_string(&path)?;
    if existing.lines().any(|line| line.trim() == file_name) {
        return Ok(false);
    }

    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&format!("\n{GITIGNORE_HEADER}\n{file_name}\n"));
    fs.write(&path, updated.as_bytes())?;
    debug!(path = ?path, "appended config entry to .gitignore");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    const NAME: &str = ".interactive-feedback-config.json";

    #[test]
    fn creates_missing_gitignore() {
        let fs = MockFileSystem::new();
        assert!(ensure_gitignore_entry(&fs, Path::new("/p"), NAME).unwrap());
        let content = fs.contents("/p/.gitignore").unwrap();
        assert_eq!(content, format!("{GITIGNORE_HEADER}\n{NAME}\n"));
    }

    #[test]
    fn appends_once() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/.gitignore", "target");

        assert!(ensure_gitignore_entry(&fs, Path::new("/p"), NAME).unwrap());
        assert!(!ensure_gitignore_entry(&fs, Path::new("/p"), NAME).unwrap());

        let content = fs.contents("/p/.gitignore").unwrap();
        assert!(content.starts_with("target\n"));
        assert_eq!(content.matches(NAME).count(), 1);
    }
}
