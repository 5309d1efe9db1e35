use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{GitmanError, Result};

/// A directory of template files, one file per template.
///
/// Used both for user-provided templates (`<root>/gitignores`) and for the
/// write-through cache of remote templates (`<root>/.cache/gitignores`).
#[derive(Debug, Clone)]
pub struct TemplateDir {
    dir: PathBuf,
    suffix: Option<&'static str>,
}

impl TemplateDir {
    pub fn new(dir: impl Into<PathBuf>, suffix: Option<&'static str>) -> Self {
        Self {
            dir: dir.into(),
            suffix,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists the template names in the directory.
    ///
    /// A missing directory is created and reported as empty, so later writes
    /// into it never fail on a missing parent.
    pub fn scan(&self) -> Result<BTreeSet<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                fs::create_dir_all(&self.dir).map_err(|e| GitmanError::io(&self.dir, e))?;
                tracing::debug!("Created template directory {}", self.dir.display());
                return Ok(BTreeSet::new());
            }
            Err(err) => return Err(GitmanError::io(&self.dir, err)),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| GitmanError::io(&self.dir, e))?;
            // Follows symlinks so linked templates count.
            if !entry.path().is_file() {
                continue;
            }
            let Ok(file_name) = entry.file_name().into_string() else {
                continue;
            };
            let name = match self.suffix {
                Some(suffix) => match file_name.strip_suffix(suffix) {
                    Some(stem) => stem.to_string(),
                    None => continue,
                },
                None => file_name,
            };
            if is_safe_name(&name) {
                names.insert(name);
            }
        }
        Ok(names)
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        match self.suffix {
            Some(suffix) => self.dir.join(format!("{name}{suffix}")),
            None => self.dir.join(name),
        }
    }

    /// Reads a template body. Any failure counts as "not here".
    pub fn lookup(&self, name: &str) -> Option<Vec<u8>> {
        if !is_safe_name(name) {
            return None;
        }
        let path = self.path_for(name);
        match fs::read(&path) {
            Ok(content) => Some(content),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::debug!("Ignoring unreadable template {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Writes a template body, creating the directory if needed.
    pub fn store(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        if !is_safe_name(name) {
            return Err(GitmanError::InvalidName {
                name: name.to_string(),
            });
        }
        fs::create_dir_all(&self.dir).map_err(|e| GitmanError::io(&self.dir, e))?;
        let path = self.path_for(name);
        fs::write(&path, content).map_err(|e| GitmanError::io(&path, e))?;
        Ok(path)
    }
}

/// Rejects names that would resolve outside the store directory.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.chars().any(char::is_control)
}
