use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{GitmanError, Result};

/// Picks the repository directory.
///
/// When `name` differs from the last component of `path`, a sibling directory
/// called `name` is created and used instead.
pub fn target_dir(path: &Path, name: Option<&str>) -> Result<PathBuf> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(path.to_path_buf());
    };
    let path = normalize(path);
    if path.file_name() == Some(OsStr::new(name)) {
        return Ok(path);
    }
    let dir = path.parent().unwrap_or(&path).join(name);
    fs::create_dir_all(&dir).map_err(|e| GitmanError::io(&dir, e))?;
    Ok(dir)
}

/// Resolves `.` and `..` components before the path is split into parent and name.
///
/// Existing paths are canonicalized; others are cleaned lexically.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(real) = fs::canonicalize(path) {
        return real;
    }
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    clean.push(component);
                }
            }
            other => clean.push(other),
        }
    }
    clean
}

/// `git init <path>`
pub fn init_repository(path: &Path) -> Result<()> {
    run(Command::new("git").arg("init").arg(path))
}

/// `git -C <path> config <key> <value>`
pub fn set_config(path: &Path, key: &str, value: &str) -> Result<()> {
    run(Command::new("git").arg("-C").arg(path).args(["config", key, value]))
}

/// `git -C <path> remote add origin <url>`
pub fn add_remote(path: &Path, url: &str) -> Result<()> {
    run(Command::new("git")
        .arg("-C")
        .arg(path)
        .args(["remote", "add", "origin", url]))
}

/// Runs a command with inherited stdio, failing on spawn error or non-zero exit.
fn run(cmd: &mut Command) -> Result<()> {
    let command = describe(cmd);
    tracing::debug!("Running {}", command);
    let status = cmd
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| GitmanError::Other(anyhow::anyhow!("failed to run `{}`: {}", command, e)))?;
    if !status.success() {
        return Err(GitmanError::Command {
            command,
            code: status.code(),
        });
    }
    Ok(())
}

fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
