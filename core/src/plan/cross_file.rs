//! Canonical cross-file dependency keys: `file:<name>:task:<id>`.
//!
//! The key format is persisted by execution history and the learning store,
//! so it must stay byte-for-byte stable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CrossFileError;

pub const CROSS_FILE_PREFIX: &str = "file:";
pub const CROSS_FILE_TASK_SEPARATOR: &str = ":task:";

/// A decoded reference to a task defined in another plan file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossFileDependency {
    pub file: String,
    pub task: String,
}

impl CrossFileDependency {
    /// Build a reference, rejecting the shapes `decode_cross_file_key` could not read back.
    pub fn new(file: impl Into<String>, task: impl Into<String>) -> Result<Self, CrossFileError> {
        let file = file.into();
        let task = task.into();

        if file.is_empty() {
            return Err(CrossFileError::EmptyFile(encode_cross_file_key(&file, &task)));
        }
        if task.is_empty() {
            return Err(CrossFileError::EmptyTask(encode_cross_file_key(&file, &task)));
        }
        let dep = Self { file, task };
        // decode splits at the first ':task:', so a file name containing it or
        // ending in ':task' would read back differently
        match decode_cross_file_key(&dep.to_key()) {
            Ok(decoded) if decoded == dep => Ok(dep),
            _ => Err(CrossFileError::ReservedSeparator(dep.file)),
        }
    }

    pub fn to_key(&self) -> String {
        encode_cross_file_key(&self.file, &self.task)
    }
}

impl fmt::Display for CrossFileDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CROSS_FILE_PREFIX}{}{CROSS_FILE_TASK_SEPARATOR}{}", self.file, self.task)
    }
}

impl FromStr for CrossFileDependency {
    type Err = CrossFileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_cross_file_key(s)
    }
}

pub fn encode_cross_file_key(file: &str, task: &str) -> String {
    format!("{CROSS_FILE_PREFIX}{file}{CROSS_FILE_TASK_SEPARATOR}{task}")
}

/// Split a canonical key into its file and task segments.
///
/// Only keys that start with `file:` and contain `:task:` are cross-file keys;
/// anything else (including `file:foo` without a task segment) is rejected
/// with [`CrossFileError::NotCrossFile`].
pub fn decode_cross_file_key(key: &str) -> Result<CrossFileDependency, CrossFileError> {
    let rest = key
        .strip_prefix(CROSS_FILE_PREFIX)
        .ok_or_else(|| CrossFileError::NotCrossFile(key.to_string()))?;
    let (file, task) = rest
        .split_once(CROSS_FILE_TASK_SEPARATOR)
        .ok_or_else(|| CrossFileError::NotCrossFile(key.to_string()))?;

    if file.is_empty() {
        return Err(CrossFileError::EmptyFile(key.to_string()));
    }
    if task.is_empty() {
        return Err(CrossFileError::EmptyTask(key.to_string()));
    }

    Ok(CrossFileDependency {
        file: file.to_string(),
        task: task.to_string(),
    })
}

/// True exactly when `decode_cross_file_key(key)` succeeds.
pub fn is_cross_file_key(key: &str) -> bool {
    decode_cross_file_key(key).is_ok()
}

/// Has the shape of a cross-file key, whether or not its segments are valid.
pub(crate) fn looks_like_cross_file_key(key: &str) -> bool {
    key.starts_with(CROSS_FILE_PREFIX) && key.contains(CROSS_FILE_TASK_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_canonical_form() {
        assert_eq!(
            encode_cross_file_key("plan-01-foundation.yaml", "2"),
            "file:plan-01-foundation.yaml:task:2"
        );
    }

    #[test]
    fn decode_is_left_inverse_of_encode() {
        let files = ["a.yaml", "plans/b.yml", "x", "with space.md", "c:colon.yaml"];
        let tasks = ["1", "2.5", "task-a", "z", "nested:task:id"];

        for file in files {
            for task in tasks {
                let dep = CrossFileDependency::new(file, task).unwrap();
                let decoded = decode_cross_file_key(&dep.to_key()).unwrap();
                assert_eq!(decoded, dep, "round trip failed for {file} / {task}");
            }
        }

        for file in ["x:task", ":task", "a:task:b"] {
            assert_eq!(
                CrossFileDependency::new(file, "1"),
                Err(CrossFileError::ReservedSeparator(file.to_string())),
                "{file} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_empty_segments() {
        assert_eq!(
            decode_cross_file_key("file::task:2"),
            Err(CrossFileError::EmptyFile("file::task:2".to_string()))
        );
        assert_eq!(
            decode_cross_file_key("file:a.yaml:task:"),
            Err(CrossFileError::EmptyTask("file:a.yaml:task:".to_string()))
        );
    }

    #[test]
    fn prefix_without_task_segment_is_not_cross_file() {
        assert!(matches!(
            decode_cross_file_key("file:notes"),
            Err(CrossFileError::NotCrossFile(_))
        ));
        assert!(!is_cross_file_key("file:notes"));
        assert!(looks_like_cross_file_key("file::task:1"));
        assert!(!looks_like_cross_file_key("file:notes"));
    }

    #[test]
    fn predicate_agrees_with_decode() {
        let samples = [
            "file:a.yaml:task:1",
            "file::task:1",
            "file:a.yaml:task:",
            "file:a.yaml",
            "2",
            "task-a",
            "FILE:a.yaml:task:1",
            "",
        ];
        for key in samples {
            assert_eq!(is_cross_file_key(key), decode_cross_file_key(key).is_ok(), "{key}");
        }
    }

    #[test]
    fn constructor_rejects_invalid_parts() {
        assert!(matches!(
            CrossFileDependency::new("", "1"),
            Err(CrossFileError::EmptyFile(_))
        ));
        assert!(matches!(
            CrossFileDependency::new("a.yaml", ""),
            Err(CrossFileError::EmptyTask(_))
        ));
        assert!(matches!(
            CrossFileDependency::new("a:task:b", "1"),
            Err(CrossFileError::ReservedSeparator(_))
        ));
    }

    #[test]
    fn display_and_parse_match() {
        let dep: CrossFileDependency = "file:a.yaml:task:3".parse().unwrap();
        assert_eq!(dep.file, "a.yaml");
        assert_eq!(dep.task, "3");
        assert_eq!(dep.to_string(), "file:a.yaml:task:3");
    }
}
