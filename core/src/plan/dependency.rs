//! Dependency declarations as they arrive from plan files, and their
//! normalization to canonical keys.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::error::PlanError;

use super::cross_file::{decode_cross_file_key, looks_like_cross_file_key, CrossFileDependency};

/// One `depends_on` entry before normalization.
///
/// Plan files write dependencies as integers, decimals, strings or
/// `{file, task}` mappings; every other shape is kept as `Other` so that it
/// fails normalization instead of failing deserialization of the whole file.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDependency {
    Integer(i128),
    Decimal(f64),
    Text(String),
    CrossFile(CrossFileDependency),
    Mapping(Map<String, Value>),
    Other(Value),
}

impl From<Value> for RawDependency {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Integer(i128::from(u))
                } else if let Some(f) = n.as_f64() {
                    Self::Decimal(f)
                } else {
                    Self::Other(Value::Number(n))
                }
            }
            Value::String(s) => Self::Text(s),
            Value::Object(map) => Self::Mapping(map),
            other => Self::Other(other),
        }
    }
}

impl From<i64> for RawDependency {
    fn from(value: i64) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<u32> for RawDependency {
    fn from(value: u32) -> Self {
        Self::Integer(i128::from(value))
    }
}

impl From<f64> for RawDependency {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for RawDependency {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawDependency {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CrossFileDependency> for RawDependency {
    fn from(value: CrossFileDependency) -> Self {
        Self::CrossFile(value)
    }
}

impl From<&CrossFileDependency> for RawDependency {
    fn from(value: &CrossFileDependency) -> Self {
        Self::CrossFile(value.clone())
    }
}

impl From<Box<CrossFileDependency>> for RawDependency {
    fn from(value: Box<CrossFileDependency>) -> Self {
        Self::CrossFile(*value)
    }
}

impl<'de> Deserialize<'de> for RawDependency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Self::from)
    }
}

/// Normalize one declaration to its canonical key.
///
/// - integers and whole decimals become their minimal decimal string (`2.0` -> `"2"`)
/// - fractional decimals keep their shortest faithful form (`"2.5"`)
/// - strings pass through unchanged, except that a string shaped like a
///   cross-file key must decode cleanly
/// - cross-file structs and `{file, task}` mappings are encoded as
///   `file:<name>:task:<id>`, with the task normalized recursively
pub fn normalize_dependency(raw: &RawDependency) -> Result<String, PlanError> {
    match raw {
        RawDependency::Integer(i) => Ok(i.to_string()),
        RawDependency::Decimal(f) => format_decimal(*f),
        RawDependency::Text(s) => {
            if looks_like_cross_file_key(s) {
                decode_cross_file_key(s)?;
            }
            Ok(s.clone())
        }
        RawDependency::CrossFile(dep) => {
            Ok(CrossFileDependency::new(dep.file.clone(), dep.task.clone())?.to_key())
        }
        RawDependency::Mapping(map) => normalize_mapping(map),
        RawDependency::Other(value) => Err(unsupported(value)),
    }
}

pub fn normalize_dependencies(raw: &[RawDependency]) -> Result<Vec<String>, PlanError> {
    raw.iter().map(normalize_dependency).collect()
}

/// Normalize a value that must name a single task: a number or a plain string.
///
/// Used for task numbers and for the `task` field of cross-file mappings.
pub fn normalize_scalar(raw: &RawDependency) -> Result<String, PlanError> {
    match raw {
        RawDependency::Integer(_) | RawDependency::Decimal(_) => normalize_dependency(raw),
        RawDependency::Text(s) if looks_like_cross_file_key(s) => Err(
            PlanError::MalformedDependency(format!("expected a task id, got cross-file key '{s}'")),
        ),
        RawDependency::Text(s) => Ok(s.clone()),
        RawDependency::CrossFile(_) | RawDependency::Mapping(_) => Err(
            PlanError::MalformedDependency("expected a task id, got a mapping".to_string()),
        ),
        RawDependency::Other(value) => Err(unsupported(value)),
    }
}

fn normalize_mapping(map: &Map<String, Value>) -> Result<String, PlanError> {
    let file = match map.get("file") {
        None => {
            return Err(PlanError::MalformedDependency(
                "missing required 'file'".to_string(),
            ))
        }
        Some(Value::String(s)) => s.as_str(),
        Some(_) => {
            return Err(PlanError::MalformedDependency(
                "'file' must be a string".to_string(),
            ))
        }
    };
    let task = map
        .get("task")
        .ok_or_else(|| PlanError::MalformedDependency("missing required 'task'".to_string()))?;
    let task = normalize_scalar(&RawDependency::from(task.clone()))?;

    Ok(CrossFileDependency::new(file, task)?.to_key())
}

fn format_decimal(value: f64) -> Result<String, PlanError> {
    if !value.is_finite() {
        return Err(PlanError::UnsupportedDependency {
            value: value.to_string(),
        });
    }
    // i64::MAX as f64 rounds up to 2^63, so the bound must be exclusive.
    if value.fract() == 0.0 && value.abs() < 9_223_372_036_854_775_808.0 {
        return Ok((value as i64).to_string());
    }
    Ok(value.to_string())
}

fn unsupported(value: &Value) -> PlanError {
    let value = match value {
        Value::Bool(b) => format!("boolean {b}"),
        Value::Null => "null".to_string(),
        Value::Array(items) => format!("sequence of {} items", items.len()),
        other => other.to_string(),
    };
    PlanError::UnsupportedDependency { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrossFileError;
    use serde_json::json;

    fn normalize_json(value: Value) -> Result<String, PlanError> {
        normalize_dependency(&RawDependency::from(value))
    }

    #[test]
    fn integers_and_whole_decimals_are_minimal() {
        assert_eq!(normalize_dependency(&RawDependency::from(2i64)).unwrap(), "2");
        assert_eq!(normalize_dependency(&RawDependency::from(2.0)).unwrap(), "2");
        assert_eq!(normalize_dependency(&RawDependency::from(-0.0)).unwrap(), "0");
        assert_eq!(normalize_json(json!(u64::MAX)).unwrap(), u64::MAX.to_string());
    }

    #[test]
    fn fractional_decimals_keep_shortest_form() {
        assert_eq!(normalize_dependency(&RawDependency::from(2.5)).unwrap(), "2.5");
        assert_eq!(normalize_dependency(&RawDependency::from(0.1)).unwrap(), "0.1");
        assert_eq!(normalize_json(json!(10.25)).unwrap(), "10.25");
    }

    #[test]
    fn non_finite_decimals_are_rejected() {
        assert!(matches!(
            normalize_dependency(&RawDependency::Decimal(f64::NAN)),
            Err(PlanError::UnsupportedDependency { .. })
        ));
    }

    #[test]
    fn strings_pass_through() {
        assert_eq!(normalize_dependency(&"task-a".into()).unwrap(), "task-a");
        assert_eq!(normalize_dependency(&"file:notes".into()).unwrap(), "file:notes");
        assert_eq!(
            normalize_dependency(&"file:a.yaml:task:2".into()).unwrap(),
            "file:a.yaml:task:2"
        );
    }

    #[test]
    fn malformed_cross_file_strings_fail() {
        let err = normalize_dependency(&"file::task:2".into()).unwrap_err();
        assert!(matches!(
            err,
            PlanError::CrossFileFormat(CrossFileError::EmptyFile(_))
        ));
    }

    #[test]
    fn cross_file_struct_and_pointer_forms() {
        let dep = CrossFileDependency::new("plan-01.yaml", "2").unwrap();
        assert_eq!(
            normalize_dependency(&RawDependency::from(&dep)).unwrap(),
            "file:plan-01.yaml:task:2"
        );
        assert_eq!(
            normalize_dependency(&RawDependency::from(Box::new(dep.clone()))).unwrap(),
            "file:plan-01.yaml:task:2"
        );
        assert_eq!(
            normalize_dependency(&RawDependency::from(dep)).unwrap(),
            "file:plan-01.yaml:task:2"
        );
    }

    #[test]
    fn cross_file_struct_with_empty_parts_fails() {
        let dep = RawDependency::CrossFile(CrossFileDependency {
            file: String::new(),
            task: "1".to_string(),
        });
        assert!(matches!(
            normalize_dependency(&dep),
            Err(PlanError::CrossFileFormat(CrossFileError::EmptyFile(_)))
        ));
    }

    #[test]
    fn mapping_with_unreadable_file_name_fails() {
        for file in ["x:task", ":task"] {
            assert!(matches!(
                normalize_json(json!({"file": file, "task": 1})),
                Err(PlanError::CrossFileFormat(CrossFileError::ReservedSeparator(f))) if f == file
            ));
        }
    }

    #[test]
    fn mapping_task_is_normalized_recursively() {
        assert_eq!(
            normalize_json(json!({"file": "plan-01.yaml", "task": 2})).unwrap(),
            "file:plan-01.yaml:task:2"
        );
        assert_eq!(
            normalize_json(json!({"file": "plan-01.yaml", "task": 3.0})).unwrap(),
            "file:plan-01.yaml:task:3"
        );
        assert_eq!(
            normalize_json(json!({"file": "plan-01.yaml", "task": "setup"})).unwrap(),
            "file:plan-01.yaml:task:setup"
        );
    }

    #[test]
    fn malformed_mappings_report_the_missing_piece() {
        let missing_file = normalize_json(json!({"task": 2})).unwrap_err();
        assert_eq!(
            missing_file.to_string(),
            "malformed cross-file dependency: missing required 'file'"
        );

        let missing_task = normalize_json(json!({"file": "a.yaml"})).unwrap_err();
        assert_eq!(
            missing_task.to_string(),
            "malformed cross-file dependency: missing required 'task'"
        );

        let bad_file = normalize_json(json!({"file": 7, "task": 2})).unwrap_err();
        assert_eq!(
            bad_file.to_string(),
            "malformed cross-file dependency: 'file' must be a string"
        );

        let nested = normalize_json(json!({"file": "a.yaml", "task": {"file": "b", "task": 1}}));
        assert!(matches!(nested, Err(PlanError::MalformedDependency(_))));
    }

    #[test]
    fn unsupported_shapes_fail() {
        for value in [json!(true), json!(null), json!([1, 2])] {
            assert!(matches!(
                normalize_json(value),
                Err(PlanError::UnsupportedDependency { .. })
            ));
        }
        let err = normalize_json(json!(false)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported dependency format: boolean false");
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = vec![
            RawDependency::from(1i64),
            RawDependency::from(2.5),
            RawDependency::from("task-a"),
            RawDependency::from(json!({"file": "a.yaml", "task": 4})),
        ];
        let first = normalize_dependencies(&raw).unwrap();
        let second = normalize_dependencies(&raw).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, vec!["1", "2.5", "task-a", "file:a.yaml:task:4"]);
    }

    #[test]
    fn deserializes_every_yaml_shape() {
        let yaml = r#"
- 1
- 2.0
- 2.5
- task-b
- file: plan-01-foundation.yaml
  task: 2
- true
"#;
        let raw: Vec<RawDependency> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(raw.len(), 6);
        assert!(matches!(raw[5], RawDependency::Other(Value::Bool(true))));

        let normalized: Vec<String> = raw[..5]
            .iter()
            .map(|r| normalize_dependency(r).unwrap())
            .collect();
        assert_eq!(
            normalized,
            vec!["1", "2", "2.5", "task-b", "file:plan-01-foundation.yaml:task:2"]
        );
    }

    #[test]
    fn scalar_rejects_mappings_and_keys() {
        assert_eq!(normalize_scalar(&RawDependency::from(4i64)).unwrap(), "4");
        assert!(matches!(
            normalize_scalar(&RawDependency::from("file:a.yaml:task:1")),
            Err(PlanError::MalformedDependency(_))
        ));
        assert!(matches!(
            normalize_scalar(&RawDependency::from(json!({"file": "a", "task": 1}))),
            Err(PlanError::MalformedDependency(_))
        ));
    }
}
