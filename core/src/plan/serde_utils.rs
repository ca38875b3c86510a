use std::path::Path;

use crate::error::PlanError;
use crate::executor::TaskResult;

use super::types::{Plan, RawPlanFragment};

fn io_error(path: &Path, err: std::io::Error) -> PlanError {
    PlanError::Io {
        path: path.display().to_string(),
        source: err,
    }
}

fn parse_error(path: &str, err: impl std::fmt::Display) -> PlanError {
    PlanError::Parse {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Parse a YAML fragment. `source_file` fills in a missing `source_file` field.
pub fn fragment_from_yaml_str(source_file: &str, yaml: &str) -> Result<RawPlanFragment, PlanError> {
    let mut fragment: RawPlanFragment =
        serde_yaml::from_str(yaml).map_err(|e| parse_error(source_file, e))?;
    fragment.source_file.get_or_insert_with(|| source_file.to_string());
    Ok(fragment)
}

pub fn fragment_from_json_str(source_file: &str, json: &str) -> Result<RawPlanFragment, PlanError> {
    let mut fragment: RawPlanFragment =
        serde_json::from_str(json).map_err(|e| parse_error(source_file, e))?;
    fragment.source_file.get_or_insert_with(|| source_file.to_string());
    Ok(fragment)
}

/// Read a plan file, choosing JSON for `.json` and YAML otherwise.
///
/// Tasks are tagged with the file name, not the full path, so cross-file keys
/// stay stable wherever the plan directory lives.
pub fn read_fragment_file(path: impl AsRef<Path>) -> Result<RawPlanFragment, PlanError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        fragment_from_json_str(&source_file, &text)
    } else {
        fragment_from_yaml_str(&source_file, &text)
    }
}

pub fn plan_to_pretty_json(plan: &Plan) -> Result<String, PlanError> {
    serde_json::to_string_pretty(plan).map_err(|e| parse_error(&plan.name, e))
}

pub fn task_results_from_json(json: &str) -> Result<Vec<TaskResult>, PlanError> {
    serde_json::from_str(json).map_err(|e| parse_error("task results", e))
}

pub fn read_task_results_file(path: impl AsRef<Path>) -> Result<Vec<TaskResult>, PlanError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&json).map_err(|e| parse_error(&path.display().to_string(), e))
}
