use std::collections::HashSet;

use crate::error::PlanError;

use super::types::Task;

/// Check that a task carries the fields every executor step relies on.
pub fn validate_task(task: &Task) -> Result<(), PlanError> {
    let missing = |field: &'static str| PlanError::MissingField {
        task: display_name(task),
        field,
    };

    if task.number.trim().is_empty() {
        return Err(missing("number"));
    }
    if task.name.trim().is_empty() {
        return Err(missing("name"));
    }
    if task.prompt.trim().is_empty() {
        return Err(missing("prompt"));
    }
    Ok(())
}

/// Validate every task of one fragment and reject repeated numbers.
///
/// Dependencies are not checked here; a local key may name a task that only
/// exists in a sibling fragment.
pub fn validate_fragment_tasks(tasks: &[Task], source_file: Option<&str>) -> Result<(), PlanError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(tasks.len());
    for task in tasks {
        validate_task(task)?;
        if !seen.insert(task.number.as_str()) {
            return Err(PlanError::DuplicateTaskNumber {
                number: task.number.clone(),
                source_file: source_file.unwrap_or("<inline>").to_string(),
            });
        }
    }
    Ok(())
}

fn display_name(task: &Task) -> String {
    if !task.number.trim().is_empty() {
        task.label()
    } else if !task.name.trim().is_empty() {
        task.name.clone()
    } else {
        "<unnamed>".to_string()
    }
}
