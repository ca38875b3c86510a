use std::collections::HashMap;

use crate::error::PlanError;
use crate::executor::TaskGraph;

use super::resolve::resolve_plan_graph;
use super::types::Plan;

/// Combine per-file plans into one, in fragment order.
///
/// Tasks, waves and worktree groups are appended as-is; task numbers are not
/// renumbered. The merged graph is then resolved across fragments and checked
/// for cycles, so a dependency loop that spans files fails here even though
/// each fragment was acyclic on its own.
pub fn merge_plans(fragments: Vec<Plan>) -> Result<Plan, PlanError> {
    merge_with_graph(fragments).map(|(plan, _)| plan)
}

pub(crate) fn merge_with_graph(fragments: Vec<Plan>) -> Result<(Plan, TaskGraph), PlanError> {
    if fragments.is_empty() {
        return Err(PlanError::NoFragments);
    }

    let fragment_count = fragments.len();
    let mut merged = Plan::default();

    for (i, fragment) in fragments.into_iter().enumerate() {
        tracing::debug!(
            fragment = i,
            name = %fragment.name,
            tasks = fragment.tasks.len(),
            waves = fragment.waves.len(),
            "merging plan fragment"
        );

        if merged.name.is_empty() {
            merged.name = fragment.name;
        }
        if i == 0 || (!merged.quality_control.enabled && fragment.quality_control.enabled) {
            merged.quality_control = fragment.quality_control;
        }

        merged.tasks.extend(fragment.tasks);
        merged.waves.extend(fragment.waves);
        merged.worktree_groups.extend(fragment.worktree_groups);
        for (file, numbers) in fragment.file_to_task_map {
            merged
                .file_to_task_map
                .entry(file)
                .or_default()
                .extend(numbers);
        }

        if merged.planner_compliance.is_none() {
            merged.planner_compliance = fragment.planner_compliance;
        }
        if merged.data_flow_registry.is_none() {
            merged.data_flow_registry = fragment.data_flow_registry;
        }
    }

    warn_shared_numbers(&merged);

    let graph = resolve_plan_graph(&merged.tasks)?;
    graph.validate()?;

    tracing::debug!(
        fragments = fragment_count,
        tasks = merged.tasks.len(),
        "merged plan validated"
    );

    Ok((merged, graph))
}

fn warn_shared_numbers(plan: &Plan) {
    let mut files_by_number: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in &plan.tasks {
        files_by_number
            .entry(task.number.as_str())
            .or_default()
            .push(task.source_file.as_deref().unwrap_or("<unknown>"));
    }

    let mut shared: Vec<(&str, Vec<&str>)> = files_by_number
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .collect();
    shared.sort();

    for (number, files) in shared {
        tracing::warn!(
            "task number {} is defined in several files ({}); refer to it with file:<name>:task:{} from other files",
            number,
            files.join(", "),
            number
        );
    }
}
