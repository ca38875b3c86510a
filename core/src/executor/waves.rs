use std::collections::{BTreeMap, HashMap};

use crate::error::PlanError;
use crate::plan::cross_file::is_cross_file_key;
use crate::plan::{Plan, Wave};

use super::graph::TaskGraph;

/// Group the plan's tasks into waves from its resolved dependency graph.
///
/// Wave `n` holds every task whose dependencies all sit in waves `1..n`, in
/// task order. Each wave's concurrency is capped at `max_concurrency`.
pub fn calculate_waves(
    plan: &Plan,
    graph: &TaskGraph,
    max_concurrency: usize,
) -> Result<Vec<Wave>, PlanError> {
    let refs = task_refs(plan);
    let stages = graph.stages()?;

    let waves: Vec<Wave> = stages
        .into_iter()
        .enumerate()
        .map(|(i, stage)| {
            let mut group_info: BTreeMap<String, Vec<String>> = BTreeMap::new();
            for &node in &stage {
                if let Some(group) = plan.tasks[node].worktree_group.as_deref() {
                    group_info
                        .entry(group.to_string())
                        .or_default()
                        .push(refs[node].clone());
                }
            }

            Wave {
                name: format!("Wave {}", i + 1),
                max_concurrency: max_concurrency.min(stage.len()).max(1),
                task_numbers: stage.iter().map(|&node| refs[node].clone()).collect(),
                group_info,
                source_file: None,
            }
        })
        .collect();

    tracing::debug!(waves = waves.len(), tasks = plan.tasks.len(), "waves calculated");
    Ok(waves)
}

/// Check declared waves against the resolved graph.
///
/// Every task must be scheduled exactly once, and every dependency must sit in
/// a strictly earlier wave.
pub fn validate_waves(plan: &Plan, graph: &TaskGraph) -> Result<(), PlanError> {
    let labels: Vec<String> = plan.tasks.iter().map(|t| t.label()).collect();
    let mut by_number: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, task) in plan.tasks.iter().enumerate() {
        by_number.entry(task.number.as_str()).or_default().push(i);
    }
    let by_label: HashMap<&str, usize> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let mut wave_of: Vec<Option<usize>> = vec![None; plan.tasks.len()];

    for (w, wave) in plan.waves.iter().enumerate() {
        for reference in &wave.task_numbers {
            let node = if is_cross_file_key(reference) {
                by_label.get(reference.as_str()).copied()
            } else {
                resolve_wave_number(plan, &by_number, wave, reference, &labels)?
            };

            let Some(node) = node else {
                return Err(PlanError::UnknownWaveTask {
                    wave: wave.name.clone(),
                    task: reference.clone(),
                });
            };
            if wave_of[node].replace(w).is_some() {
                return Err(PlanError::DuplicateWaveTask(labels[node].clone()));
            }
        }
    }

    for (node, wave) in wave_of.iter().enumerate() {
        let Some(wave) = *wave else {
            return Err(PlanError::TaskNotScheduled(labels[node].clone()));
        };
        for &dep in graph.dependencies(node) {
            // every node has a wave by now unless a later node is unscheduled
            let dep_wave = wave_of[dep].ok_or_else(|| PlanError::TaskNotScheduled(labels[dep].clone()))?;
            if dep_wave >= wave {
                return Err(PlanError::WaveOrderViolation {
                    task: labels[node].clone(),
                    dependency: labels[dep].clone(),
                    wave: plan.waves[wave].name.clone(),
                });
            }
        }
    }

    Ok(())
}

/// Resolve a bare task number listed in `wave`: the wave's own file first,
/// then the single task with that number anywhere in the plan.
fn resolve_wave_number(
    plan: &Plan,
    by_number: &HashMap<&str, Vec<usize>>,
    wave: &Wave,
    number: &str,
    labels: &[String],
) -> Result<Option<usize>, PlanError> {
    let candidates = by_number.get(number).map(Vec::as_slice).unwrap_or(&[]);

    if let Some(own_file) = wave.source_file.as_deref() {
        if let Some(&own) = candidates
            .iter()
            .find(|&&i| plan.tasks[i].source_file.as_deref() == Some(own_file))
        {
            return Ok(Some(own));
        }
    }

    match candidates {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        many => Err(PlanError::AmbiguousWaveTask {
            wave: wave.name.clone(),
            task: number.to_string(),
            candidates: many.iter().map(|&i| labels[i].clone()).collect(),
        }),
    }
}

/// How each task is named inside a wave: its number, or its cross-file key
/// when another fragment uses the same number.
fn task_refs(plan: &Plan) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for task in &plan.tasks {
        *counts.entry(task.number.as_str()).or_insert(0) += 1;
    }

    plan.tasks
        .iter()
        .map(|task| {
            if counts.get(task.number.as_str()).copied().unwrap_or(0) > 1 {
                task.label()
            } else {
                task.number.clone()
            }
        })
        .collect()
}
