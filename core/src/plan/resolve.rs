//! Resolution of canonical dependency keys across every fragment of a merged plan.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::PlanError;
use crate::executor::TaskGraph;

use super::cross_file::{decode_cross_file_key, is_cross_file_key};
use super::types::Task;

/// Lookup tables over a merged task list. Tasks without a source file share
/// the anonymous fragment `""`.
struct TaskIndex<'a> {
    tasks: &'a [Task],
    by_file: HashMap<&'a str, HashMap<&'a str, usize>>,
    by_number: HashMap<&'a str, Vec<usize>>,
    files_by_base_name: HashMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> TaskIndex<'a> {
    fn new(tasks: &'a [Task]) -> Self {
        let mut by_file: HashMap<&str, HashMap<&str, usize>> = HashMap::new();
        let mut by_number: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut files_by_base_name: HashMap<&str, BTreeSet<&str>> = HashMap::new();

        for (i, task) in tasks.iter().enumerate() {
            let file = source_of(task);
            by_file
                .entry(file)
                .or_default()
                .entry(task.number.as_str())
                .or_insert(i);
            by_number.entry(task.number.as_str()).or_default().push(i);
            if !file.is_empty() {
                files_by_base_name
                    .entry(base_name(file))
                    .or_default()
                    .insert(file);
            }
        }

        Self {
            tasks,
            by_file,
            by_number,
            files_by_base_name,
        }
    }

    fn resolve(&self, dependent: usize, key: &str) -> Result<usize, PlanError> {
        if is_cross_file_key(key) {
            self.resolve_cross_file(dependent, key)
        } else {
            self.resolve_local(dependent, key)
        }
    }

    /// Own fragment first, then the single task with that number elsewhere.
    fn resolve_local(&self, dependent: usize, key: &str) -> Result<usize, PlanError> {
        let own_file = source_of(&self.tasks[dependent]);
        if let Some(&idx) = self.by_file.get(own_file).and_then(|m| m.get(key)) {
            return Ok(idx);
        }

        let candidates: Vec<usize> = self
            .by_number
            .get(key)
            .map(|v| {
                v.iter()
                    .copied()
                    .filter(|&i| source_of(&self.tasks[i]) != own_file)
                    .collect()
            })
            .unwrap_or_default();

        match candidates.as_slice() {
            [] => Err(self.unresolved(dependent, key)),
            [only] => Ok(*only),
            many => Err(PlanError::AmbiguousReference {
                task: self.tasks[dependent].label(),
                dependency: key.to_string(),
                candidates: many.iter().map(|&i| self.tasks[i].label()).collect(),
            }),
        }
    }

    fn resolve_cross_file(&self, dependent: usize, key: &str) -> Result<usize, PlanError> {
        let dep = decode_cross_file_key(key)?;

        let file = if self.by_file.contains_key(dep.file.as_str()) {
            dep.file.as_str()
        } else {
            let matches = self
                .files_by_base_name
                .get(base_name(&dep.file))
                .map(|files| files.iter().copied().collect::<Vec<_>>())
                .unwrap_or_default();
            match matches.as_slice() {
                [] => return Err(self.unresolved(dependent, key)),
                [only] => *only,
                many => {
                    return Err(PlanError::AmbiguousReference {
                        task: self.tasks[dependent].label(),
                        dependency: key.to_string(),
                        candidates: many.iter().map(|f| f.to_string()).collect(),
                    })
                }
            }
        };

        self.by_file
            .get(file)
            .and_then(|m| m.get(dep.task.as_str()))
            .copied()
            .ok_or_else(|| self.unresolved(dependent, key))
    }

    fn unresolved(&self, dependent: usize, key: &str) -> PlanError {
        PlanError::UnresolvedReference {
            task: self.tasks[dependent].label(),
            dependency: key.to_string(),
        }
    }
}

/// Build the dependency graph of a merged plan, resolving every key.
///
/// Node `i` of the returned graph is `tasks[i]`. Unlike
/// [`TaskGraph::from_local`], a key that names no task is an error here.
pub fn resolve_plan_graph(tasks: &[Task]) -> Result<TaskGraph, PlanError> {
    let index = TaskIndex::new(tasks);

    let mut edges = Vec::with_capacity(tasks.len());
    for (i, task) in tasks.iter().enumerate() {
        let deps = task
            .depends_on
            .iter()
            .map(|key| index.resolve(i, key))
            .collect::<Result<Vec<_>, _>>()?;
        edges.push(deps);
    }

    let labels = tasks.iter().map(Task::label).collect();
    Ok(TaskGraph::from_edges(labels, edges))
}

fn source_of(task: &Task) -> &str {
    task.source_file.as_deref().unwrap_or("")
}

fn base_name(file: &str) -> &str {
    Path::new(file)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
}
