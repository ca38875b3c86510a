use std::collections::HashMap;

use crate::error::PlanError;
use crate::executor::types::TaskLike;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Task dependency graph (DAG) over node indices.
///
/// Node indices follow the order tasks were supplied in, which keeps
/// traversal and stage output deterministic.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    /// Node labels, by index
    labels: Vec<String>,

    /// Dependency edges: node -> nodes it depends on
    edges: Vec<Vec<usize>>,

    /// Reverse edges: node -> nodes that depend on it
    reverse_edges: Vec<Vec<usize>>,
}

impl TaskGraph {
    /// Construct a graph from labels and per-node dependency indices.
    ///
    /// Duplicate edges are collapsed and indices outside `labels` are dropped.
    pub fn from_edges(labels: Vec<String>, mut edges: Vec<Vec<usize>>) -> Self {
        let len = labels.len();
        edges.resize_with(len, Vec::new);

        let mut reverse_edges = vec![Vec::new(); len];
        for (node, deps) in edges.iter_mut().enumerate() {
            deps.retain(|&d| d < len);
            let mut seen = Vec::with_capacity(deps.len());
            deps.retain(|&d| {
                if seen.contains(&d) {
                    false
                } else {
                    seen.push(d);
                    true
                }
            });
            for &dep in deps.iter() {
                reverse_edges[dep].push(node);
            }
        }

        Self {
            labels,
            edges,
            reverse_edges,
        }
    }

    /// Construct a graph from the tasks of a single fragment.
    ///
    /// Dependencies that do not name a task in `tasks` (including cross-file
    /// keys) are not edges. When a number repeats, the first task wins.
    pub fn from_local<T: TaskLike>(tasks: &[T]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(tasks.len());
        for (i, task) in tasks.iter().enumerate() {
            index.entry(task.id()).or_insert(i);
        }

        let labels = tasks.iter().map(|t| t.id().to_string()).collect();
        let edges = tasks
            .iter()
            .map(|t| {
                t.dependencies()
                    .iter()
                    .filter_map(|d| index.get(d.as_str()).copied())
                    .collect()
            })
            .collect();

        Self::from_edges(labels, edges)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, node: usize) -> Option<&str> {
        self.labels.get(node).map(String::as_str)
    }

    pub fn dependencies(&self, node: usize) -> &[usize] {
        self.edges.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dependents(&self, node: usize) -> &[usize] {
        self.reverse_edges
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn has_cycle(&self) -> bool {
        self.find_cycle().is_some()
    }

    /// Find one cycle and return its labels, first node repeated at the end.
    ///
    /// Three-colour DFS on an explicit stack, so long dependency chains do not
    /// grow the call stack.
    ///
    /// # Time Complexity
    ///
    /// O(V + E) where V = number of tasks, E = number of dependencies
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut color = vec![Color::White; self.labels.len()];
        // (node, index of the next dependency to visit)
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for start in 0..self.labels.len() {
            if color[start] != Color::White {
                continue;
            }
            color[start] = Color::Gray;
            stack.push((start, 0));

            while let Some(&(node, next)) = stack.last() {
                let Some(&dep) = self.edges[node].get(next) else {
                    color[node] = Color::Black;
                    stack.pop();
                    continue;
                };
                if let Some(top) = stack.last_mut() {
                    top.1 += 1;
                }

                match color[dep] {
                    Color::White => {
                        color[dep] = Color::Gray;
                        stack.push((dep, 0));
                    }
                    Color::Gray => {
                        let pos = stack.iter().position(|&(n, _)| n == dep).unwrap_or(0);
                        let mut path: Vec<String> = stack[pos..]
                            .iter()
                            .map(|&(n, _)| self.labels[n].clone())
                            .collect();
                        path.push(self.labels[dep].clone());
                        return Some(path);
                    }
                    Color::Black => {}
                }
            }
        }

        None
    }

    /// Fail with [`PlanError::CycleDetected`] if the graph has a cycle.
    pub fn validate(&self) -> Result<(), PlanError> {
        match self.find_cycle() {
            Some(path) => Err(PlanError::CycleDetected { path }),
            None => Ok(()),
        }
    }

    /// Topological sort using Kahn's algorithm
    ///
    /// Returns execution stages where tasks in the same stage can run in parallel.
    /// Each stage lists node indices in input order.
    ///
    /// # Time Complexity
    ///
    /// O(V + E) where V = number of tasks, E = number of dependencies
    pub fn stages(&self) -> Result<Vec<Vec<usize>>, PlanError> {
        // edges[A] = [B, C] means A depends on B and C, so A's in-degree is 2
        let mut in_degree: Vec<usize> = self.edges.iter().map(Vec::len).collect();

        let mut stages: Vec<Vec<usize>> = Vec::new();
        let mut current: Vec<usize> = (0..self.labels.len())
            .filter(|&n| in_degree[n] == 0)
            .collect();
        let mut processed = 0;

        while !current.is_empty() {
            processed += current.len();

            let mut next = Vec::new();
            for &node in &current {
                for &dependent in &self.reverse_edges[node] {
                    in_degree[dependent] -= 1;
                    if in_degree[dependent] == 0 {
                        next.push(dependent);
                    }
                }
            }
            // Preserve input order
            next.sort_unstable();

            stages.push(std::mem::replace(&mut current, next));
        }

        if processed != self.labels.len() {
            let path = self
                .find_cycle()
                .unwrap_or_else(|| vec!["unable to complete topological sort".to_string()]);
            return Err(PlanError::CycleDetected { path });
        }

        Ok(stages)
    }
}

/// Report whether a single fragment's tasks contain a cycle.
///
/// A task listing itself is reported before any graph is built; dependencies
/// that name no task in `tasks` are ignored.
pub fn has_cycle<T: TaskLike>(tasks: &[T]) -> bool {
    find_cycle(tasks).is_some()
}

/// Like [`has_cycle`], returning the offending path.
pub fn find_cycle<T: TaskLike>(tasks: &[T]) -> Option<Vec<String>> {
    if let Some(task) = tasks
        .iter()
        .find(|t| t.dependencies().iter().any(|d| d == t.id()))
    {
        return Some(vec![task.id().to_string(), task.id().to_string()]);
    }

    TaskGraph::from_local(tasks).find_cycle()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::Task;

    fn task(number: &str, deps: &[&str]) -> Task {
        Task::new(number, format!("Task {number}"), "prompt").with_dependencies(deps.iter().copied())
    }

    #[test]
    fn empty_graph_has_no_cycle() {
        let tasks: Vec<Task> = Vec::new();
        assert!(!has_cycle(&tasks));
        assert!(TaskGraph::from_local(&tasks).stages().unwrap().is_empty());
    }

    #[test]
    fn simple_chain_has_no_cycle() {
        assert!(!has_cycle(&[task("1", &[]), task("2", &["1"])]));
    }

    #[test]
    fn two_node_cycle() {
        let tasks = [task("1", &["2"]), task("2", &["1"])];
        assert!(has_cycle(&tasks));
        assert_eq!(find_cycle(&tasks).unwrap(), vec!["1", "2", "1"]);
    }

    #[test]
    fn self_loop_is_reported_directly() {
        let tasks = [task("1", &["1"])];
        assert!(has_cycle(&tasks));
        assert_eq!(find_cycle(&tasks).unwrap(), vec!["1", "1"]);
    }

    #[test]
    fn back_edge_anywhere_in_chain() {
        for from in 1..=5 {
            for to in from..=5 {
                // chain 1 <- 2 <- 3 <- 4 <- 5, plus `from` depending on `to`
                let mut tasks: Vec<Task> = (1..=5)
                    .map(|n| {
                        let deps: Vec<String> = if n > 1 {
                            vec![(n - 1).to_string()]
                        } else {
                            Vec::new()
                        };
                        Task::new(n.to_string(), "t", "p").with_dependencies(deps)
                    })
                    .collect();
                tasks[from - 1].depends_on.push(to.to_string());
                assert!(has_cycle(&tasks), "back edge {from} -> {to} not detected");
            }
        }
    }

    #[test]
    fn unknown_and_cross_file_dependencies_are_ignored() {
        let tasks = [
            task("1", &["99"]),
            task("2", &["1", "file:other.yaml:task:2"]),
        ];
        assert!(!has_cycle(&tasks));
        let graph = TaskGraph::from_local(&tasks);
        assert_eq!(graph.dependencies(1), &[0]);
        assert!(graph.dependencies(0).is_empty());
    }

    #[test]
    fn stages_follow_dependencies_in_input_order() {
        let tasks = [
            task("a", &[]),
            task("b", &["a"]),
            task("c", &[]),
            task("d", &["b", "c"]),
            task("e", &["a"]),
        ];
        let graph = TaskGraph::from_local(&tasks);
        let stages = graph.stages().unwrap();
        assert_eq!(stages, vec![vec![0, 2], vec![1, 4], vec![3]]);
        assert_eq!(graph.dependents(0), &[1, 4]);
    }

    #[test]
    fn stages_fail_on_cycle() {
        let tasks = [task("1", &[]), task("2", &["3"]), task("3", &["2"])];
        let err = TaskGraph::from_local(&tasks).stages().unwrap_err();
        match err {
            PlanError::CycleDetected { path } => assert_eq!(path, vec!["2", "3", "2"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let tasks: Vec<Task> = (0..100_000)
            .map(|n| {
                let deps: Vec<String> = if n > 0 {
                    vec![(n - 1).to_string()]
                } else {
                    Vec::new()
                };
                Task::new(n.to_string(), "t", "p").with_dependencies(deps)
            })
            .collect();
        assert!(!has_cycle(&tasks));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let graph = TaskGraph::from_edges(
            vec!["x".to_string(), "y".to_string()],
            vec![vec![], vec![0, 0, 7]],
        );
        assert_eq!(graph.dependencies(1), &[0]);
        assert_eq!(graph.stages().unwrap(), vec![vec![0], vec![1]]);
    }
}
