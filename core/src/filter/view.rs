//! Filtered, ordered view of the task collection

use serde::Serialize;

use super::model::PriorityFilter;
use crate::task::Task;

/// Tasks matching `filter`, in collection order
pub fn filter_tasks(tasks: &[Task], filter: PriorityFilter) -> Vec<Task> {
    tasks
        .iter()
        .filter(|t| filter.matches(t.priority))
        .cloned()
        .collect()
}

/// What the task list renders: the filter in effect and the tasks passing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    pub priority: PriorityFilter,
    pub tasks: Vec<Task>,
    /// True when the list should show its empty-state placeholder
    pub empty: bool,
}

impl TaskView {
    pub fn new(tasks: &[Task], priority: PriorityFilter) -> Self {
        let tasks = filter_tasks(tasks, priority);
        let empty = tasks.is_empty();
        Self {
            priority,
            tasks,
            empty,
        }
    }
}
