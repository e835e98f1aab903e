//! Ordered task collection
//!
//! The order of the collection is the drag position shown to the user.
//! Ids are unique; every mutation leaves a fully-defined ordering.

use serde::{Deserialize, Deserializer, Serialize};
use std::ops::Deref;

use super::model::Task;
use crate::{Error, Result};

/// How `move_task` treats indices outside the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderMode {
    /// Fail with `Error::IndexOutOfRange`
    #[default]
    Reject,
    /// Pull indices back to the nearest valid position
    Clamp,
}

/// An ordered, id-unique list of tasks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from persisted tasks, keeping the first entry for any repeated id
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut list = Self::new();
        for task in tasks {
            if list.contains(&task.id) {
                tracing::warn!("Dropping duplicate task id from storage: {}", task.id);
                continue;
            }
            list.tasks.push(task);
        }
        list
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Index of the task with the given id
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Append a task to the end of the list
    pub fn add_task(&mut self, task: Task) -> Result<()> {
        if self.contains(&task.id) {
            return Err(Error::DuplicateTask(task.id));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Remove the task with the given id
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Replace the task with the same id, keeping its position
    pub fn update_task(&mut self, updated: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Move the task at `from` so that it sits at `to` in the list left after removing it.
    ///
    /// `to == len` is accepted and means "end of list". Returns `false` when the
    /// resulting order equals the current one.
    pub fn move_task(&mut self, from: usize, to: usize, mode: ReorderMode) -> Result<bool> {
        let len = self.tasks.len();
        let (from, to) = match mode {
            ReorderMode::Reject => {
                if from >= len {
                    return Err(Error::IndexOutOfRange { index: from, len });
                }
                if to > len {
                    return Err(Error::IndexOutOfRange { index: to, len });
                }
                (from, to)
            }
            ReorderMode::Clamp => {
                if len == 0 {
                    return Ok(false);
                }
                (from.min(len - 1), to)
            }
        };

        // After removal there are len - 1 slots to insert into
        let to = to.min(len - 1);
        if from == to {
            return Ok(false);
        }

        let task = self.tasks.remove(from);
        self.tasks.insert(to, task);
        Ok(true)
    }

    pub fn into_vec(self) -> Vec<Task> {
        self.tasks
    }
}

impl Deref for TaskList {
    type Target = [Task];

    fn deref(&self) -> &[Task] {
        &self.tasks
    }
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Vec::<Task>::deserialize(deserializer).map(Self::from_tasks)
    }
}
