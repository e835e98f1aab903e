//! Task model definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{Error, Result};

/// Message shown when a draft is missing its title or description
pub const MISSING_FIELDS_MESSAGE: &str = "Please enter both a title and description.";

/// Task priority level
///
/// Serialized as `"Low"`, `"Medium"` or `"High"`, which is also the on-disk format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Low
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A to-do entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
}

impl Task {
    /// Create a task with a caller-supplied id
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            priority: TaskPriority::default(),
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Unvalidated task-creation form state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
}

impl NewTask {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: TaskPriority::default(),
        }
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Reject drafts whose title or description is blank
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(Error::Validation(MISSING_FIELDS_MESSAGE.to_string()));
        }
        Ok(())
    }

    /// Validate and turn the draft into a task with a fresh UUID v4 id
    pub fn into_task(self) -> Result<Task> {
        self.into_task_with_id(Uuid::new_v4().to_string())
    }

    /// Validate and turn the draft into a task with the given id
    pub fn into_task_with_id(self, id: impl Into<String>) -> Result<Task> {
        self.validate()?;
        Ok(Task {
            id: id.into(),
            title: self.title,
            description: self.description,
            priority: self.priority,
        })
    }
}
