//! Priority filter selector

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::task::TaskPriority;
use crate::{Error, Result};

/// Which priority the task list is narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Medium,
    High,
}

impl PriorityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Whether a task with `priority` passes this filter
    pub fn matches(&self, priority: TaskPriority) -> bool {
        match self {
            Self::All => true,
            Self::Low => priority == TaskPriority::Low,
            Self::Medium => priority == TaskPriority::Medium,
            Self::High => priority == TaskPriority::High,
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "All" => Ok(Self::All),
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            other => Err(Error::InvalidFilter(other.to_string())),
        }
    }
}
