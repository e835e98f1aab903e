//! Priority filtering
//!
//! The current filter selection and the view it derives from the task collection.

mod model;
mod store;
mod view;

pub use model::PriorityFilter;
pub use store::FilterStore;
pub use view::{filter_tasks, TaskView};
