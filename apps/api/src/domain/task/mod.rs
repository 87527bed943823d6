// Task domain module

#![allow(clippy::module_inception)]

pub mod task;
pub mod value_objects;

pub use task::{NewTask, Task, TaskChanges, TaskUpdateError};
pub use value_objects::{TaskPriority, TaskStatus};
