//! Operations over an in-memory task collection. Nothing here touches storage;
//! the caller loads the collection, applies one operation and saves it back.

use crate::error::{Error, Result, ValidationError};
use crate::model::{StatusFilter, Task};
use crate::validate::{validate_description, validate_id};

/// One past the largest id in the collection. Deleting a task leaves a gap
/// that is never filled, so this scans for the maximum instead of counting.
/// Fails once the largest id is `i64::MAX`.
pub fn next_id(tasks: &[Task]) -> Result<i64, ValidationError> {
    let max = tasks.iter().map(|t| t.id).max().unwrap_or(0).max(0);
    max.checked_add(1).ok_or(ValidationError::IdOverflow)
}

/// First task with the given id, in collection order.
fn find_index(tasks: &[Task], id: i64) -> Result<usize> {
    validate_id(id)?;
    tasks
        .iter()
        .position(|t| t.id == id)
        .ok_or(Error::NotFound(id))
}

/// Append a new pending task and return a reference to it.
pub fn add_task<'a>(tasks: &'a mut Vec<Task>, description: &str) -> Result<&'a Task> {
    validate_description(description)?;
    let id = next_id(tasks)?;
    tasks.push(Task {
        id,
        description: description.to_string(),
        done: false,
    });
    tracing::debug!(id, "added task");
    Ok(&tasks[tasks.len() - 1])
}

/// Tasks matching `filter`, in collection order. Unknown filter names behave
/// like "all".
pub fn list_tasks(tasks: &[Task], filter: &str) -> Vec<Task> {
    let filter = StatusFilter::from_name(filter);
    let shown: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    tracing::debug!(filter = filter.as_str(), shown = shown.len(), "listed tasks");
    shown
}

/// Mark a task done. Completing an already-done task succeeds.
pub fn complete_task(tasks: &mut [Task], id: i64) -> Result<()> {
    let index = find_index(tasks, id)?;
    tasks[index].done = true;
    tracing::debug!(id, "completed task");
    Ok(())
}

/// Remove a task, preserving the order of the rest. Returns the removed task.
pub fn delete_task(tasks: &mut Vec<Task>, id: i64) -> Result<Task> {
    let index = find_index(tasks, id)?;
    let removed = tasks.remove(index);
    tracing::debug!(id, "deleted task");
    Ok(removed)
}
