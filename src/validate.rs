use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{Task, MAX_DESCRIPTION_LEN};

/// Validate a task description: must be non-empty and at most
/// `MAX_DESCRIPTION_LEN` bytes.
pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if description.len() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong {
            len: description.len(),
            max: MAX_DESCRIPTION_LEN,
        });
    }
    Ok(())
}

pub fn validate_id(id: i64) -> Result<(), ValidationError> {
    if id < 1 {
        return Err(ValidationError::InvalidId(id));
    }
    Ok(())
}

/// Report invariant violations in a collection that did not come from `ops`
/// (imported or hand-edited files). Returns one message per problem, in
/// collection order.
pub fn check_collection(tasks: &[Task]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    for (i, task) in tasks.iter().enumerate() {
        if let Err(e) = validate_id(task.id) {
            problems.push(format!("task #{}: {e}", i + 1));
        } else if !seen.insert(task.id) {
            problems.push(format!("task #{}: duplicate ID {}", i + 1, task.id));
        }
        if let Err(e) = validate_description(&task.description) {
            problems.push(format!("task #{} (ID {}): {e}", i + 1, task.id));
        }
    }
    problems
}
