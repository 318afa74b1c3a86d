// Serialized form of the task list

use crate::models::Task;
use eyre::{Context, Result};
use std::collections::HashSet;
use tracing::warn;

/// Encode the list as a JSON array of `{id, text, completed}` objects
pub fn encode(tasks: &[Task]) -> Result<String> {
    serde_json::to_string(tasks).context("Failed to serialize task list")
}

/// Decode a JSON array produced by [`encode`]
///
/// A snapshot that is not a JSON array of tasks is an error. Individual
/// entries that break the list invariants (blank text, repeated id) are
/// dropped with a warning so one bad record does not cost the whole list.
pub fn decode(raw: &str) -> Result<Vec<Task>> {
    let parsed: Vec<Task> = serde_json::from_str(raw).context("Failed to parse task list snapshot")?;

    let mut seen = HashSet::new();
    let mut tasks = Vec::with_capacity(parsed.len());

    for (index, mut task) in parsed.into_iter().enumerate() {
        let trimmed = task.text.trim();
        if trimmed.is_empty() {
            warn!(index, id = %task.id, "Task with empty text, skipping");
            continue;
        }
        if trimmed.len() != task.text.len() {
            task.text = trimmed.to_string();
        }

        if !seen.insert(task.id.clone()) {
            warn!(index, id = %task.id, "Duplicate task id, skipping");
            continue;
        }

        tasks.push(task);
    }

    Ok(tasks)
}
