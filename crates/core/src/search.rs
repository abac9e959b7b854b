//! Text filtering over tasks.
//!
//! Centralizes the board's search box semantics so presentation code and
//! tests share one definition instead of filtering inline.

use crate::task::Task;

/// Case-insensitive match of `query` against a task's title, description,
/// or tags. An empty (or whitespace-only) query matches everything.
pub fn task_matches(task: &Task, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&needle)
        || task.description.to_lowercase().contains(&needle)
        || task.tags.iter().any(|tag| tag.to_lowercase().contains(&needle))
}

/// Filter a task slice by [`task_matches`], preserving order.
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    tasks.iter().filter(|task| task_matches(task, query)).collect()
}
