//! Column grouping for the kanban board.
//!
//! Ordering of tasks within a column is presentation-only and simply
//! follows the store's collection order; the board never persists it.

use flowdeck_core::{Task, TaskStatus};

/// One board column: a status bucket and the tasks currently in it.
#[derive(Debug, Clone)]
pub struct Column {
    pub status: TaskStatus,
    pub tasks: Vec<Task>,
}

impl Column {
    /// Display title for the column header.
    pub fn title(&self) -> &'static str {
        self.status.label()
    }
}

/// Bucket tasks into the four columns, in board order.
///
/// Every status yields a column even when empty, so consumers can render
/// a stable board layout.
pub fn group_by_status(tasks: &[Task]) -> Vec<Column> {
    TaskStatus::ALL
        .iter()
        .map(|&status| Column {
            status,
            tasks: tasks
                .iter()
                .filter(|task| task.status == status)
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use flowdeck_core::types::Priority;

    fn task(title: &str, status: TaskStatus) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            assignee_id: None,
            project_id: Uuid::new_v4(),
            due_date: None,
            tags: vec![],
            attachments: vec![],
            comments: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_all_columns_present_even_when_empty() {
        let columns = group_by_status(&[]);
        assert_eq!(columns.len(), 4);
        assert!(columns.iter().all(|c| c.tasks.is_empty()));
        let order: Vec<TaskStatus> = columns.iter().map(|c| c.status).collect();
        assert_eq!(order, TaskStatus::ALL.to_vec());
    }

    #[test]
    fn test_tasks_bucket_by_status_preserving_order() {
        let tasks = vec![
            task("A", TaskStatus::Todo),
            task("B", TaskStatus::Review),
            task("C", TaskStatus::Todo),
        ];
        let columns = group_by_status(&tasks);

        let todo = &columns[0];
        assert_eq!(todo.status, TaskStatus::Todo);
        assert_eq!(todo.tasks.len(), 2);
        assert_eq!(todo.tasks[0].title, "A");
        assert_eq!(todo.tasks[1].title, "C");

        assert_eq!(columns[2].tasks.len(), 1);
        assert_eq!(columns[1].tasks.len(), 0);
        assert_eq!(columns[3].tasks.len(), 0);
    }

    #[test]
    fn test_column_titles() {
        let columns = group_by_status(&[]);
        let titles: Vec<&str> = columns.iter().map(|c| c.title()).collect();
        assert_eq!(titles, vec!["To Do", "In Progress", "Review", "Completed"]);
    }
}
