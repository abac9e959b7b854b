//! Dashboard aggregates derived from the entity collections.
//!
//! [`compute_stats`] is a pure function: `now` is an explicit input, it
//! never reads the clock ambiently, and identical inputs produce identical
//! output. Presentation code and tests share this single definition
//! instead of re-deriving counts ad hoc.

use std::collections::HashSet;

use serde::Serialize;

use crate::project::{Project, ProjectStatus};
use crate::task::{Task, TaskStatus};
use crate::types::Timestamp;

/// Derived dashboard counters. Recomputed from the collections, never
/// mutated directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_tasks: usize,
    /// Tasks whose status is anything other than completed.
    pub pending_tasks: usize,
    pub overdue_tasks: usize,
    /// Distinct users across all projects' team member lists. This is the
    /// union of project teams, not the set of task assignees.
    pub team_members: usize,
}

/// Compute dashboard statistics in one pass over each collection.
///
/// Runs in O(|projects| + |tasks|). The overdue count uses the same
/// predicate as [`Task::is_overdue`], evaluated against the same `now`.
pub fn compute_stats(projects: &[Project], tasks: &[Task], now: Timestamp) -> DashboardStats {
    let mut stats = DashboardStats {
        total_projects: projects.len(),
        ..Default::default()
    };

    let mut members = HashSet::new();
    for project in projects {
        if project.status == ProjectStatus::Active {
            stats.active_projects += 1;
        }
        members.extend(project.team_members.iter().copied());
    }
    stats.team_members = members.len();

    for task in tasks {
        if task.status == TaskStatus::Completed {
            stats.completed_tasks += 1;
        } else {
            stats.pending_tasks += 1;
        }
        if task.is_overdue(now) {
            stats.overdue_tasks += 1;
        }
    }

    stats
}
