//! Demo data set, created through the public store operations so the
//! harness exercises the same paths the presentation layer would.

use anyhow::Context;
use chrono::{Duration, Utc};
use uuid::Uuid;

use flowdeck_core::{
    NewProject, NewTask, Priority, Project, ProjectStatus, Role, Task, TaskStatus, User,
};
use flowdeck_store::EntityStore;

/// The users referenced by the demo projects and tasks. Users live at the
/// session boundary; the store never owns them.
pub fn demo_users() -> Vec<User> {
    let now = Utc::now();
    let user = |email: &str, name: &str, role: Role| User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: name.to_string(),
        avatar_url: None,
        role,
        created_at: now,
        updated_at: now,
    };
    vec![
        user("jordan@flowdeck.dev", "Jordan Reyes", Role::Manager),
        user("sam@flowdeck.dev", "Sam Okafor", Role::Member),
        user("alex@flowdeck.dev", "Alex Novak", Role::Member),
    ]
}

/// Everything the seed created, for later scripting.
pub struct SeedData {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

/// Create three projects and four tasks mirroring a small team's board.
/// One task is already overdue so the dashboard has something to show.
pub async fn seed_demo_data(store: &EntityStore, users: &[User]) -> anyhow::Result<SeedData> {
    let now = Utc::now();
    let owner = users[0].id;
    let members: Vec<Uuid> = users.iter().map(|u| u.id).collect();

    let redesign = store
        .create_project(NewProject {
            name: "Website Redesign".to_string(),
            description: "Complete redesign of the company website".to_string(),
            status: ProjectStatus::Active,
            priority: Priority::High,
            start_date: now - Duration::days(30),
            end_date: Some(now + Duration::days(30)),
            progress: 65,
            owner_id: owner,
            team_members: members.clone(),
        })
        .await
        .context("seeding the redesign project")?;

    let mobile = store
        .create_project(NewProject {
            name: "Mobile App Development".to_string(),
            description: "Cross-platform mobile application".to_string(),
            status: ProjectStatus::Active,
            priority: Priority::Urgent,
            start_date: now - Duration::days(14),
            end_date: Some(now + Duration::days(76)),
            progress: 30,
            owner_id: owner,
            team_members: vec![members[0], members[1]],
        })
        .await
        .context("seeding the mobile project")?;

    let migration = store
        .create_project(NewProject {
            name: "Database Migration".to_string(),
            description: "Migrate the legacy database to new infrastructure".to_string(),
            status: ProjectStatus::Completed,
            priority: Priority::Medium,
            start_date: now - Duration::days(90),
            end_date: Some(now - Duration::days(7)),
            progress: 100,
            owner_id: owner,
            team_members: vec![members[0], members[2]],
        })
        .await
        .context("seeding the migration project")?;

    let mut tasks = Vec::new();
    let specs = [
        (
            "Design Homepage Layout",
            "Wireframes and mockups for the new homepage",
            TaskStatus::Completed,
            Priority::High,
            redesign.id,
            Some(now - Duration::days(5)),
            vec!["design", "frontend"],
            Some(members[1]),
        ),
        (
            "Implement User Authentication",
            "Login and registration flow",
            TaskStatus::InProgress,
            Priority::Urgent,
            redesign.id,
            // Already overdue.
            Some(now - Duration::days(1)),
            vec!["backend", "security"],
            Some(members[0]),
        ),
        (
            "API Integration",
            "Connect frontend components with backend endpoints",
            TaskStatus::Todo,
            Priority::Medium,
            redesign.id,
            Some(now + Duration::days(6)),
            vec!["frontend", "api"],
            Some(members[2]),
        ),
        (
            "Mobile UI Components",
            "Reusable component library for the app",
            TaskStatus::InProgress,
            Priority::High,
            mobile.id,
            Some(now + Duration::days(3)),
            vec!["mobile", "ui"],
            Some(members[1]),
        ),
    ];

    for (title, description, status, priority, project_id, due_date, tags, assignee) in specs {
        let task = store
            .create_task(NewTask {
                title: title.to_string(),
                description: description.to_string(),
                status,
                priority,
                assignee_id: assignee,
                project_id,
                due_date,
                tags: tags.into_iter().map(String::from).collect(),
            })
            .await
            .with_context(|| format!("seeding task '{title}'"))?;
        tasks.push(task);
    }

    Ok(SeedData {
        projects: vec![redesign, mobile, migration],
        tasks,
    })
}
