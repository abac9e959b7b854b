use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowdeck_board::{group_by_status, BoardController, DropOutcome};
use flowdeck_core::TaskStatus;
use flowdeck_harness::config::HarnessConfig;
use flowdeck_harness::seed;
use flowdeck_store::{EntityStore, LocalLink, StaticIdentity};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowdeck=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = HarnessConfig::from_env();
    tracing::info!(
        latency_ms = config.link_latency_ms,
        failure_rate = config.failure_rate,
        "Loaded harness configuration"
    );

    // --- Store ---
    let users = seed::demo_users();
    let link = Arc::new(
        LocalLink::new(Duration::from_millis(config.link_latency_ms))
            .with_failure_rate(config.failure_rate),
    );
    let store = Arc::new(EntityStore::new(
        link.clone(),
        Arc::new(StaticIdentity::user(users[0].id)),
    ));

    // --- Change log subscriber ---
    let mut changes = store.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(event) => {
                    tracing::info!(
                        event = %event.event_type,
                        entity_id = %event.entity_id,
                        "Change committed"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Change subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // --- Seed ---
    if !config.seed_demo_data {
        tracing::info!("Seeding disabled, nothing to demonstrate");
        return Ok(());
    }
    let data = seed::seed_demo_data(&store, &users).await?;
    tracing::info!(
        projects = data.projects.len(),
        tasks = data.tasks.len(),
        "Demo data seeded"
    );

    report(&store).await?;

    // --- Search filter ---
    let tasks = store.list_tasks(None).await?;
    let hits = flowdeck_core::search::filter_tasks(&tasks, "design");
    tracing::info!(query = "design", hits = hits.len(), "Search filter");

    // --- Drag scenario ---
    let controller = BoardController::new(store.clone());
    let overdue = &data.tasks[1]; // "Implement User Authentication", overdue

    // A drop back onto the source column is a no-op.
    controller.begin_drag(overdue.id).await?;
    let outcome = controller.drop(overdue.status).await?;
    tracing::info!(outcome = ?outcome, "Same-column drop");

    // A forced outage makes the commit fail and revert.
    controller.begin_drag(overdue.id).await?;
    link.set_outage(true);
    match controller.drop(TaskStatus::Completed).await? {
        DropOutcome::Reverted { status, error, .. } => {
            tracing::info!(restored = ?status, %error, "Commit reverted as expected");
        }
        other => tracing::warn!(outcome = ?other, "Expected a revert"),
    }
    link.set_outage(false);

    // With the link healthy again, the move commits.
    controller.begin_drag(overdue.id).await?;
    match controller.drop(TaskStatus::Completed).await? {
        DropOutcome::Committed(task) => {
            tracing::info!(task_id = %task.id, status = ?task.status, "Drop committed");
        }
        other => tracing::warn!(outcome = ?other, "Expected a commit"),
    }

    report(&store).await?;

    // --- Recent activity ---
    for entry in store.recent_activity(5).await {
        tracing::info!(
            action = entry.action,
            entity_type = entry.entity_type,
            entity_id = %entry.entity_id,
            "Activity"
        );
    }

    Ok(())
}

/// Log the column layout and dashboard aggregates.
async fn report(store: &EntityStore) -> anyhow::Result<()> {
    let tasks = store.list_tasks(None).await?;
    for column in group_by_status(&tasks) {
        tracing::info!(column = column.title(), count = column.tasks.len(), "Board column");
    }

    let stats = store.dashboard_stats(Utc::now()).await;
    tracing::info!(
        total_projects = stats.total_projects,
        active_projects = stats.active_projects,
        completed_tasks = stats.completed_tasks,
        pending_tasks = stats.pending_tasks,
        overdue_tasks = stats.overdue_tasks,
        team_members = stats.team_members,
        "Dashboard stats"
    );
    Ok(())
}
