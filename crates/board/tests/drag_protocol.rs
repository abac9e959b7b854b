//! Behaviour tests for the drag protocol: commit, no-op, cancel, revert,
//! and the one-gesture-at-a-time rule.

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::Utc;
use tokio::sync::broadcast::error::TryRecvError;
use uuid::Uuid;

use flowdeck_board::{BoardController, BoardError, BoardEvent, DragState, DropOutcome};
use flowdeck_core::{
    CoreError, NewProject, NewTask, Priority, ProjectStatus, TaskStatus,
};
use flowdeck_store::{EntityStore, LocalLink, StaticIdentity};

fn new_project(name: &str) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: String::new(),
        status: ProjectStatus::Active,
        priority: Priority::Medium,
        start_date: Utc::now(),
        end_date: None,
        progress: 0,
        owner_id: Uuid::new_v4(),
        team_members: vec![],
    }
}

fn new_task(title: &str, project_id: Uuid) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::Todo,
        priority: Priority::Medium,
        assignee_id: None,
        project_id,
        due_date: None,
        tags: vec![],
    }
}

/// Store + controller over an instant link, with one project and task.
async fn board_fixture() -> (Arc<LocalLink>, Arc<EntityStore>, BoardController, Uuid) {
    let link = Arc::new(LocalLink::instant());
    let store = Arc::new(EntityStore::new(
        link.clone(),
        Arc::new(StaticIdentity::anonymous()),
    ));
    let project = store.create_project(new_project("Board")).await.unwrap();
    let task = store.create_task(new_task("Card", project.id)).await.unwrap();
    let controller = BoardController::new(store.clone());
    (link, store, controller, task.id)
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn drag_and_drop_moves_task_across_columns() {
    let (_link, store, controller, task_id) = board_fixture().await;
    let mut events = controller.subscribe();

    controller.begin_drag(task_id).await.unwrap();
    assert_eq!(
        controller.state(),
        DragState::Dragging {
            task_id,
            source: TaskStatus::Todo
        }
    );

    let outcome = controller.drop(TaskStatus::InProgress).await.unwrap();
    assert_matches!(outcome, DropOutcome::Committed(task) if task.status == TaskStatus::InProgress);
    assert_eq!(controller.state(), DragState::Idle);

    let stored = store.get_task(task_id).await.unwrap();
    assert_eq!(stored.status, TaskStatus::InProgress);

    assert_matches!(events.try_recv(), Ok(BoardEvent::DragStarted { .. }));
    assert_matches!(events.try_recv(), Ok(BoardEvent::CommitStarted { .. }));
    assert_matches!(
        events.try_recv(),
        Ok(BoardEvent::DropCommitted { target: TaskStatus::InProgress, .. })
    );
}

#[tokio::test]
async fn any_column_is_reachable_from_any_column() {
    let (_link, store, controller, task_id) = board_fixture().await;

    // Backwards and skipping stages are both legal moves.
    for target in [
        TaskStatus::Completed,
        TaskStatus::InProgress,
        TaskStatus::Todo,
        TaskStatus::Review,
    ] {
        controller.begin_drag(task_id).await.unwrap();
        let outcome = controller.drop(target).await.unwrap();
        assert_matches!(outcome, DropOutcome::Committed(_));
        assert_eq!(store.get_task(task_id).await.unwrap().status, target);
    }
}

// ---------------------------------------------------------------------------
// No-op and cancel
// ---------------------------------------------------------------------------

#[tokio::test]
async fn same_column_drop_is_a_no_op_with_zero_store_calls() {
    let (link, store, controller, task_id) = board_fixture().await;

    controller.begin_drag(task_id).await.unwrap();

    // If the drop issued any round trip, this queued failure would turn
    // the outcome into a revert.
    link.fail_next(1);
    let mut store_events = store.subscribe();

    let outcome = controller.drop(TaskStatus::Todo).await.unwrap();
    assert_matches!(
        outcome,
        DropOutcome::NoOp { status: TaskStatus::Todo, .. }
    );
    assert_eq!(controller.state(), DragState::Idle);
    assert_matches!(store_events.try_recv(), Err(TryRecvError::Empty));

    // The queued failure is still pending, proving no round trip ran.
    assert_matches!(
        store.get_task(task_id).await,
        Err(CoreError::Transient(_))
    );
}

#[tokio::test]
async fn cancel_before_commit_touches_nothing() {
    let (_link, store, controller, task_id) = board_fixture().await;
    let mut store_events = store.subscribe();

    controller.begin_drag(task_id).await.unwrap();
    controller.cancel_drag().unwrap();

    assert_eq!(controller.state(), DragState::Idle);
    assert_matches!(store_events.try_recv(), Err(TryRecvError::Empty));
    assert_eq!(store.get_task(task_id).await.unwrap().status, TaskStatus::Todo);
}

#[tokio::test]
async fn cancel_and_drop_require_an_active_gesture() {
    let (_link, _store, controller, _task_id) = board_fixture().await;

    assert_matches!(controller.cancel_drag(), Err(BoardError::NoActiveGesture));
    assert_matches!(
        controller.drop(TaskStatus::Review).await,
        Err(BoardError::NoActiveGesture)
    );
}

// ---------------------------------------------------------------------------
// Revert
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_commit_reverts_and_ends_idle() {
    let (link, store, controller, task_id) = board_fixture().await;
    let mut events = controller.subscribe();
    let before = store.get_task(task_id).await.unwrap();

    controller.begin_drag(task_id).await.unwrap();
    link.fail_next(1);
    let outcome = controller.drop(TaskStatus::Completed).await.unwrap();

    assert_matches!(
        outcome,
        DropOutcome::Reverted {
            status: TaskStatus::Todo,
            error: CoreError::Transient(_),
            ..
        }
    );
    assert_eq!(controller.state(), DragState::Idle);

    // Stored task is exactly as it was before the drag.
    let after = store.get_task(task_id).await.unwrap();
    assert_eq!(after.status, before.status);
    assert_eq!(after.updated_at, before.updated_at);

    assert_matches!(events.try_recv(), Ok(BoardEvent::DragStarted { .. }));
    assert_matches!(events.try_recv(), Ok(BoardEvent::CommitStarted { .. }));
    assert_matches!(
        events.try_recv(),
        Ok(BoardEvent::DropReverted { status: TaskStatus::Todo, .. })
    );
}

#[tokio::test]
async fn begin_drag_on_missing_task_leaves_controller_idle() {
    let (_link, _store, controller, _task_id) = board_fixture().await;

    let result = controller.begin_drag(Uuid::new_v4()).await;
    assert_matches!(
        result,
        Err(BoardError::Store(CoreError::NotFound { entity: "task", .. }))
    );
    assert_eq!(controller.state(), DragState::Idle);
}

// ---------------------------------------------------------------------------
// One gesture at a time
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_begin_drag_is_rejected_while_dragging() {
    let (_link, store, controller, task_id) = board_fixture().await;
    let project = store.create_project(new_project("Other")).await.unwrap();
    let second = store.create_task(new_task("Other card", project.id)).await.unwrap();

    controller.begin_drag(task_id).await.unwrap();
    assert_matches!(
        controller.begin_drag(second.id).await,
        Err(BoardError::GestureInProgress)
    );
}

#[tokio::test]
async fn second_begin_drag_is_rejected_while_committing() {
    let link = Arc::new(LocalLink::new(Duration::from_millis(100)));
    let store = Arc::new(EntityStore::new(
        link.clone(),
        Arc::new(StaticIdentity::anonymous()),
    ));
    let project = store.create_project(new_project("Slow")).await.unwrap();
    let t1 = store.create_task(new_task("T1", project.id)).await.unwrap();
    let t2 = store.create_task(new_task("T2", project.id)).await.unwrap();
    let controller = Arc::new(BoardController::new(store.clone()));

    controller.begin_drag(t1.id).await.unwrap();

    let dropping = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { BoardController::drop(&controller, TaskStatus::Review).await })
    };

    // Give the drop time to enter Committing but not to finish its
    // 100ms round trip.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_matches!(
        controller.state(),
        DragState::Committing { target: TaskStatus::Review, .. }
    );
    assert_matches!(
        controller.begin_drag(t2.id).await,
        Err(BoardError::GestureInProgress)
    );
    // Cancelling mid-commit is rejected too.
    assert_matches!(controller.cancel_drag(), Err(BoardError::CommitInFlight));

    let outcome = dropping.await.unwrap().unwrap();
    assert_matches!(outcome, DropOutcome::Committed(_));
    assert_eq!(controller.state(), DragState::Idle);

    // Once idle, the next gesture is accepted.
    controller.begin_drag(t2.id).await.unwrap();
    controller.cancel_drag().unwrap();
}

// ---------------------------------------------------------------------------
// End-to-end dashboard scenario
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completing_an_overdue_task_updates_the_dashboard() {
    let store = Arc::new(EntityStore::in_memory());
    let now = Utc::now();

    let project = store.create_project(new_project("P")).await.unwrap();
    let mut overdue = new_task("T1", project.id);
    overdue.due_date = Some(now - chrono::Duration::days(1));
    let task = store.create_task(overdue).await.unwrap();

    let stats = store.dashboard_stats(now).await;
    assert_eq!(stats.overdue_tasks, 1);
    assert_eq!(stats.completed_tasks, 0);

    let controller = BoardController::new(store.clone());
    controller.begin_drag(task.id).await.unwrap();
    let outcome = controller.drop(TaskStatus::Completed).await.unwrap();
    assert_matches!(outcome, DropOutcome::Committed(_));

    let stats = store.dashboard_stats(now).await;
    assert_eq!(stats.overdue_tasks, 0);
    assert_eq!(stats.completed_tasks, 1);
}
