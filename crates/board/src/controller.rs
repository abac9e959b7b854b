//! The kanban transition controller.
//!
//! Mediates a pointer-driven drag gesture into exactly one store
//! mutation. One gesture at a time; the dragged task stays untouched in
//! the store until the drop commits, and a failed commit restores nothing
//! because nothing was changed: the controller simply reports the revert
//! so the presentation layer can move the card back.

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use flowdeck_core::types::EntityId;
use flowdeck_core::{CoreError, Task, TaskPatch, TaskStatus};
use flowdeck_store::EntityStore;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Current phase of the drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    /// No task is being dragged.
    Idle,
    /// A task has been grabbed; the store is untouched.
    Dragging {
        task_id: EntityId,
        source: TaskStatus,
    },
    /// The drop landed on another column and the status mutation is in
    /// flight. Not cancellable; it runs to completion or failure.
    Committing {
        task_id: EntityId,
        source: TaskStatus,
        target: TaskStatus,
    },
}

/// What a drop resolved to.
#[derive(Debug)]
pub enum DropOutcome {
    /// Dropped on the source column (or nowhere new): no store call, no
    /// notification, straight back to idle.
    NoOp {
        task_id: EntityId,
        status: TaskStatus,
    },
    /// The status mutation committed; the task now lives in the target
    /// column.
    Committed(Task),
    /// The commit failed; the stored task is exactly as it was before the
    /// drag began, and the board should present it in `status` again.
    Reverted {
        task_id: EntityId,
        status: TaskStatus,
        error: CoreError,
    },
}

/// Protocol errors distinct from store failures.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// Only one gesture may be in flight; wait for idle.
    #[error("another drag gesture is already in progress")]
    GestureInProgress,

    /// `drop`/`cancel_drag` require a grabbed task.
    #[error("no drag gesture is in progress")]
    NoActiveGesture,

    /// The commit has started and runs to completion or failure.
    #[error("the commit is in flight and can no longer be cancelled")]
    CommitInFlight,

    /// A store error outside the commit path (e.g. resolving the task at
    /// grab time).
    #[error(transparent)]
    Store(#[from] CoreError),
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Observable transitions, published for in-flight and reverted visuals.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    DragStarted {
        task_id: EntityId,
        source: TaskStatus,
    },
    DragCancelled {
        task_id: EntityId,
    },
    DropNoOp {
        task_id: EntityId,
        status: TaskStatus,
    },
    CommitStarted {
        task_id: EntityId,
        source: TaskStatus,
        target: TaskStatus,
    },
    DropCommitted {
        task_id: EntityId,
        source: TaskStatus,
        target: TaskStatus,
    },
    DropReverted {
        task_id: EntityId,
        /// The column the task is still in.
        status: TaskStatus,
        reason: String,
    },
}

/// Default buffer capacity for the event channel.
const EVENT_CAPACITY: usize = 256;

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drag protocol driver over one [`EntityStore`].
pub struct BoardController {
    store: Arc<EntityStore>,
    state: Mutex<DragState>,
    events: broadcast::Sender<BoardEvent>,
}

impl BoardController {
    pub fn new(store: Arc<EntityStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            state: Mutex::new(DragState::Idle),
            events,
        }
    }

    /// The current gesture phase.
    pub fn state(&self) -> DragState {
        *self.state.lock().unwrap()
    }

    /// Subscribe to gesture transitions.
    pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
        self.events.subscribe()
    }

    /// Grab a task. Resolves its current status from the store so the
    /// later drop can detect the same-column no-op.
    pub async fn begin_drag(&self, task_id: EntityId) -> Result<(), BoardError> {
        if self.state() != DragState::Idle {
            return Err(BoardError::GestureInProgress);
        }

        // The store read happens outside the state lock; on failure the
        // controller is still idle.
        let task = self.store.get_task(task_id).await?;

        let mut state = self.state.lock().unwrap();
        if *state != DragState::Idle {
            return Err(BoardError::GestureInProgress);
        }
        *state = DragState::Dragging {
            task_id,
            source: task.status,
        };
        self.emit(BoardEvent::DragStarted {
            task_id,
            source: task.status,
        });
        tracing::debug!(task_id = %task_id, source = ?task.status, "Drag started");
        Ok(())
    }

    /// Release the grabbed task over a target column.
    ///
    /// A drop on the source column is a no-op: zero store calls, zero
    /// change notifications. Otherwise the status mutation is issued and
    /// the gesture ends idle with either a commit or a revert.
    pub async fn drop(&self, target: TaskStatus) -> Result<DropOutcome, BoardError> {
        let (task_id, source) = {
            let mut state = self.state.lock().unwrap();
            match *state {
                DragState::Idle => return Err(BoardError::NoActiveGesture),
                DragState::Committing { .. } => return Err(BoardError::CommitInFlight),
                DragState::Dragging { task_id, source } => {
                    if target == source {
                        *state = DragState::Idle;
                        self.emit(BoardEvent::DropNoOp {
                            task_id,
                            status: source,
                        });
                        tracing::debug!(task_id = %task_id, "Drop on source column, no-op");
                        return Ok(DropOutcome::NoOp {
                            task_id,
                            status: source,
                        });
                    }
                    *state = DragState::Committing {
                        task_id,
                        source,
                        target,
                    };
                    self.emit(BoardEvent::CommitStarted {
                        task_id,
                        source,
                        target,
                    });
                    (task_id, source)
                }
            }
        };

        let result = self
            .store
            .update_task(task_id, TaskPatch::status(target))
            .await;

        let mut state = self.state.lock().unwrap();
        *state = DragState::Idle;
        match result {
            Ok(task) => {
                self.emit(BoardEvent::DropCommitted {
                    task_id,
                    source,
                    target,
                });
                tracing::info!(task_id = %task_id, from = ?source, to = ?target, "Drop committed");
                Ok(DropOutcome::Committed(task))
            }
            Err(error) => {
                self.emit(BoardEvent::DropReverted {
                    task_id,
                    status: source,
                    reason: error.to_string(),
                });
                tracing::warn!(task_id = %task_id, error = %error, "Commit failed, reverting");
                Ok(DropOutcome::Reverted {
                    task_id,
                    status: source,
                    error,
                })
            }
        }
    }

    /// Abort the gesture before any commit. Zero store calls; rejected
    /// once the commit is in flight.
    pub fn cancel_drag(&self) -> Result<(), BoardError> {
        let mut state = self.state.lock().unwrap();
        match *state {
            DragState::Dragging { task_id, .. } => {
                *state = DragState::Idle;
                self.emit(BoardEvent::DragCancelled { task_id });
                tracing::debug!(task_id = %task_id, "Drag cancelled");
                Ok(())
            }
            DragState::Committing { .. } => Err(BoardError::CommitInFlight),
            DragState::Idle => Err(BoardError::NoActiveGesture),
        }
    }

    fn emit(&self, event: BoardEvent) {
        // Zero receivers is fine; the board can run headless.
        let _ = self.events.send(event);
    }
}
