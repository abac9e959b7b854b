//! Flowdeck kanban board.
//!
//! - [`BoardController`] — the drag-protocol state machine that turns a
//!   grab/drop gesture into one validated store mutation, with no-op
//!   detection and revert on failure.
//! - [`columns`] — pure column grouping for presentation.

pub mod columns;
pub mod controller;

pub use columns::{group_by_status, Column};
pub use controller::{BoardController, BoardError, BoardEvent, DragState, DropOutcome};
