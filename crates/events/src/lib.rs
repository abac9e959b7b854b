//! Flowdeck change-event infrastructure.
//!
//! - [`ChangeBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ChangeEvent`] — the canonical change envelope, carrying an
//!   immutable snapshot of the affected collection.

pub mod bus;

pub use bus::{ChangeBus, ChangeEvent, CollectionSnapshot};
