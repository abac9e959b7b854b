//! Flowdeck entity store.
//!
//! - [`EntityStore`] — owns the project/task collections and exposes the
//!   async operation set. One instance per application session.
//! - [`RemoteLink`] / [`LocalLink`] — the transport seam. Every operation
//!   performs one round trip; a real network client slots in here.
//! - [`Identity`] / [`StaticIdentity`] — the session boundary, consumed
//!   only to attribute activity entries.

pub mod link;
pub mod session;
pub mod store;

pub use link::{LocalLink, RemoteLink};
pub use session::{Identity, StaticIdentity};
pub use store::EntityStore;
