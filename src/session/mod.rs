//! Signed-in user state and its persisted snapshot.
//!
//! SYSTEM CONTEXT
//! ==============
//! `controller` owns the [`Session`] and is the only code that mutates it;
//! pages, the route guard and the shell read copies. `snapshot` holds the
//! user value itself plus the load/persist helpers for the storage slot.

pub mod controller;
pub mod snapshot;

pub use controller::{Session, SessionController};
pub use snapshot::{LoginResponse, SNAPSHOT_KEY, UserSnapshot};
