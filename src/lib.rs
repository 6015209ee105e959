//! Customer Manager: client for a cookie-session customer records API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the single chokepoint for network calls, `session` owns the
//! signed-in user and its persisted snapshot, and `pages` / `routes` are the
//! view models that consume both. `dev` carries the local proxy and the
//! in-memory stub backend used for development and tests.

pub mod api;
pub mod config;
pub mod customer;
pub mod dev;
pub mod pages;
pub mod routes;
pub mod session;
pub mod shell;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
