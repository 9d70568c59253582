//! Task management for Taskdeck.
//!
//! This module turns quick-capture lines and explicit requests into tasks,
//! keeps urgency current, gates status changes through the transition table,
//! rejects dependency edits that would close a cycle, and builds search
//! predicates for storage collaborators. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
