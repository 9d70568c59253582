//! Taskdeck: domain core for a task-management backend.
//!
//! The crate turns free-form or partial input into valid task state and
//! keeps that state consistent as it changes.
//!
//! # Architecture
//!
//! Taskdeck follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports
//!
//! # Modules
//!
//! - [`task`]: Quick capture, urgency, status transitions, dependencies, and
//!   search

pub mod task;
