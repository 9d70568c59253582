//! Adapter implementations for task management ports.
//!
//! - [`memory::InMemoryTaskRepository`]: thread-safe in-memory storage for
//!   tests and embedding. Durable storage is provided by the host
//!   application.

pub mod memory;
