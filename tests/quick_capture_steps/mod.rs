//! Step definitions for quick-capture scenarios.

pub mod world;

mod then;
mod when;
