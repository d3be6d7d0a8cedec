//! Grade analysis for already-fetched LMS course data.
//!
//! The [`grading`] module is a pure engine: it normalizes assignments, applies
//! drop rules, aggregates categories, projects hypothetical scores, and solves
//! for the score needed to reach a target grade. The remaining modules carry the
//! service plumbing shared by the CLI and HTTP front ends.

pub mod config;
pub mod error;
pub mod grading;
pub mod telemetry;
