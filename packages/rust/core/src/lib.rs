//! Core pipeline orchestration and domain logic for LeadForge.
//!
//! This crate ties together page extraction, model analysis, lead discovery
//! and the lead store into the end-to-end `run` workflow and the `analyze`
//! report.

pub mod analyzer;
pub mod drafter;
pub mod pipeline;
pub mod portfolio;
pub mod report;
pub mod store;

#[cfg(test)]
mod testing;
