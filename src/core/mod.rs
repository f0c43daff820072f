//! Core domain models for workflow generation
//!
//! This module defines the typed object graph a workflow is built from:
//! pipelines, jobs, steps, triggers and run-time expressions.

pub mod config;
pub mod error;
pub mod expression;
pub mod job;
pub mod pipeline;
pub mod step;
pub mod trigger;

pub use error::*;
pub use expression::*;
pub use job::*;
pub use pipeline::*;
pub use step::*;
pub use trigger::*;
