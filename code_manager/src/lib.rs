//! HTTP surface over the execution and grading engine.
//!
//! Every sandbox run, whether a learner's "try it" request or a hidden grading
//! pass, is admitted through one [`manager::ExecutionManager`] so total sandbox
//! load stays bounded.

pub mod api;
pub mod manager;
pub mod quota;
pub mod state;
