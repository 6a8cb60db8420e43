//!
//! Traits Module
//!
//! Seams of the grading engine.
//!
//! - [`comparator`]: how a submitted choice selection is compared with the stored answer.
//! - [`executor`]: how coding answers are run against their test cases.

pub mod comparator;
pub mod executor;
