//! # Comparators
//!
//! Implementations of [`AnswerComparator`](crate::traits::comparator::AnswerComparator).
//!
//! - [`choice_comparator`]: exact, order-insensitive comparison of choice ids.

pub mod choice_comparator;
