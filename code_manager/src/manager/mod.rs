pub mod executor;
pub mod manager;
pub mod queue;
