pub mod config;
pub mod execution_config;
pub mod languages;
pub mod test_helpers;
