pub mod category;
pub mod error;
pub mod pipeline_config;

// In-memory tables
pub mod table;
