pub mod config;
pub mod errors;
pub mod model;
pub mod report;
pub mod reporter;
pub mod storage;
