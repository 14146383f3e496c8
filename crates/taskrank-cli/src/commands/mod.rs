pub mod analyze;
pub mod config;
pub mod serve;
pub mod suggest;
