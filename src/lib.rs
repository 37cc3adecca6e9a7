pub mod classifier;
pub mod config;
pub mod constants;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod skip;
pub mod types;
