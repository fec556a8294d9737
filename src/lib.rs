// Vocab Quiz - German vocabulary trainer backend
// Library exports

pub mod config;
pub mod corpus;
pub mod dictionary;
pub mod errors;
pub mod generators;
pub mod matcher;
pub mod metrics;
pub mod progress;
pub mod providers;
pub mod quiz;
pub mod server;
