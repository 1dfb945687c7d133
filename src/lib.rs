pub mod config;
pub mod errors;
pub mod freshness;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod trigger;
pub mod workspace;
