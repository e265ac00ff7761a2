pub mod config;
pub mod exchange;
pub mod gateway;
pub mod message;
pub mod orchestrator;
pub mod paths;
pub mod threads;
