pub mod broker;
pub mod graph;
pub mod job;
pub mod resource;
pub mod resource_manager;
pub mod store;
pub mod utils;
