pub mod edge;
pub mod node;
pub mod resource_base;
