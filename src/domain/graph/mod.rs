pub mod resource_graph;
