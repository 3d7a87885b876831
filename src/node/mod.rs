pub mod identity;
pub mod node_model;
