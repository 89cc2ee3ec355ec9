pub mod hierarchy;
pub mod matrix;

pub use hierarchy::to_hierarchy;
pub use matrix::AdjacencyMatrix;
