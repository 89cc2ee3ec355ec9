pub mod graph;
pub mod prerequisites;
pub mod subjects;
