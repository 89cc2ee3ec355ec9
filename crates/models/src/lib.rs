pub mod course;
pub mod hierarchy;
pub mod palette;
pub mod registry;

pub use course::{Classification, Course};
pub use hierarchy::HierarchyRecord;
pub use palette::Palette;
pub use registry::Registry;
