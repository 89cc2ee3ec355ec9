pub mod config;
pub mod courses;
pub mod error;
pub mod export;
pub mod fetch;
pub mod pipeline;
pub mod util;

pub use error::{Error, Result};
